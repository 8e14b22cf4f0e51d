use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use super::format::ResponseFormat;
use super::payload::Payload;
use super::sink::ResponseSink;
use crate::request::HeaderVec;

pub const DEFAULT_CONTENT_TYPE: &str = "text/html";
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Per-request response state.
///
/// Created by [`ApiResponse::new`] for the configured [`ResponseFormat`],
/// mutated by hooks and the handler, and sent once. Sending twice is
/// harmless: the second call does nothing.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    format: ResponseFormat,
    status: u16,
    content_type: String,
    charset: String,
    payload: Payload,
    headers: HeaderVec,
    sent: bool,
}

impl ApiResponse {
    #[must_use]
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            status: 200,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
            payload: Payload::Empty,
            headers: HeaderVec::new(),
            sent: false,
        }
    }

    #[must_use]
    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Effective content type. JSON and XML responses always report their
    /// own type regardless of [`set_content_type`](Self::set_content_type).
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.format
            .fixed_content_type()
            .unwrap_or(&self.content_type)
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn set_charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Payload>) -> &mut Self {
        self.payload = payload.into();
        self
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// `Content-Type` header value: text types carry the charset.
    #[must_use]
    pub fn content_type_header(&self) -> String {
        let content_type = self.content_type();
        if content_type.starts_with("text/") {
            format!("{content_type}; charset={}", self.charset)
        } else {
            content_type.to_string()
        }
    }

    /// Serialize and hand the response to `sink`.
    ///
    /// The format's pre-send hook runs first and replaces the payload with
    /// the rendered text. Only the first successful call writes to the sink.
    ///
    /// # Errors
    ///
    /// An [`HttpError`](crate::error::HttpError) if serialization fails, or
    /// the sink's I/O error.
    pub fn send(&mut self, sink: &mut dyn ResponseSink) -> anyhow::Result<()> {
        if self.sent {
            debug!(status = self.status, "Response already sent, skipping");
            return Ok(());
        }

        let body = self.format.render(&self.payload, &self.charset)?;
        self.payload = Payload::Text(body);

        let content_type = self.content_type_header();
        self.set_header("Content-Type", content_type);

        let body = match &self.payload {
            Payload::Text(body) => body.as_bytes(),
            _ => &[],
        };
        sink.emit(self.status, &self.headers, body)
            .context("failed to write response to transport")?;
        self.sent = true;

        info!(
            status = self.status,
            content_type = %self.content_type(),
            body_bytes = body.len(),
            "Response sent"
        );
        Ok(())
    }
}
