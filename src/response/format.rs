use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::Payload;
use super::xml;
use crate::error::HttpError;

/// Response serialization variant, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResponseFormat {
    #[default]
    #[serde(rename = "response_text", alias = "text")]
    Text,
    #[serde(rename = "response_json", alias = "json")]
    Json,
    #[serde(rename = "response_xml", alias = "xml")]
    Xml,
}

impl ResponseFormat {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            ResponseFormat::Text => "response_text",
            ResponseFormat::Json => "response_json",
            ResponseFormat::Xml => "response_xml",
        }
    }

    /// Content type forced by the variant; `None` lets the response choose.
    #[must_use]
    pub const fn fixed_content_type(self) -> Option<&'static str> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::Json => Some("application/json"),
            ResponseFormat::Xml => Some("application/xml"),
        }
    }

    /// The pre-send hook: turn `payload` into the body text for this variant.
    ///
    /// # Errors
    ///
    /// `InternalServerError` if JSON serialization fails or a key cannot be
    /// an XML element name.
    pub fn render(self, payload: &Payload, charset: &str) -> Result<String, HttpError> {
        match self {
            ResponseFormat::Text => Ok(payload.to_text()),
            ResponseFormat::Json => render_json(payload),
            ResponseFormat::Xml => render_xml(payload, charset),
        }
    }

    /// Body for a taxonomy error, shaped for this variant.
    #[must_use]
    pub fn error_payload(self, message: &str) -> Payload {
        match self {
            ResponseFormat::Json => Payload::Structured(serde_json::json!({
                "success": false,
                "error": message,
            })),
            ResponseFormat::Xml => Payload::Text(format!(
                "<success>false</success><error>{}</error>",
                xml::escape_text(message)
            )),
            ResponseFormat::Text => Payload::Text(message.to_string()),
        }
    }
}

fn render_json(payload: &Payload) -> Result<String, HttpError> {
    match payload {
        Payload::Structured(value @ (Value::Array(_) | Value::Object(_))) => {
            serde_json::to_string(value).map_err(|e| HttpError::internal(e.to_string()))
        }
        other => Ok(other.to_text()),
    }
}

fn render_xml(payload: &Payload, charset: &str) -> Result<String, HttpError> {
    if payload.is_empty() {
        return Ok(String::new());
    }

    let body = match payload {
        Payload::Xml(doc) => doc.as_str().to_string(),
        Payload::Structured(value @ (Value::Array(_) | Value::Object(_))) => {
            xml::to_xml(value, charset)?
        }
        other => other.to_text(),
    };

    if body.trim_start().starts_with("<?xml ") {
        Ok(body)
    } else {
        Ok(format!("{}{}", xml::declaration(charset), body))
    }
}
