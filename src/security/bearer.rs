use std::collections::HashSet;

use tracing::debug;

use super::AuthStrategy;
use crate::error::HttpError;
use crate::request::ApiRequest;

const BEARER_PREFIX: &str = "Bearer ";

/// Static bearer-token check.
///
/// Reads `Authorization` (or the header set with
/// [`header_name`](Self::header_name)), strips the `Bearer ` prefix when
/// present and accepts the request if the token is in the configured set.
#[derive(Debug, Clone)]
pub struct BearerTokenAuth {
    tokens: HashSet<String>,
    header_name: String,
}

impl BearerTokenAuth {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            header_name: "Authorization".to_string(),
        }
    }

    /// Read the token from a different header.
    #[must_use]
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn extract_token<'a>(&self, req: &'a ApiRequest) -> Option<&'a str> {
        let raw = req.header(&self.header_name)?.trim();
        let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
        (!token.is_empty()).then_some(token)
    }
}

impl AuthStrategy for BearerTokenAuth {
    fn authenticate(&self, req: &ApiRequest) -> Result<(), HttpError> {
        let Some(token) = self.extract_token(req) else {
            debug!(request_id = %req.id(), header = %self.header_name, "Bearer token missing");
            return Err(HttpError::authorization_required("Missing bearer token"));
        };
        if self.tokens.contains(token) {
            Ok(())
        } else {
            debug!(request_id = %req.id(), "Bearer token rejected");
            Err(HttpError::authorization_required("Invalid bearer token"))
        }
    }
}
