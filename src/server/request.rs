use std::io::Read;

use anyhow::Context;
use http::Method;
use tracing::{debug, info, warn};

use crate::error::HttpError;
use crate::request::{parse_form, ApiRequest, RequestId};

/// Bodies larger than this are refused with 413.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A parsed request plus any failure found while reading it.
///
/// A `rejection` is answered through
/// [`Dispatcher::reject`](crate::dispatcher::Dispatcher::reject) so it
/// still carries CORS headers and the configured error format.
#[derive(Debug)]
pub struct IncomingRequest {
    pub request: ApiRequest,
    pub rejection: Option<HttpError>,
}

/// Build an [`ApiRequest`] from a `tiny_http` request.
///
/// Headers are copied as-is. An `X-Request-Id` header that holds a valid
/// ULID is reused as the request id. Form-encoded bodies are merged into the
/// parameters (query values win); any other non-empty body is parsed as
/// JSON when possible. Bodies that are not UTF-8 are ignored, and bodies
/// over [`MAX_BODY_BYTES`] produce a 413 rejection.
///
/// # Errors
///
/// Returns an error if the method is not a valid HTTP token or the body
/// cannot be read.
pub fn from_tiny_http(req: &mut tiny_http::Request) -> anyhow::Result<IncomingRequest> {
    let method = Method::from_bytes(req.method().as_str().as_bytes())
        .with_context(|| format!("invalid method {}", req.method()))?;

    let mut api_req = ApiRequest::new(method, req.url());
    for header in req.headers() {
        api_req = api_req.with_header(header.field.as_str().as_str(), header.value.as_str());
    }
    let id = RequestId::from_header_or_new(api_req.header("x-request-id"));
    api_req = api_req.with_id(id);

    let mut body = Vec::new();
    let size = req
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .context("failed to read request body")?;

    if size as u64 > MAX_BODY_BYTES {
        warn!(
            request_id = %api_req.id(),
            limit_bytes = MAX_BODY_BYTES,
            "Request body over limit"
        );
        return Ok(IncomingRequest {
            request: api_req,
            rejection: Some(HttpError::generic(413, "Payload Too Large")),
        });
    }

    if size > 0 {
        let content_type = api_req.header("content-type").unwrap_or("").to_ascii_lowercase();
        info!(
            request_id = %api_req.id(),
            body_size_bytes = size,
            content_type = %content_type,
            "Request body read"
        );
        api_req = attach_body(api_req, &content_type, &body);
    }

    debug!(
        request_id = %api_req.id(),
        method = %api_req.method(),
        path = %api_req.path(),
        headers_count = api_req.headers().len(),
        param_count = api_req.params().len(),
        "HTTP request parsed"
    );
    Ok(IncomingRequest {
        request: api_req,
        rejection: None,
    })
}

fn attach_body(api_req: ApiRequest, content_type: &str, body: &[u8]) -> ApiRequest {
    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            debug!(request_id = %api_req.id(), error = %e, "Body is not UTF-8, ignored");
            return api_req;
        }
    };

    if content_type.starts_with(FORM_CONTENT_TYPE) {
        return api_req.with_form_params(parse_form(text));
    }
    match serde_json::from_str(text) {
        Ok(json) => api_req.with_body(json),
        Err(e) => {
            debug!(request_id = %api_req.id(), error = %e, "Body is not JSON, ignored");
            api_req
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_utf8_body_is_ignored() {
        let req = ApiRequest::new(Method::POST, "/x");
        let req = attach_body(req, "application/json", &[0xff, 0xfe]);
        assert!(req.body().is_none());
        assert!(req.params().is_empty());
    }

    #[test]
    fn test_form_body_merges_behind_query() {
        let req = ApiRequest::new(Method::POST, "/x?a=query");
        let req = attach_body(req, FORM_CONTENT_TYPE, b"a=form&b=2");
        assert_eq!(req.param("a"), Some("query"));
        assert_eq!(req.param("b"), Some("2"));
    }

    #[test]
    fn test_json_body_is_parsed() {
        let req = ApiRequest::new(Method::POST, "/x");
        let req = attach_body(req, "application/json", br#"{"n":1}"#);
        assert_eq!(req.body(), Some(&serde_json::json!({"n": 1})));
    }
}
