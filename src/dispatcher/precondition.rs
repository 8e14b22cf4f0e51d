//! Request preconditions checked before any route is consulted.
//!
//! Order: API key, method, content type. The first failure wins.

use http::Method;
use tracing::debug;

use crate::error::HttpError;
use crate::options::ApiOptions;
use crate::request::ApiRequest;

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Content type used for the comparison when the header is absent.
const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Reject requests whose `X-API-KEY` is missing or not accepted, unless the
/// accepted keys include `*`.
///
/// # Errors
///
/// `Forbidden("Incorrect API key")`.
pub fn check_api_key(options: &ApiOptions, req: &ApiRequest) -> Result<(), HttpError> {
    if options.accepts_any_api_key() {
        return Ok(());
    }
    let accepted = req
        .header(API_KEY_HEADER)
        .is_some_and(|key| options.accepted_api_keys().iter().any(|k| k == key));
    if accepted {
        Ok(())
    } else {
        debug!(request_id = %req.id(), "API key rejected");
        Err(HttpError::forbidden("Incorrect API key"))
    }
}

/// # Errors
///
/// `MethodNotAllowed` when the method is not in the allowed list.
pub fn check_method(options: &ApiOptions, req: &ApiRequest) -> Result<(), HttpError> {
    if options.is_method_allowed(req.method().as_str()) {
        Ok(())
    } else {
        debug!(request_id = %req.id(), method = %req.method(), "Method not in allowed list");
        Err(HttpError::method_not_allowed(String::new()))
    }
}

/// For anything but GET, the configured request-type tag must end with the
/// raw `Content-Type` header (`unknown` when absent).
///
/// # Errors
///
/// `BadRequest("Incorrect Content-Type")`.
pub fn check_request_content_type(options: &ApiOptions, req: &ApiRequest) -> Result<(), HttpError> {
    if req.method() == Method::GET {
        return Ok(());
    }
    let content_type = req.header("content-type").unwrap_or(UNKNOWN_CONTENT_TYPE);
    if options.request_type().tag().ends_with(content_type) {
        Ok(())
    } else {
        debug!(
            request_id = %req.id(),
            content_type = %content_type,
            expected = options.request_type().tag(),
            "Content-Type mismatch"
        );
        Err(HttpError::bad_request("Incorrect Content-Type"))
    }
}

/// Run all checks in order.
///
/// # Errors
///
/// The first failing check's error.
pub fn validate(options: &ApiOptions, req: &ApiRequest) -> Result<(), HttpError> {
    check_api_key(options, req)?;
    check_method(options, req)?;
    check_request_content_type(options, req)
}
