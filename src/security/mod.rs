//! # Security Module
//!
//! The auth gate for routes flagged with [`Route::require_auth`].
//!
//! ## Overview
//!
//! One [`AuthStrategy`] is configured per dispatcher. For every matched
//! route that requires authentication the strategy runs after the method
//! check and before any pre-processor. A failure aborts the request with the
//! returned [`HttpError`], normally `AuthorizationRequired` (401), shaped
//! like every other error response. Routes without the flag never consult
//! the strategy, and auth-flagged routes pass straight through when no
//! strategy is configured.
//!
//! ## Providers
//!
//! - [`BearerTokenAuth`] compares the `Authorization: Bearer <token>` value
//!   against a fixed token set.
//! - Any `Fn(&ApiRequest) -> Result<(), HttpError>` closure is a strategy.
//!
//! ```rust
//! use apigate::error::HttpError;
//! use apigate::request::ApiRequest;
//! use apigate::security::{AuthStrategy, BearerTokenAuth};
//! use http::Method;
//!
//! let bearer = BearerTokenAuth::new(["s3cret"]);
//! let ok = ApiRequest::new(Method::GET, "/").with_header("Authorization", "Bearer s3cret");
//! assert!(bearer.authenticate(&ok).is_ok());
//!
//! let header_key = |req: &ApiRequest| match req.header("x-session") {
//!     Some(_) => Ok(()),
//!     None => Err(HttpError::authorization_required("No session")),
//! };
//! assert!(header_key.authenticate(&ApiRequest::new(Method::GET, "/")).is_err());
//! ```
//!
//! [`Route::require_auth`]: crate::router::Route::require_auth

mod bearer;

use crate::error::HttpError;
use crate::request::ApiRequest;

pub use bearer::BearerTokenAuth;

/// Authentication strategy invoked for auth-required routes.
pub trait AuthStrategy: Send + Sync {
    /// Succeed to let the request proceed; any error is sent as the response.
    ///
    /// # Errors
    ///
    /// The error to answer with, usually `AuthorizationRequired`.
    fn authenticate(&self, req: &ApiRequest) -> Result<(), HttpError>;
}

impl<F> AuthStrategy for F
where
    F: Fn(&ApiRequest) -> Result<(), HttpError> + Send + Sync,
{
    fn authenticate(&self, req: &ApiRequest) -> Result<(), HttpError> {
        self(req)
    }
}
