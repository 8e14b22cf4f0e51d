//! # Error Taxonomy
//!
//! Every failure the dispatcher knows how to turn into a response is an
//! [`HttpError`]: a closed [`ErrorKind`] plus a message. The kind carries the
//! canonical status code, so mapping an error to a response is a lookup rather
//! than a type hierarchy.
//!
//! Anything that is *not* an `HttpError` (I/O failures on the transport,
//! arbitrary `anyhow` errors from handlers) is outside the taxonomy and is
//! propagated to the hosting boundary untouched.
//!
//! ```rust
//! use apigate::error::{ErrorKind, HttpError};
//!
//! let err = HttpError::not_found("no such user");
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert_eq!(err.status(), 404);
//! ```

use std::fmt;

/// Closed set of HTTP failure kinds understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthorizationRequired,
    BadRequest,
    Forbidden,
    /// Catch-all kind with no canonical status; the raiser picks the code.
    Generic,
    Teapot,
    InternalServerError,
    MethodNotAllowed,
    NotFound,
    NotImplemented,
    PaymentRequired,
    ServiceUnavailable,
    TooManyRequests,
    UnavailableForLegalReasons,
    UnsupportedMediaType,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::AuthorizationRequired,
        ErrorKind::BadRequest,
        ErrorKind::Forbidden,
        ErrorKind::Generic,
        ErrorKind::Teapot,
        ErrorKind::InternalServerError,
        ErrorKind::MethodNotAllowed,
        ErrorKind::NotFound,
        ErrorKind::NotImplemented,
        ErrorKind::PaymentRequired,
        ErrorKind::ServiceUnavailable,
        ErrorKind::TooManyRequests,
        ErrorKind::UnavailableForLegalReasons,
        ErrorKind::UnsupportedMediaType,
    ];

    /// Canonical status code, `None` for [`ErrorKind::Generic`].
    #[must_use]
    pub const fn status_code(self) -> Option<u16> {
        match self {
            ErrorKind::AuthorizationRequired => Some(401),
            ErrorKind::BadRequest => Some(400),
            ErrorKind::Forbidden => Some(403),
            ErrorKind::Generic => None,
            ErrorKind::Teapot => Some(418),
            ErrorKind::InternalServerError => Some(500),
            ErrorKind::MethodNotAllowed => Some(405),
            ErrorKind::NotFound => Some(404),
            ErrorKind::NotImplemented => Some(501),
            ErrorKind::PaymentRequired => Some(402),
            ErrorKind::ServiceUnavailable => Some(503),
            ErrorKind::TooManyRequests => Some(429),
            ErrorKind::UnavailableForLegalReasons => Some(451),
            ErrorKind::UnsupportedMediaType => Some(415),
        }
    }

    /// Message used when the error is raised without one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorKind::AuthorizationRequired => "Authorization Required",
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::Generic => "Error",
            ErrorKind::Teapot => "I'm a teapot",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::NotImplemented => "Not Implemented",
            ErrorKind::PaymentRequired => "Payment Required",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::UnavailableForLegalReasons => "Unavailable For Legal Reasons",
            ErrorKind::UnsupportedMediaType => "Unsupported Media Type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_message())
    }
}

/// A taxonomy error: always caught by the dispatcher and mapped to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: ErrorKind,
    message: String,
    /// Only meaningful for `Generic`, which has no canonical code.
    status: Option<u16>,
}

impl HttpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// A [`ErrorKind::Generic`] error answered with an explicit status.
    pub fn generic(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Generic,
            message: message.into(),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Status code sent to the client. `Generic` errors raised without a
    /// status fall back to 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
            .or_else(|| self.kind.status_code())
            .unwrap_or(500)
    }

    /// The message sent in the error body, or the kind's default when empty.
    #[must_use]
    pub fn message(&self) -> &str {
        if self.message.is_empty() {
            self.kind.default_message()
        } else {
            &self.message
        }
    }

    pub fn authorization_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationRequired, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn teapot(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Teapot, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaymentRequired, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    pub fn unavailable_for_legal_reasons(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnavailableForLegalReasons, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMediaType, message)
    }
}

impl From<ErrorKind> for HttpError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, String::new())
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.status())
    }
}

impl std::error::Error for HttpError {}
