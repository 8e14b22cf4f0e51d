//! # Dispatcher Module
//!
//! The request pipeline. [`Dispatcher::process`] takes one [`ApiRequest`]
//! and writes exactly one response to a [`ResponseSink`].
//!
//! ## Request Flow
//!
//! 1. CORS headers are computed. An `OPTIONS` request is answered right
//!    here with status 200, those headers and an empty body.
//! 2. A fresh [`ApiResponse`] is created for the configured format and
//!    seeded with the CORS headers, so error responses carry them too.
//! 3. Preconditions run (see [`precondition`]): API key, method, content
//!    type.
//! 4. Route groups are scanned in registration order. Every group that
//!    matches runs its route; only the first can still transmit anything.
//! 5. For a matched route: method re-check (405), auth gate when the
//!    route requires it, pre-processors, handler, post-processors, send.
//! 6. No group matched: 404 with an empty body.
//!
//! Any [`HttpError`] raised along the way is turned into a response whose
//! status comes from the error and whose body follows the response format:
//!
//! | Format | Error body                                       |
//! |--------|--------------------------------------------------|
//! | JSON   | `{"success":false,"error":"<message>"}`          |
//! | XML    | `<success>false</success><error>message</error>` |
//! | Text   | the message                                      |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use apigate::dispatcher::Dispatcher;
//! use apigate::options::ApiOptions;
//! use apigate::request::ApiRequest;
//! use apigate::response::{BufferedSink, ResponseFormat};
//! use apigate::router::{Route, RouteGroup};
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = ApiOptions::new().with_response_type(ResponseFormat::Json);
//! let mut dispatcher = Dispatcher::new(Arc::new(options));
//! dispatcher.add_group(RouteGroup::new("users").with_route(Route::get(
//!     "get_user",
//!     "/users/{id}",
//!     |req, res| {
//!         res.set_payload(serde_json::json!({ "id": req.route_param("id") }));
//!         Ok(())
//!     },
//! )?));
//!
//! let mut sink = BufferedSink::new();
//! dispatcher.process(&ApiRequest::new(Method::GET, "/users/5"), &mut sink)?;
//! assert_eq!(sink.writes()[0].body_text(), r#"{"id":"5"}"#);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiRequest`]: crate::request::ApiRequest
//! [`ApiResponse`]: crate::response::ApiResponse
//! [`ResponseSink`]: crate::response::ResponseSink
//! [`HttpError`]: crate::error::HttpError

mod core;
pub mod precondition;


pub use self::core::Dispatcher;
