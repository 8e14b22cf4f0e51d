//! # apigate
//!
//! **apigate** is a synchronous HTTP API dispatch core. For every request it
//! checks preconditions, matches route groups, gates authentication, runs a
//! pre/post hook pipeline around the handler and serializes the result in
//! the response format chosen at startup: plain text, JSON or XML.
//!
//! ## Architecture
//!
//! - **[`error`]** - closed error taxonomy; every [`HttpError`] becomes a response
//! - **[`request`]** - immutable [`ApiRequest`] and the handler view [`RoutedRequest`]
//! - **[`response`]** - [`ApiResponse`], the three format variants, XML conversion, [`ResponseSink`]
//! - **[`router`]** - [`Route`] patterns and ordered [`RouteGroup`] tables
//! - **[`middleware`]** - [`Middleware`] hooks, [`CorsPolicy`], tracing hook
//! - **[`security`]** - [`AuthStrategy`] and bearer-token auth
//! - **[`dispatcher`]** - [`Dispatcher::process`], the pipeline itself
//! - **[`options`]** - [`ApiOptions`] and YAML loading
//! - **[`server`]** - `tiny_http` hosting loop
//! - **[`telemetry`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `apigate` binary
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(tiny_http)
//!     participant Dispatcher
//!     participant Cors as CorsPolicy
//!     participant Pre as Preconditions
//!     participant Group as RouteGroup(s)
//!     participant Auth as AuthStrategy
//!     participant Handler
//!
//!     Client->>Server: HTTP request
//!     Server->>Dispatcher: process(ApiRequest, sink)
//!     Dispatcher->>Cors: evaluate
//!     alt OPTIONS
//!         Dispatcher-->>Client: 200 + CORS headers, empty body
//!     end
//!     Dispatcher->>Pre: API key, method, content type
//!     loop every group, registration order
//!         Dispatcher->>Group: match_path(method, path)
//!         Group-->>Dispatcher: RouteMatch
//!         Dispatcher->>Auth: authenticate (auth-required routes)
//!         Dispatcher->>Handler: pre-hooks, handler, post-hooks
//!         Dispatcher-->>Client: send (first send only)
//!     end
//!     alt no group matched
//!         Dispatcher-->>Client: 404
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use apigate::{ApiOptions, ApiRequest, BufferedSink, Dispatcher, ResponseFormat, Route, RouteGroup};
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = ApiOptions::new()
//!     .with_response_type(ResponseFormat::Xml)
//!     .with_allowed_methods(["GET"]);
//!
//! let mut dispatcher = Dispatcher::new(Arc::new(options));
//! dispatcher.add_group(RouteGroup::new("main").with_route(Route::get("hello", "/hello", |_req, res| {
//!     res.set_payload(serde_json::json!({ "greeting": "hi" }));
//!     Ok(())
//! })?));
//!
//! let mut sink = BufferedSink::new();
//! dispatcher.process(&ApiRequest::new(Method::GET, "/hello"), &mut sink)?;
//!
//! let written = &sink.writes()[0];
//! assert_eq!(written.status, 200);
//! assert!(written.body_text().contains("<greeting>hi</greeting>"));
//!
//! sink = BufferedSink::new();
//! dispatcher.process(&ApiRequest::new(Method::DELETE, "/hello"), &mut sink)?;
//! assert_eq!(sink.writes()[0].status, 405);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod options;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;
pub mod security;
pub mod server;
pub mod telemetry;

pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, HttpError};
pub use middleware::{CorsPolicy, Middleware};
pub use options::{ApiOptions, Environment, RequestType};
pub use request::{ApiRequest, RoutedRequest};
pub use response::{ApiResponse, BufferedSink, Payload, ResponseFormat, ResponseSink};
pub use router::{Route, RouteGroup, RouteMatch};
pub use security::{AuthStrategy, BearerTokenAuth};
