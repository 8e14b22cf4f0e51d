//! # Middleware Module
//!
//! Hooks that run around matched handlers, plus the CORS policy that the
//! dispatcher applies to every request.
//!
//! Pre-processors run in registration order before the handler and
//! post-processors in registration order after it. Both lists are keyed by
//! identity (see [`crate::registry::Registry`]): registering again under an
//! existing identity swaps the instance but keeps its place in line.
//!
//! ```rust
//! use std::sync::Arc;
//! use apigate::middleware::Middleware;
//! use apigate::request::ApiRequest;
//! use apigate::response::ApiResponse;
//! use apigate::router::ParamVec;
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn after(&self, _p: &ParamVec, _req: &ApiRequest, res: &mut ApiResponse) -> anyhow::Result<()> {
//!         res.set_header("X-Powered-By", "apigate");
//!         Ok(())
//!     }
//! }
//!
//! let _hook: Arc<dyn Middleware> = Arc::new(PoweredBy);
//! ```

mod core;
mod cors;
mod tracing;

pub use self::core::Middleware;
pub use cors::CorsPolicy;
pub use self::tracing::TracingMiddleware;
