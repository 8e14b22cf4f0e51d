//! # Server Module
//!
//! Hosting loop for a [`Dispatcher`](crate::dispatcher::Dispatcher) on top
//! of `tiny_http`.
//!
//! The dispatcher only needs an [`ApiRequest`](crate::request::ApiRequest)
//! and a [`ResponseSink`](crate::response::ResponseSink); this module
//! supplies both from a blocking HTTP listener:
//!
//! - [`request::from_tiny_http`] turns the raw request into an `ApiRequest`;
//!   an oversized body becomes a 413 sent through `Dispatcher::reject`
//! - [`TinyHttpSink`] writes the emitted response back to the connection
//! - [`HttpServer`] runs a fixed pool of worker threads
//!
//! Errors that escape [`Dispatcher::process`](crate::dispatcher::Dispatcher::process)
//! are logged here and answered with a bare 500 when nothing has been sent.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apigate::dispatcher::Dispatcher;
//! use apigate::options::ApiOptions;
//! use apigate::server::HttpServer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(ApiOptions::default())));
//! let handle = HttpServer::new(dispatcher).workers(8).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! handle.stop();
//! # Ok(())
//! # }
//! ```

mod http_server;
pub mod request;
mod response;

pub use http_server::{HttpServer, ServerHandle, DEFAULT_WORKERS};
pub use response::TinyHttpSink;
