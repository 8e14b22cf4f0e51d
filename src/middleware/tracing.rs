use std::cell::RefCell;
use std::time::Instant;

use tracing::{debug, info};

use super::Middleware;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::router::ParamVec;

thread_local! {
    static STARTED: RefCell<Option<Instant>> = const { RefCell::new(None) };
}

/// Logs handler latency and the outgoing status.
///
/// Register the same instance as both a pre- and a post-processor: `before`
/// stamps the start time on the worker thread, `after` reads it back.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, params: &ParamVec, req: &ApiRequest, _res: &mut ApiResponse) -> anyhow::Result<()> {
        STARTED.with(|s| *s.borrow_mut() = Some(Instant::now()));
        debug!(
            request_id = %req.id(),
            method = %req.method(),
            path = %req.path(),
            params = ?params,
            "Handler starting"
        );
        Ok(())
    }

    fn after(&self, _params: &ParamVec, req: &ApiRequest, res: &mut ApiResponse) -> anyhow::Result<()> {
        let latency_ms = STARTED
            .with(|s| s.borrow_mut().take())
            .map(|start| start.elapsed().as_millis());
        info!(
            request_id = %req.id(),
            method = %req.method(),
            path = %req.path(),
            status = res.status(),
            latency_ms = ?latency_ms,
            "Handler finished"
        );
        Ok(())
    }
}
