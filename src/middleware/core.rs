use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::router::ParamVec;

/// Hook run around every matched handler.
///
/// Pre-processors get `before`, post-processors get `after`; the dispatcher
/// decides which list an instance belongs to at registration. `params` are
/// the public route parameters (internal `_`-prefixed keys removed).
///
/// Returning an [`HttpError`](crate::error::HttpError) inside the
/// `anyhow::Error` aborts the request with that error's response.
pub trait Middleware: Send + Sync {
    fn before(
        &self,
        _params: &ParamVec,
        _req: &ApiRequest,
        _res: &mut ApiResponse,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn after(
        &self,
        _params: &ParamVec,
        _req: &ApiRequest,
        _res: &mut ApiResponse,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
