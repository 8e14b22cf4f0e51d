use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn};

use super::precondition;
use crate::error::HttpError;
use crate::middleware::{CorsPolicy, Middleware};
use crate::options::ApiOptions;
use crate::registry::Registry;
use crate::request::{ApiRequest, HeaderVec, RoutedRequest};
use crate::response::{ApiResponse, ResponseSink};
use crate::router::{RouteGroup, RouteMatch};
use crate::security::AuthStrategy;

/// Per-request pipeline: CORS, preconditions, route groups, auth, hooks,
/// handler, send, and the mapping of [`HttpError`]s to error responses.
///
/// Everything inside is immutable once requests start flowing, so one
/// dispatcher is shared across worker threads behind an `Arc`.
pub struct Dispatcher {
    options: Arc<ApiOptions>,
    cors: CorsPolicy,
    groups: Registry<Arc<RouteGroup>>,
    pre: Registry<Arc<dyn Middleware>>,
    post: Registry<Arc<dyn Middleware>>,
    auth: Option<Arc<dyn AuthStrategy>>,
}

impl Dispatcher {
    /// Create a dispatcher with no groups, hooks or auth strategy.
    #[must_use]
    pub fn new(options: Arc<ApiOptions>) -> Self {
        let cors = CorsPolicy::from_options(&options);
        Dispatcher {
            options,
            cors,
            groups: Registry::new("group"),
            pre: Registry::new("pre-processor"),
            post: Registry::new("post-processor"),
            auth: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    pub fn set_auth_strategy(&mut self, strategy: Arc<dyn AuthStrategy>) {
        self.auth = Some(strategy);
    }

    #[must_use]
    pub fn with_auth_strategy(mut self, strategy: Arc<dyn AuthStrategy>) -> Self {
        self.set_auth_strategy(strategy);
        self
    }

    /// Register a route group under its own name. Groups are scanned in
    /// registration order.
    pub fn add_group(&mut self, group: RouteGroup) -> bool {
        let name = group.name().to_string();
        info!(group = %name, routes = group.len(), "Route group registered");
        self.groups.register(&name, Arc::new(group))
    }

    /// Register a hook whose `before` runs ahead of every matched handler.
    ///
    /// Re-registering an `id` swaps the hook in place.
    pub fn add_pre_processor(&mut self, id: &str, mw: Arc<dyn Middleware>) -> bool {
        self.pre.register(id, mw)
    }

    /// Register a hook whose `after` runs once the handler returns.
    pub fn add_post_processor(&mut self, id: &str, mw: Arc<dyn Middleware>) -> bool {
        self.post.register(id, mw)
    }

    pub fn groups(&self) -> impl Iterator<Item = &RouteGroup> {
        self.groups.iter().map(|(_, g)| g.as_ref())
    }

    /// URL of the first route called `name`, searching groups in
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if no group has such a route or a path parameter
    /// is missing.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> anyhow::Result<String> {
        self.groups()
            .find_map(|group| group.route(name))
            .ok_or_else(|| anyhow::anyhow!("no route named '{name}'"))?
            .generate(params)
    }

    /// Process one request, writing the response to `sink`.
    ///
    /// # Errors
    ///
    /// [`HttpError`]s never escape: they become the response. Anything else
    /// (a handler's own failure, transport I/O) is returned untouched.
    pub fn process(&self, req: &ApiRequest, sink: &mut dyn ResponseSink) -> anyhow::Result<()> {
        let span = info_span!(
            "dispatch",
            request_id = %req.id(),
            method = %req.method(),
            path = %req.path()
        );
        let _entered = span.enter();

        let cors_headers = self.cors.evaluate(req);
        if CorsPolicy::is_preflight(req) {
            debug!(cors_headers = cors_headers.len(), "Preflight answered");
            sink.emit(200, &cors_headers, b"")?;
            return Ok(());
        }

        let mut res = self.seeded_response(&cors_headers);
        match self.dispatch(req, &mut res, sink) {
            Ok(()) => Ok(()),
            Err(err) => match err.downcast::<HttpError>() {
                Ok(http_err) => self.send_error(&http_err, &mut res, sink),
                Err(other) => {
                    error!(error = %other, "Request failed outside the error taxonomy");
                    Err(other)
                }
            },
        }
    }

    /// Answer `req` with `err` without consulting preconditions or routes.
    ///
    /// For failures the hosting layer detects before dispatch, such as an
    /// oversized body. CORS headers and the error format apply as usual.
    ///
    /// # Errors
    ///
    /// Only transport failures from the sink.
    pub fn reject(
        &self,
        req: &ApiRequest,
        err: &HttpError,
        sink: &mut dyn ResponseSink,
    ) -> anyhow::Result<()> {
        let span = info_span!(
            "dispatch",
            request_id = %req.id(),
            method = %req.method(),
            path = %req.path()
        );
        let _entered = span.enter();

        let mut res = self.seeded_response(&self.cors.evaluate(req));
        self.send_error(err, &mut res, sink)
    }

    fn seeded_response(&self, cors_headers: &HeaderVec) -> ApiResponse {
        let mut res = ApiResponse::new(self.options.response_type());
        for (name, value) in cors_headers {
            res.set_header(name, value.clone());
        }
        res
    }

    fn dispatch(
        &self,
        req: &ApiRequest,
        res: &mut ApiResponse,
        sink: &mut dyn ResponseSink,
    ) -> anyhow::Result<()> {
        precondition::validate(&self.options, req)?;

        let mut matched = 0usize;
        for (name, group) in self.groups.iter() {
            let Some(route_match) = group.match_path(req.method(), req.path()) else {
                debug!(group = %name, "No route in group");
                continue;
            };
            matched += 1;
            if matched > 1 {
                warn!(
                    group = %name,
                    route = %route_match.route().name(),
                    "Path matched in more than one group; response was already sent"
                );
            }
            self.run_route(&route_match, req, res, sink)?;
        }

        if matched == 0 {
            info!("No route matched");
            res.set_status(404);
            res.send(sink)?;
        }
        Ok(())
    }

    /// Method check, auth gate, pre-hooks, handler, post-hooks, send.
    fn run_route(
        &self,
        route_match: &RouteMatch,
        req: &ApiRequest,
        res: &mut ApiResponse,
        sink: &mut dyn ResponseSink,
    ) -> anyhow::Result<()> {
        let route = route_match.route();
        if !route.accepts(req.method()) {
            return Err(HttpError::method_not_allowed(req.method().as_str()).into());
        }

        if route.auth_required() {
            if let Some(auth) = &self.auth {
                auth.authenticate(req)?;
            }
        }

        let params = route_match.public_params();
        for (id, mw) in self.pre.iter() {
            debug!(hook = %id, "Pre-processor");
            mw.before(params, req, res)?;
        }

        debug!(route = %route.name(), "Invoking handler");
        let routed = RoutedRequest::new(req, params);
        (**route.handler())(&routed, res)?;

        for (id, mw) in self.post.iter() {
            debug!(hook = %id, "Post-processor");
            mw.after(params, req, res)?;
        }

        res.send(sink)
    }

    fn send_error(
        &self,
        err: &HttpError,
        res: &mut ApiResponse,
        sink: &mut dyn ResponseSink,
    ) -> anyhow::Result<()> {
        let status = err.status();
        if status >= 500 {
            error!(status, kind = %err.kind(), message = %err.message(), "Request failed");
        } else {
            info!(status, kind = %err.kind(), message = %err.message(), "Request rejected");
        }

        let payload = res.format().error_payload(err.message());
        res.set_status(status).set_payload(payload);
        res.send(sink)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("label", &self.options.label())
            .field("groups", &self.groups.ids().collect::<Vec<_>>())
            .field("pre", &self.pre.ids().collect::<Vec<_>>())
            .field("post", &self.post.ids().collect::<Vec<_>>())
            .field("auth", &self.auth.is_some())
            .finish()
    }
}
