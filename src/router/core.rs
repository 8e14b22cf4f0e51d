//! Route tables and path matching.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use crate::request::RoutedRequest;
use crate::response::ApiResponse;

/// Maximum number of route parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter names starting with this character are route metadata and are
/// never exposed to handlers or hooks.
pub const INTERNAL_PARAM_PREFIX: char = '_';

/// Name of the internal parameter carrying the matched route's name.
pub const ROUTE_NAME_PARAM: &str = "_route";

/// Stack-allocated parameter storage.
///
/// Names are `Arc<str>` because they come from the route table, which is
/// built once at startup.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Handler invoked for a matched route. It may mutate the response's
/// status, headers and payload but must not send it.
pub type Handler =
    Arc<dyn Fn(&RoutedRequest<'_>, &mut ApiResponse) -> anyhow::Result<()> + Send + Sync>;

/// Drop every parameter whose name carries the internal prefix.
#[must_use]
pub fn reduce_params(params: &ParamVec) -> ParamVec {
    params
        .iter()
        .filter(|(k, _)| !k.starts_with(INTERNAL_PARAM_PREFIX))
        .cloned()
        .collect()
}

/// A single route: pattern, accepted methods, handler and metadata.
#[derive(Clone)]
pub struct Route {
    name: Arc<str>,
    pattern: String,
    methods: SmallVec<[Method; 4]>,
    handler: Handler,
    auth_required: bool,
    defaults: ParamVec,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("auth_required", &self.auth_required)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Build a route accepting `methods` on `pattern`.
    ///
    /// `pattern` uses `{name}` segments for path parameters, e.g.
    /// `/users/{id}/posts/{post_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error when the pattern cannot be compiled.
    pub fn new<F>(name: &str, pattern: &str, methods: &[Method], handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&RoutedRequest<'_>, &mut ApiResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let (regex, param_names) = path_to_regex(pattern)?;
        Ok(Self {
            name: Arc::from(name),
            pattern: pattern.to_string(),
            methods: methods.iter().cloned().collect(),
            handler: Arc::new(handler),
            auth_required: false,
            defaults: ParamVec::new(),
            regex,
            param_names,
        })
    }

    /// Shorthand for a `GET` route.
    pub fn get<F>(name: &str, pattern: &str, handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&RoutedRequest<'_>, &mut ApiResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, pattern, &[Method::GET], handler)
    }

    /// Shorthand for a `POST` route.
    pub fn post<F>(name: &str, pattern: &str, handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&RoutedRequest<'_>, &mut ApiResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, pattern, &[Method::POST], handler)
    }

    /// Mark the route as requiring the configured auth strategy.
    #[must_use]
    pub fn require_auth(mut self) -> Self {
        self.auth_required = true;
        self
    }

    /// Attach a default parameter. Names with the internal prefix stay
    /// private to the dispatcher.
    #[must_use]
    pub fn with_default(mut self, name: &str, value: impl Into<String>) -> Self {
        self.defaults.retain(|(k, _)| k.as_ref() != name);
        self.defaults.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    #[must_use]
    pub fn defaults(&self) -> &ParamVec {
        &self.defaults
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Match `path` against this route's pattern.
    ///
    /// The returned parameters are the route defaults, then `_route`, then
    /// the path parameters; a path parameter replaces a default of the same
    /// name.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = self.defaults.clone();
        params.push((Arc::from(ROUTE_NAME_PARAM), self.name.to_string()));
        for (idx, name) in self.param_names.iter().enumerate() {
            let Some(raw) = captures.get(idx + 1) else {
                continue;
            };
            let value = urlencoding::decode(raw.as_str())
                .map_or_else(|_| raw.as_str().to_string(), |v| v.into_owned());
            params.retain(|(k, _)| k != name);
            params.push((Arc::clone(name), value));
        }
        Some(params)
    }
}

impl Route {
    /// Build a URL for this route: `{name}` segments are filled from
    /// `params` (falling back to route defaults) and percent-encoded.
    /// Leftover params become the query string; `_`-prefixed ones are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when a path parameter has neither a value nor a
    /// default.
    pub fn generate(&self, params: &[(&str, &str)]) -> anyhow::Result<String> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
                .or_else(|| {
                    self.defaults
                        .iter()
                        .find(|(k, _)| k.as_ref() == name)
                        .map(|(_, v)| v.as_str())
                })
        };

        let mut path = String::with_capacity(self.pattern.len());
        for segment in self.pattern.split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                let name = &segment[1..segment.len() - 1];
                let value = lookup(name).ok_or_else(|| {
                    anyhow!("route '{}' needs a value for '{}'", self.name, name)
                })?;
                path.push_str(&urlencoding::encode(value));
            } else {
                path.push_str(segment);
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (name, value) in params {
            let in_path = self.param_names.iter().any(|p| p.as_ref() == *name);
            if !in_path && !name.starts_with(INTERNAL_PARAM_PREFIX) {
                query.append_pair(name, value);
                has_query = true;
            }
        }
        if has_query {
            path.push('?');
            path.push_str(&query.finish());
        }
        Ok(path)
    }
}

/// Result of matching a request path inside a [`RouteGroup`].
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    params: ParamVec,
    public_params: ParamVec,
}

impl RouteMatch {
    fn new(route: Arc<Route>, params: ParamVec) -> Self {
        let public_params = reduce_params(&params);
        Self {
            route,
            params,
            public_params,
        }
    }

    /// The matched route, with its declared methods, auth flag and handler.
    #[must_use]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// All parameters, internal metadata included.
    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Parameters safe to expose to handlers and hooks.
    #[must_use]
    pub fn public_params(&self) -> &ParamVec {
        &self.public_params
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A named, ordered table of routes scanned as one pass of the dispatcher.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    name: Arc<str>,
    routes: Vec<Arc<Route>>,
}

impl RouteGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            routes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.add_route(route);
        self
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(Arc::new(route));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the route for `path`.
    ///
    /// The first route whose pattern matches and that accepts `method` wins.
    /// When the path only matches routes declared for other methods, the
    /// first of those is returned so the caller can answer 405.
    #[must_use]
    pub fn match_path(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let mut fallback: Option<(&Arc<Route>, ParamVec)> = None;
        for route in &self.routes {
            let Some(params) = route.match_path(path) else {
                continue;
            };
            if route.accepts(method) {
                debug!(
                    group = %self.name,
                    route = %route.name,
                    pattern = %route.pattern,
                    path_params = ?params,
                    "Route matched"
                );
                return Some(RouteMatch::new(Arc::clone(route), params));
            }
            if fallback.is_none() {
                fallback = Some((route, params));
            }
        }

        fallback.map(|(route, params)| {
            debug!(
                group = %self.name,
                route = %route.name,
                method = %method,
                "Path matched but method is not declared by the route"
            );
            RouteMatch::new(Arc::clone(route), params)
        })
    }

    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|r| r.name() == name)
    }

    /// Reverse routing: the URL of the route called `name`. See
    /// [`Route::generate`].
    ///
    /// # Errors
    ///
    /// Returns an error if no route has that name or a path parameter is
    /// missing.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> anyhow::Result<String> {
        self.route(name)
            .ok_or_else(|| anyhow!("no route named '{}' in group '{}'", name, self.name))?
            .generate(params)
    }

    /// Print the table to stdout, one route per line.
    pub fn dump_routes(&self) {
        println!("[group] {} count={}", self.name, self.routes.len());
        for route in &self.routes {
            let methods: Vec<&str> = route.methods.iter().map(Method::as_str).collect();
            println!(
                "[route] {} {} -> {}{}",
                methods.join("|"),
                route.pattern,
                route.name,
                if route.auth_required { " (auth)" } else { "" }
            );
        }
    }
}

/// Convert a path pattern to an anchored regex and its parameter names.
///
/// `/users/{id}` becomes `^/users/([^/]+)$` with `["id"]`. Literal segments
/// are escaped.
///
/// # Errors
///
/// Returns an error if the generated regex fails to compile.
pub(crate) fn path_to_regex(path: &str) -> anyhow::Result<(Regex, Vec<Arc<str>>)> {
    if path == "/" || path.is_empty() {
        return Ok((Regex::new(r"^/$")?, Vec::new()));
    }

    let mut pattern = String::with_capacity(path.len() + 5);
    pattern.push('^');
    let mut param_names = Vec::with_capacity(path.matches('{').count());

    for segment in path.split('/') {
        if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
            let param_name = segment.trim_start_matches('{').trim_end_matches('}');
            pattern.push_str("/([^/]+)");
            param_names.push(Arc::from(param_name));
        } else if !segment.is_empty() {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }

    pattern.push('$');
    Ok((Regex::new(&pattern)?, param_names))
}
