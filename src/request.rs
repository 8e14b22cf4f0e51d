//! Incoming request model.
//!
//! [`ApiRequest`] is built once per inbound call by whatever parses the wire
//! (see [`crate::server::request`]) and is never mutated afterwards. Handlers
//! see it through [`RoutedRequest`], which pairs it with the public route
//! parameters of the match being executed.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;

use crate::router::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage shared by requests and responses.
///
/// Names are `Arc<str>` because the same few names repeat on every request.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request identifier backed by ULID, used to correlate log lines.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse an upstream `X-Request-Id` when it is a valid ULID.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| ulid::Ulid::from_string(s).ok())
            .map(Self)
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse the query string of a URI into parameter pairs.
///
/// Everything after the first `?` is URL-decoded; a URI without a query
/// yields an empty list.
#[must_use]
pub fn parse_query_params(uri: &str) -> ParamVec {
    match uri.split_once('?') {
        Some((_, query)) => parse_form(query),
        None => ParamVec::new(),
    }
}

/// Parse an `application/x-www-form-urlencoded` string.
#[must_use]
pub fn parse_form(input: &str) -> ParamVec {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// An inbound API call: method, URI, headers and merged parameters.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    id: RequestId,
    method: Method,
    uri: String,
    path: String,
    headers: HeaderVec,
    params: ParamVec,
    body: Option<Value>,
}

impl ApiRequest {
    /// Start a request from its method and URI; query parameters are parsed
    /// from the URI immediately.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let path = uri
            .split_once('?')
            .map_or(uri.as_str(), |(path, _)| path)
            .to_string();
        let params = parse_query_params(&uri);
        Self {
            id: RequestId::new(),
            method,
            uri,
            path,
            headers: HeaderVec::new(),
            params,
            body: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    /// Append a header. Repeated names keep the first value for lookups.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Set a parameter, replacing any value already present.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.retain(|(k, _)| k.as_ref() != name);
        self.params.push((Arc::from(name), value.into()));
        self
    }

    /// Merge body (form) parameters. Query parameters take precedence, so a
    /// key already present is left alone.
    #[must_use]
    pub fn with_form_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (Arc<str>, String)>,
    {
        for (name, value) in params {
            if !self.params.iter().any(|(k, _)| *k == name) {
                self.params.push((name, value));
            }
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI without its query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Parsed JSON body, when the request carried one.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Convert headers to a HashMap with lower-cased names.
    /// Note: This allocates - use `header()` in hot paths
    #[must_use]
    pub fn headers_map(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect()
    }
}

/// The view of a request a handler receives: the request itself plus the
/// public parameters of the route that matched.
#[derive(Debug, Clone, Copy)]
pub struct RoutedRequest<'a> {
    request: &'a ApiRequest,
    route_params: &'a ParamVec,
}

impl<'a> RoutedRequest<'a> {
    #[must_use]
    pub fn new(request: &'a ApiRequest, route_params: &'a ParamVec) -> Self {
        Self {
            request,
            route_params,
        }
    }

    /// Get a route parameter by name
    ///
    /// Uses "last write wins" semantics, matching how path parameters
    /// override route defaults.
    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&'a str> {
        self.route_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn route_params(&self) -> &'a ParamVec {
        self.route_params
    }

    #[must_use]
    pub fn request(&self) -> &'a ApiRequest {
        self.request
    }
}

impl Deref for RoutedRequest<'_> {
    type Target = ApiRequest;

    fn deref(&self) -> &Self::Target {
        self.request
    }
}
