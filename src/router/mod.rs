//! # Router Module
//!
//! Route tables for the dispatcher. A [`RouteGroup`] is a named, ordered list
//! of [`Route`]s; the dispatcher scans every registered group in
//! registration order and asks each one to match the request path.
//!
//! ## Patterns
//!
//! Patterns are compiled once, at construction, into anchored regexes.
//! `{name}` segments capture one path segment each:
//!
//! ```rust
//! use apigate::router::{Route, RouteGroup};
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let group = RouteGroup::new("users").with_route(Route::get(
//!     "get_user",
//!     "/users/{id}",
//!     |req, res| {
//!         res.set_payload(serde_json::json!({ "id": req.route_param("id") }));
//!         Ok(())
//!     },
//! )?);
//!
//! let matched = group.match_path(&Method::GET, "/users/42").expect("route");
//! assert_eq!(matched.get_param("id"), Some("42"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Parameters
//!
//! A match carries the route defaults, the internal `_route` name and the
//! extracted path parameters. Names starting with `_` are metadata: they are
//! stripped from [`RouteMatch::public_params`], which is all handlers and
//! hooks ever see.

mod core;

pub use self::core::{
    reduce_params, Handler, ParamVec, Route, RouteGroup, RouteMatch, INTERNAL_PARAM_PREFIX,
    MAX_INLINE_PARAMS, ROUTE_NAME_PARAM,
};
