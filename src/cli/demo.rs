//! The route groups served by `apigate serve`.
//!
//! | Method     | Path            | Auth | Payload                               |
//! |------------|-----------------|------|---------------------------------------|
//! | GET        | `/health`       | no   | `{"status":"ok","label":...}`         |
//! | GET, POST  | `/echo/{value}` | no   | the value, request params and body    |
//! | GET        | `/secure/ping`  | yes  | `{"pong":true}`                       |
//!
//! `/secure/ping` is gated by a [`BearerTokenAuth`] built from the
//! `auth_tokens` setting. Without that setting no strategy is installed and
//! the route is open.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::dispatcher::Dispatcher;
use crate::middleware::TracingMiddleware;
use crate::options::ApiOptions;
use crate::router::{Route, RouteGroup};
use crate::security::BearerTokenAuth;

pub const AUTH_TOKENS_SETTING: &str = "auth_tokens";

/// Build a dispatcher with the demo groups, tracing hooks and, when
/// configured, bearer-token auth.
///
/// # Errors
///
/// Returns an error if a route pattern fails to compile.
pub fn build_dispatcher(options: Arc<ApiOptions>) -> anyhow::Result<Dispatcher> {
    let label = options.label().to_string();
    let tokens = auth_tokens(&options);

    let mut dispatcher = Dispatcher::new(options);
    dispatcher.add_group(system_group(label)?);
    dispatcher.add_group(echo_group()?);

    let tracing_mw = Arc::new(TracingMiddleware);
    dispatcher.add_pre_processor("tracing", Arc::clone(&tracing_mw) as _);
    dispatcher.add_post_processor("tracing", tracing_mw);

    if tokens.is_empty() {
        warn!(setting = AUTH_TOKENS_SETTING, "No auth tokens configured, auth-required routes are open");
    } else {
        dispatcher.set_auth_strategy(Arc::new(BearerTokenAuth::new(tokens)));
    }
    Ok(dispatcher)
}

fn auth_tokens(options: &ApiOptions) -> Vec<String> {
    options
        .setting(AUTH_TOKENS_SETTING)
        .and_then(serde_yaml::Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(serde_yaml::Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn system_group(label: String) -> anyhow::Result<RouteGroup> {
    let health = Route::get("health", "/health", move |_req, res| {
        res.set_payload(json!({ "status": "ok", "label": label }));
        Ok(())
    })?;
    let ping = Route::get("secure_ping", "/secure/ping", |_req, res| {
        res.set_payload(json!({ "pong": true }));
        Ok(())
    })?
    .require_auth();

    Ok(RouteGroup::new("system").with_route(health).with_route(ping))
}

fn echo_group() -> anyhow::Result<RouteGroup> {
    let echo = Route::new(
        "echo",
        "/echo/{value}",
        &[Method::GET, Method::POST],
        |req, res| {
            let params: Map<String, Value> = req
                .params()
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect();
            res.set_payload(json!({
                "value": req.route_param("value"),
                "method": req.method().as_str(),
                "params": params,
                "body": req.body().cloned().unwrap_or(Value::Null),
            }));
            Ok(())
        },
    )?;
    Ok(RouteGroup::new("echo").with_route(echo))
}
