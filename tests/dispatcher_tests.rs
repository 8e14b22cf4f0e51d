//! End-to-end tests for the dispatch pipeline
//!
//! # Test Coverage
//!
//! - Precondition checks (API key, method, content type) and their error bodies
//! - Route group scanning and the 404 fallback
//! - Auth gate ordering relative to hooks and handler
//! - Single transmission of a response
//! - CORS headers on success, on errors and for preflight requests
//! - Hook registration by identity
//!
//! All tests observe the dispatcher through a `BufferedSink`.

mod common;

use std::sync::Arc;

use apigate::{ApiRequest, BufferedSink, HttpError, RequestType, ResponseFormat, Route, RouteGroup};
use common::fixtures::{call_log, dispatcher, entries, options, recording_group};
use common::hooks::Recorder;
use http::Method;
use serde_json::{json, Value};

fn body_json(sink: &BufferedSink) -> Value {
    serde_json::from_slice(&sink.last().unwrap().body).unwrap()
}

#[test]
fn test_wildcard_api_key_never_rejects() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json).with_accepted_api_keys(["abc", "*"]));
    d.add_group(recording_group("g", "/x", &log));

    for key in [None, Some("abc"), Some("definitely-wrong")] {
        let mut req = ApiRequest::new(Method::GET, "/x");
        if let Some(key) = key {
            req = req.with_header("X-API-KEY", key);
        }
        let mut sink = BufferedSink::new();
        d.process(&req, &mut sink).unwrap();
        assert_eq!(sink.last().unwrap().status, 200, "key {key:?}");
    }
}

#[test]
fn test_api_key_rejection_is_forbidden() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json).with_accepted_api_keys(["abc"]));
    d.add_group(recording_group("g", "/x", &log));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/x").with_header("X-API-KEY", "nope"), &mut sink)
        .unwrap();
    assert_eq!(sink.last().unwrap().status, 403);
    assert_eq!(body_json(&sink), json!({"success": false, "error": "Incorrect API key"}));
    assert!(entries(&log).is_empty());
}

#[test]
fn test_disallowed_method_is_405_with_format_shaped_body() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json).with_allowed_methods(["GET", "POST"]));
    d.add_group(recording_group("g", "/x", &log));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::DELETE, "/x"), &mut sink).unwrap();

    let written = sink.last().unwrap();
    assert_eq!(written.status, 405);
    assert_eq!(written.header("Content-Type"), Some("application/json"));
    let body = body_json(&sink);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
    assert!(entries(&log).is_empty());
}

#[test]
fn test_content_type_mismatch_is_400() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json).with_request_type(RequestType::Json));
    d.add_group(recording_group("g", "/x", &log));

    let mut sink = BufferedSink::new();
    let req = ApiRequest::new(Method::POST, "/x").with_header("Content-Type", "text/plain");
    d.process(&req, &mut sink).unwrap();

    assert_eq!(sink.last().unwrap().status, 400);
    assert_eq!(body_json(&sink), json!({"success": false, "error": "Incorrect Content-Type"}));
}

#[test]
fn test_second_group_matches() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json));
    d.add_group(recording_group("orders", "/orders/{id}", &log));
    d.add_group(recording_group("users", "/users/{id}", &log));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/users/5"), &mut sink).unwrap();

    assert_ne!(sink.last().unwrap().status, 404);
    assert_eq!(entries(&log), ["handler:users"]);
    assert_eq!(body_json(&sink), json!({"group": "users", "params": {"id": "5"}}));
}

#[test]
fn test_no_group_matches_is_404() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json));
    d.add_group(recording_group("users", "/users/{id}", &log));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/nothing/here"), &mut sink).unwrap();

    assert_eq!(sink.write_count(), 1);
    assert_eq!(sink.last().unwrap().status, 404);
    assert!(entries(&log).is_empty());
}

#[test]
fn test_no_groups_at_all_is_404() {
    let d = dispatcher(options(ResponseFormat::Text));
    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/"), &mut sink).unwrap();
    assert_eq!(sink.last().unwrap().status, 404);
}

#[test]
fn test_auth_failure_runs_nothing() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json)).with_auth_strategy(Arc::new(
        |_req: &ApiRequest| -> Result<(), HttpError> { Err(HttpError::authorization_required("who are you")) },
    ));
    let handler_log = Arc::clone(&log);
    d.add_group(
        RouteGroup::new("secure").with_route(
            Route::get("secret", "/secret", move |_req, _res| {
                handler_log.lock().unwrap().push("handler".to_string());
                Ok(())
            })
            .unwrap()
            .require_auth(),
        ),
    );
    d.add_pre_processor("pre", Arc::new(Recorder { label: "pre", log: Arc::clone(&log) }));
    d.add_post_processor("post", Arc::new(Recorder { label: "post", log: Arc::clone(&log) }));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/secret"), &mut sink).unwrap();

    assert_eq!(sink.last().unwrap().status, 401);
    assert_eq!(body_json(&sink), json!({"success": false, "error": "who are you"}));
    assert!(entries(&log).is_empty());
}

#[test]
fn test_auth_success_runs_pipeline_in_order() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json))
        .with_auth_strategy(Arc::new(apigate::BearerTokenAuth::new(["t"])));
    let handler_log = Arc::clone(&log);
    d.add_group(
        RouteGroup::new("secure").with_route(
            Route::get("secret", "/secret", move |_req, _res| {
                handler_log.lock().unwrap().push("handler".to_string());
                Ok(())
            })
            .unwrap()
            .require_auth(),
        ),
    );
    d.add_pre_processor("pre", Arc::new(Recorder { label: "pre", log: Arc::clone(&log) }));
    d.add_post_processor("post", Arc::new(Recorder { label: "post", log: Arc::clone(&log) }));

    let mut sink = BufferedSink::new();
    let req = ApiRequest::new(Method::GET, "/secret").with_header("Authorization", "Bearer t");
    d.process(&req, &mut sink).unwrap();

    assert_eq!(sink.last().unwrap().status, 200);
    assert_eq!(entries(&log), ["before:pre", "handler", "after:post"]);
}

#[test]
fn test_xml_error_body() {
    let d = dispatcher(options(ResponseFormat::Xml).with_allowed_methods(["GET"]));
    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::POST, "/x"), &mut sink).unwrap();

    let written = sink.last().unwrap();
    assert_eq!(written.status, 405);
    assert_eq!(written.header("content-type"), Some("application/xml"));
    let body = written.body_text();
    assert!(body.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(body.contains("<success>false</success><error>"));
}

#[test]
fn test_cors_headers_on_success_and_error() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json).with_accepted_api_keys(["k"]));
    d.add_group(recording_group("g", "/x", &log));

    let mut ok = BufferedSink::new();
    let req = ApiRequest::new(Method::GET, "/x")
        .with_header("Origin", "https://client.test")
        .with_header("X-API-KEY", "k");
    d.process(&req, &mut ok).unwrap();
    assert_eq!(
        ok.last().unwrap().header("Access-Control-Allow-Origin"),
        Some("https://client.test")
    );

    let mut rejected = BufferedSink::new();
    let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://client.test");
    d.process(&req, &mut rejected).unwrap();
    let written = rejected.last().unwrap();
    assert_eq!(written.status, 403);
    assert_eq!(written.header("Access-Control-Allow-Origin"), Some("https://client.test"));
    assert_eq!(written.header("Access-Control-Allow-Credentials"), Some("true"));
}

#[test]
fn test_preflight_short_circuits() {
    let log = call_log();
    // preconditions would reject this request if they ran
    let mut d = dispatcher(options(ResponseFormat::Json).with_accepted_api_keys(["k"]));
    d.add_group(recording_group("g", "/x", &log));
    d.add_pre_processor("pre", Arc::new(Recorder { label: "pre", log: Arc::clone(&log) }));

    let mut sink = BufferedSink::new();
    let req = ApiRequest::new(Method::OPTIONS, "/x").with_header("Origin", "https://client.test");
    d.process(&req, &mut sink).unwrap();

    let written = sink.last().unwrap();
    assert_eq!(sink.write_count(), 1);
    assert_eq!(written.status, 200);
    assert!(written.body.is_empty());
    assert_eq!(written.headers.len(), 4);
    assert!(written.header("Content-Type").is_none());
    assert!(entries(&log).is_empty());
}

#[test]
fn test_hook_reregistration_keeps_first_slot() {
    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json));
    d.add_group(recording_group("g", "/x", &log));
    d.add_pre_processor("first", Arc::new(Recorder { label: "a", log: Arc::clone(&log) }));
    d.add_pre_processor("second", Arc::new(Recorder { label: "b", log: Arc::clone(&log) }));
    let replaced = d.add_pre_processor("first", Arc::new(Recorder { label: "c", log: Arc::clone(&log) }));
    assert!(replaced);

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/x"), &mut sink).unwrap();
    assert_eq!(entries(&log), ["before:c", "before:b", "handler:g"]);
}

#[test]
fn test_hooks_may_shape_the_response() {
    struct Stamp;
    impl apigate::Middleware for Stamp {
        fn after(
            &self,
            _p: &apigate::router::ParamVec,
            _req: &ApiRequest,
            res: &mut apigate::ApiResponse,
        ) -> anyhow::Result<()> {
            res.set_header("X-Stamp", "1").set_status(202);
            Ok(())
        }
    }

    let log = call_log();
    let mut d = dispatcher(options(ResponseFormat::Json));
    d.add_group(recording_group("g", "/x", &log));
    d.add_post_processor("stamp", Arc::new(Stamp));

    let mut sink = BufferedSink::new();
    d.process(&ApiRequest::new(Method::GET, "/x"), &mut sink).unwrap();
    let written = sink.last().unwrap();
    assert_eq!(written.status, 202);
    assert_eq!(written.header("X-Stamp"), Some("1"));
}
