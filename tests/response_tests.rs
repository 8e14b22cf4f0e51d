//! Response serialization through the public `ApiResponse` API.

use apigate::response::XmlDocument;
use apigate::{ApiResponse, BufferedSink, HttpError, Payload, ResponseFormat};
use serde_json::json;

#[test]
fn test_xml_document_from_nested_value() {
    let mut res = ApiResponse::new(ResponseFormat::Xml);
    res.set_payload(json!({
        "user": {"name": "Ann & Bob", "active": true},
        "tags": ["a", "b"],
        "none": null
    }));
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();

    let written = sink.last().unwrap();
    assert_eq!(written.header("Content-Type"), Some("application/xml"));
    let body = written.body_text();
    assert!(body.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(body.contains("<user><name>Ann &amp; Bob</name><active>true</active></user>"));
    assert!(body.contains("<tags>a</tags><tags>b</tags>"));
    assert!(body.contains("<none/>"));
}

#[test]
fn test_xml_document_passes_through() {
    let mut res = ApiResponse::new(ResponseFormat::Xml);
    res.set_payload(XmlDocument::new("<feed><entry/></feed>"));
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();
    assert_eq!(
        sink.last().unwrap().body_text(),
        r#"<?xml version="1.0" encoding="UTF-8"?><feed><entry/></feed>"#
    );
}

#[test]
fn test_xml_empty_payload_sends_empty_body() {
    let mut res = ApiResponse::new(ResponseFormat::Xml);
    res.set_payload(Payload::Empty);
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();
    assert!(sink.last().unwrap().body.is_empty());
}

#[test]
fn test_json_content_type_has_no_charset() {
    let mut res = ApiResponse::new(ResponseFormat::Json);
    res.set_charset("ISO-8859-1").set_payload(json!([1, 2, 3]));
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();

    let written = sink.last().unwrap();
    assert_eq!(written.header("Content-Type"), Some("application/json"));
    assert_eq!(written.body_text(), "[1,2,3]");
}

#[test]
fn test_text_charset_follows_setting() {
    let mut res = ApiResponse::new(ResponseFormat::Text);
    res.set_content_type("text/plain").set_charset("ISO-8859-1").set_payload("hi");
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();
    assert_eq!(
        sink.last().unwrap().header("Content-Type"),
        Some("text/plain; charset=ISO-8859-1")
    );
}

#[test]
fn test_second_send_is_ignored() {
    let mut res = ApiResponse::new(ResponseFormat::Text);
    res.set_status(201).set_payload("first");
    let mut sink = BufferedSink::new();
    res.send(&mut sink).unwrap();

    res.set_status(500).set_payload("second");
    res.send(&mut sink).unwrap();

    assert_eq!(sink.write_count(), 1);
    assert_eq!(sink.last().unwrap().status, 201);
    assert_eq!(sink.last().unwrap().body_text(), "first");
    assert!(res.is_sent());
}

#[test]
fn test_bad_xml_key_is_internal_error() {
    let mut res = ApiResponse::new(ResponseFormat::Xml);
    res.set_payload(json!({"1bad": "x"}));
    let mut sink = BufferedSink::new();
    let err = res.send(&mut sink).unwrap_err();
    let http_err = err.downcast_ref::<HttpError>().unwrap();
    assert_eq!(http_err.status(), 500);
    assert_eq!(sink.write_count(), 0);
}

#[test]
fn test_error_payload_shapes() {
    assert_eq!(
        ResponseFormat::Json.error_payload("nope"),
        Payload::from(json!({"success": false, "error": "nope"}))
    );
    assert_eq!(ResponseFormat::Text.error_payload("nope"), Payload::from("nope"));
    assert_eq!(
        ResponseFormat::Xml.error_payload("a<b"),
        Payload::from("<success>false</success><error>a&lt;b</error>")
    );
}
