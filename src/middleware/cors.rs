use std::sync::Arc;

use http::Method;
use tracing::debug;
use url::Url;

use crate::options::{ApiOptions, WILDCARD};
use crate::request::{ApiRequest, HeaderVec};

/// CORS header evaluation.
///
/// Computed before anything else for every request, so the headers also
/// reach error responses. The request's `Referer` is consulted first, then
/// `Origin`; without either no CORS headers are produced.
///
/// `Access-Control-Allow-Origin` echoes the caller's origin unless the host
/// is explicitly listed and the list holds no wildcard. Listed hosts are
/// served same-origin and need no echo. Hosts are compared exactly as the
/// header spells them, and an explicit port is echoed even when it is the
/// scheme's default.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_hosts: Vec<String>,
    allow_methods: String,
    allow_headers: String,
}

impl CorsPolicy {
    #[must_use]
    pub fn new(allowed_hosts: Vec<String>, methods: &[String], headers: &[String]) -> Self {
        Self {
            allowed_hosts,
            allow_methods: methods.join(", "),
            allow_headers: headers.join(", "),
        }
    }

    #[must_use]
    pub fn from_options(options: &ApiOptions) -> Self {
        Self::new(
            options.allowed_hosts().to_vec(),
            options.allowed_methods(),
            options.allowed_headers(),
        )
    }

    /// Headers to attach for `req`; empty when the request is not
    /// cross-origin.
    #[must_use]
    pub fn evaluate(&self, req: &ApiRequest) -> HeaderVec {
        let mut headers = HeaderVec::new();
        let Some(source) = Self::origin_source(req) else {
            return headers;
        };

        match Url::parse(source) {
            Ok(url) => {
                let authority = url.host_str().and(raw_authority(source));
                if let Some((host, port)) = authority {
                    if self.should_echo_origin(host) {
                        let origin = match port {
                            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                            None => format!("{}://{}", url.scheme(), host),
                        };
                        headers.push((Arc::from("Access-Control-Allow-Origin"), origin));
                    }
                }
            }
            Err(e) => {
                debug!(source = %source, error = %e, "Unparseable CORS origin, skipping Allow-Origin");
            }
        }

        headers.push((
            Arc::from("Access-Control-Allow-Methods"),
            self.allow_methods.clone(),
        ));
        headers.push((
            Arc::from("Access-Control-Allow-Headers"),
            self.allow_headers.clone(),
        ));
        headers.push((
            Arc::from("Access-Control-Allow-Credentials"),
            "true".to_string(),
        ));
        headers
    }

    #[must_use]
    pub fn is_preflight(req: &ApiRequest) -> bool {
        req.method() == Method::OPTIONS
    }

    fn origin_source(req: &ApiRequest) -> Option<&str> {
        req.header("referer")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| req.header("origin").filter(|v| !v.trim().is_empty()))
    }

    fn should_echo_origin(&self, host: &str) -> bool {
        let listed = self.allowed_hosts.iter().any(|h| h == host);
        let wildcard = self.allowed_hosts.iter().any(|h| h == WILDCARD);
        !listed || wildcard
    }
}

/// Host and port exactly as written in `source`, without the normalization
/// `Url` applies (lower-casing, dropping a default port).
fn raw_authority(source: &str) -> Option<(&str, Option<&str>)> {
    let (_, rest) = source.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            Some((host, Some(port)))
        }
        Some((host, "")) => Some((host, None)),
        _ => Some((authority, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(hosts: &[&str]) -> CorsPolicy {
        CorsPolicy::new(
            hosts.iter().map(|h| (*h).to_string()).collect(),
            &["GET".to_string(), "POST".to_string()],
            &["Content-Type".to_string()],
        )
    }

    fn header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_no_origin_no_headers() {
        let req = ApiRequest::new(Method::GET, "/x");
        assert!(policy(&["*"]).evaluate(&req).is_empty());
    }

    #[test]
    fn test_wildcard_echoes_origin_with_port() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "http://app.test:8080");
        let headers = policy(&["*"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("http://app.test:8080"));
        assert_eq!(header(&headers, "Access-Control-Allow-Methods"), Some("GET, POST"));
        assert_eq!(header(&headers, "Access-Control-Allow-Headers"), Some("Content-Type"));
        assert_eq!(header(&headers, "Access-Control-Allow-Credentials"), Some("true"));
    }

    #[test]
    fn test_listed_host_without_wildcard_gets_no_allow_origin() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://app.test");
        let headers = policy(&["app.test"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), None);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_unlisted_host_is_echoed() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://other.test");
        let headers = policy(&["app.test"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("https://other.test"));
    }

    #[test]
    fn test_referer_wins_over_origin() {
        let req = ApiRequest::new(Method::GET, "/x")
            .with_header("Referer", "https://ref.test/page?q=1")
            .with_header("Origin", "https://origin.test");
        let headers = policy(&["*"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("https://ref.test"));
    }

    #[test]
    fn test_empty_referer_falls_back_to_origin() {
        let req = ApiRequest::new(Method::GET, "/x")
            .with_header("Referer", "")
            .with_header("Origin", "https://origin.test");
        let headers = policy(&["*"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("https://origin.test"));
    }

    #[test]
    fn test_garbage_origin_keeps_fixed_headers() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "not a url");
        let headers = policy(&["*"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), None);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_explicit_default_port_is_kept() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://app.test:443");
        let headers = policy(&["*"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("https://app.test:443"));
    }

    #[test]
    fn test_host_match_is_case_sensitive() {
        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://app.test");
        let headers = policy(&["App.Test"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("https://app.test"));

        let req = ApiRequest::new(Method::GET, "/x").with_header("Origin", "https://App.Test");
        let headers = policy(&["App.Test"]).evaluate(&req);
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), None);
    }

    #[test]
    fn test_raw_authority_parts() {
        assert_eq!(raw_authority("http://u:p@h.test:81/x"), Some(("h.test", Some("81"))));
        assert_eq!(raw_authority("http://[::1]:8080"), Some(("[::1]", Some("8080"))));
        assert_eq!(raw_authority("http://[::1]"), Some(("[::1]", None)));
        assert_eq!(raw_authority("https://h.test?q=1"), Some(("h.test", None)));
        assert_eq!(raw_authority("no scheme"), None);
    }
}
