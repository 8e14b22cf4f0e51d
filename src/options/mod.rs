//! # Options Module
//!
//! Process-wide configuration, read once at startup and shared read-only
//! across every request through `Arc<ApiOptions>`.
//!
//! Options can be built in code with the `with_*` setters or loaded from a
//! YAML file (see [`ApiOptions::from_yaml_file`]). Both paths normalize the
//! allowed methods to upper case.
//!
//! ```yaml
//! label: petstore
//! request_type: req/application/json
//! response_type: response_json
//! accepted_api_keys: ["k1", "k2"]
//! allowed_hosts: ["*"]
//! allowed_methods: [get, post, options]
//! environment: production
//! settings:
//!   auth_tokens: ["secret"]
//! ```

mod load;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::response::ResponseFormat;

/// Headers advertised in `Access-Control-Allow-Headers` unless configured.
pub const COMMON_CORS_HEADERS: [&str; 15] = [
    "X-API-KEY",
    "Origin",
    "Content-Type",
    "Accept",
    "Accept-Encoding",
    "Accept-Language",
    "Authorization",
    "Cache-Control",
    "Connection",
    "Set-Cookie",
    "Host",
    "Pragma",
    "Referer",
    "User-Agent",
    "Token",
];

/// Methods allowed unless configured.
pub const COMMON_CORS_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

/// Wildcard entry for the API key and host allow-lists.
pub const WILDCARD: &str = "*";

/// Expected request body encoding.
///
/// Non-GET requests must send a `Content-Type` that the tag ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "req/text/html", alias = "text")]
    Text,
    #[default]
    #[serde(rename = "req/application/json", alias = "json")]
    Json,
    #[serde(rename = "req/application/xml", alias = "xml")]
    Xml,
}

impl RequestType {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            RequestType::Text => "req/text/html",
            RequestType::Json => "req/application/json",
            RequestType::Xml => "req/application/xml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOptions {
    label: String,
    request_type: RequestType,
    response_type: ResponseFormat,
    accepted_api_keys: Vec<String>,
    allowed_hosts: Vec<String>,
    #[serde(deserialize_with = "deserialize_methods")]
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
    environment: Environment,
    settings: BTreeMap<String, serde_yaml::Value>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            label: String::new(),
            request_type: RequestType::default(),
            response_type: ResponseFormat::default(),
            accepted_api_keys: vec![WILDCARD.to_string()],
            allowed_hosts: vec![WILDCARD.to_string()],
            allowed_methods: COMMON_CORS_METHODS.iter().map(|m| (*m).to_string()).collect(),
            allowed_headers: COMMON_CORS_HEADERS.iter().map(|h| (*h).to_string()).collect(),
            environment: Environment::default(),
            settings: BTreeMap::new(),
        }
    }
}

impl ApiOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_request_type(mut self, request_type: RequestType) -> Self {
        self.request_type = request_type;
        self
    }

    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseFormat) -> Self {
        self.response_type = response_type;
        self
    }

    #[must_use]
    pub fn with_accepted_api_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_api_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allowed methods; names are upper-cased and de-duplicated.
    #[must_use]
    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_methods = normalize_methods(methods);
        self
    }

    #[must_use]
    pub fn with_allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_setting(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    #[must_use]
    pub fn response_type(&self) -> ResponseFormat {
        self.response_type
    }

    #[must_use]
    pub fn accepted_api_keys(&self) -> &[String] {
        &self.accepted_api_keys
    }

    #[must_use]
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    #[must_use]
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    #[must_use]
    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// True when the key allow-list contains the wildcard.
    #[must_use]
    pub fn accepts_any_api_key(&self) -> bool {
        self.accepted_api_keys.iter().any(|k| k == WILDCARD)
    }

    #[must_use]
    pub fn is_method_allowed(&self, method: &str) -> bool {
        self.allowed_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Free-form value from the `settings` map.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.settings.get(key)
    }

    #[must_use]
    pub fn settings(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.settings
    }
}

fn normalize_methods<I, S>(methods: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for method in methods {
        let upper = method.as_ref().trim().to_ascii_uppercase();
        if !upper.is_empty() && !out.contains(&upper) {
            out.push(upper);
        }
    }
    out
}

fn deserialize_methods<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_methods(raw))
}
