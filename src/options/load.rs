use std::path::Path;

use anyhow::Context;
use tracing::info;

use super::ApiOptions;

impl ApiOptions {
    /// Parse options from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or has fields of
    /// the wrong shape.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("invalid options document")
    }

    /// Load options from a file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file {}", path.display()))?;

        let options: ApiOptions = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid options file {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid options file {}", path.display()))?
        };

        info!(
            path = %path.display(),
            label = %options.label(),
            request_type = options.request_type().tag(),
            response_type = options.response_type().tag(),
            environment = ?options.environment(),
            "Options loaded"
        );
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Environment, RequestType};
    use crate::response::ResponseFormat;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let opts = ApiOptions::from_yaml_str("response_type: response_xml\n").unwrap();
        assert_eq!(opts.response_type(), ResponseFormat::Xml);
        assert_eq!(opts.request_type(), RequestType::Json);
        assert!(opts.accepts_any_api_key());
        assert_eq!(opts.environment(), Environment::Development);
    }

    #[test]
    fn test_methods_normalized_on_load() {
        let opts = ApiOptions::from_yaml_str("allowed_methods: [get, post, Get]\n").unwrap();
        assert_eq!(opts.allowed_methods(), ["GET", "POST"]);
    }

    #[test]
    fn test_unknown_format_tag_is_rejected() {
        assert!(ApiOptions::from_yaml_str("response_type: response_csv\n").is_err());
    }
}
