//! Structured value to XML conversion for the XML response variant.
//!
//! Objects become nested elements in key order under a `<root>` element.
//! An array under a key repeats that key's element once per item; a
//! top-level array emits one `<item>` per entry.

use serde_json::Value;

use crate::error::HttpError;

const ROOT_ELEMENT: &str = "root";
const ITEM_ELEMENT: &str = "item";

/// The XML declaration for `charset`.
#[must_use]
pub fn declaration(charset: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="{charset}"?>"#)
}

/// Escape text content and attribute values.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Convert `value` to a complete XML document, declaration included.
///
/// # Errors
///
/// Returns `InternalServerError` when an object key cannot be used as an
/// element name.
pub fn to_xml(value: &Value, charset: &str) -> Result<String, HttpError> {
    let mut out = declaration(charset);
    out.push('\n');
    write_element(&mut out, ROOT_ELEMENT, value)?;
    out.push('\n');
    Ok(out)
}

fn write_element(out: &mut String, name: &str, value: &Value) -> Result<(), HttpError> {
    match value {
        Value::Null => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        Value::Object(map) if map.is_empty() => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        Value::Object(map) => {
            open(out, name);
            for (key, child) in map {
                let child_name = element_name(key)?;
                write_named(out, &child_name, child)?;
            }
            close(out, name);
        }
        Value::Array(items) => {
            open(out, name);
            for item in items {
                write_named(out, ITEM_ELEMENT, item)?;
            }
            close(out, name);
        }
        Value::String(s) => {
            open(out, name);
            out.push_str(&escape_text(s));
            close(out, name);
        }
        Value::Bool(_) | Value::Number(_) => {
            open(out, name);
            out.push_str(&value.to_string());
            close(out, name);
        }
    }
    Ok(())
}

/// Arrays below the root repeat the parent element instead of nesting.
fn write_named(out: &mut String, name: &str, value: &Value) -> Result<(), HttpError> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_named(out, name, item)?;
            }
            Ok(())
        }
        _ => write_element(out, name, value),
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn element_name(key: &str) -> Result<String, HttpError> {
    let name = key.replace(' ', "_");
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid_start && valid_rest {
        Ok(name)
    } else {
        Err(HttpError::internal(format!(
            "'{key}' is not a valid XML element name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: &Value) -> String {
        let xml = to_xml(value, "UTF-8").unwrap();
        xml.lines().nth(1).unwrap_or_default().to_string()
    }

    #[test]
    fn test_declaration_first() {
        let xml = to_xml(&json!({"x": "y"}), "UTF-8").unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(body(&json!({"x": "y"})), "<root><x>y</x></root>");
    }

    #[test]
    fn test_key_order_is_preserved() {
        let value = json!({"zeta": 1, "alpha": 2, "mid": 3});
        assert_eq!(
            body(&value),
            "<root><zeta>1</zeta><alpha>2</alpha><mid>3</mid></root>"
        );
    }

    #[test]
    fn test_nested_and_repeated() {
        let value = json!({"user": {"name": "a & b", "tags": ["x", "y"]}, "empty": null});
        assert_eq!(
            body(&value),
            "<root><user><name>a &amp; b</name><tags>x</tags><tags>y</tags></user><empty/></root>"
        );
    }

    #[test]
    fn test_top_level_array_uses_items() {
        assert_eq!(body(&json!([1, 2])), "<root><item>1</item><item>2</item></root>");
    }

    #[test]
    fn test_spaces_in_keys() {
        assert_eq!(body(&json!({"first name": "Ann"})), "<root><first_name>Ann</first_name></root>");
    }

    #[test]
    fn test_invalid_key_is_internal_error() {
        let err = to_xml(&json!({"1abc": true}), "UTF-8").unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_charset_in_declaration() {
        let xml = to_xml(&json!({"a": 1}), "ISO-8859-1").unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#));
    }
}
