use serde_json::Value;

/// A serialized XML document supplied by a handler; passed through verbatim
/// by the XML variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument(String);

impl XmlDocument {
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Response body before serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Text(String),
    Structured(Value),
    Xml(XmlDocument),
}

impl Payload {
    /// `true` for payloads that carry nothing to send: no value, an empty
    /// string, `null`, or an empty array/object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Text(s) => s.is_empty(),
            Payload::Xml(doc) => doc.as_str().is_empty(),
            Payload::Structured(value) => match value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                Value::Bool(_) | Value::Number(_) => false,
            },
        }
    }

    /// `true` when the payload is an array or object.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Payload::Structured(Value::Array(_) | Value::Object(_)))
    }

    /// Plain string rendering. Scalars print bare (strings unquoted),
    /// arrays and objects as compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Text(s) => s.clone(),
            Payload::Xml(doc) => doc.as_str().to_string(),
            Payload::Structured(value) => value_to_text(value),
        }
    }
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<XmlDocument> for Payload {
    fn from(doc: XmlDocument) -> Self {
        Payload::Xml(doc)
    }
}
