//! # Response Module
//!
//! Response state and the three serialization variants.
//!
//! An [`ApiResponse`] is created per request for the [`ResponseFormat`]
//! chosen at startup. Hooks and handlers set its status, headers and
//! [`Payload`]; [`ApiResponse::send`] runs the variant's pre-send hook and
//! writes the result to a [`ResponseSink`] exactly once.
//!
//! | Variant | Content type       | Structured payload                    |
//! |---------|--------------------|---------------------------------------|
//! | Text    | configurable       | compact JSON text                     |
//! | Json    | `application/json` | `serde_json` serialization            |
//! | Xml     | `application/xml`  | element tree under `<root>`, declared |
//!
//! ```rust
//! use apigate::response::{ApiResponse, BufferedSink, ResponseFormat};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut sink = BufferedSink::new();
//! let mut res = ApiResponse::new(ResponseFormat::Json);
//! res.set_payload(serde_json::json!({ "a": 1 }));
//! res.send(&mut sink)?;
//! res.send(&mut sink)?; // no-op
//!
//! assert_eq!(sink.write_count(), 1);
//! assert_eq!(sink.writes()[0].body_text(), r#"{"a":1}"#);
//! # Ok(())
//! # }
//! ```

mod core;
mod format;
mod payload;
mod sink;
pub mod xml;

pub use self::core::{ApiResponse, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE};
pub use format::ResponseFormat;
pub use payload::{Payload, XmlDocument};
pub use sink::{BufferedSink, Emitted, ResponseSink};
