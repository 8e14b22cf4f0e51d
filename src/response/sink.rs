use std::io;
use std::sync::Arc;

/// Transport seam: where a sent response ends up.
///
/// `emit` is called at most once per [`ApiResponse`](super::ApiResponse);
/// the hosting server implements it on top of its connection, tests use
/// [`BufferedSink`].
pub trait ResponseSink {
    fn emit(&mut self, status: u16, headers: &[(Arc<str>, String)], body: &[u8]) -> io::Result<()>;
}

/// One recorded emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Emitted {
    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// In-memory sink that records every emission.
#[derive(Debug, Default, Clone)]
pub struct BufferedSink {
    writes: Vec<Emitted>,
}

impl BufferedSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn writes(&self) -> &[Emitted] {
        &self.writes
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Emitted> {
        self.writes.last()
    }
}

impl ResponseSink for BufferedSink {
    fn emit(&mut self, status: u16, headers: &[(Arc<str>, String)], body: &[u8]) -> io::Result<()> {
        self.writes.push(Emitted {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: body.to_vec(),
        });
        Ok(())
    }
}
