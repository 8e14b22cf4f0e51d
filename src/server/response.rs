use std::io;
use std::sync::Arc;

use tiny_http::{Header, Response};
use tracing::{error, warn};

use crate::response::ResponseSink;

/// [`ResponseSink`] that answers one `tiny_http` request.
///
/// The request is consumed by the first `emit`; later calls fail. If the
/// dispatcher never emitted (a failure outside the error taxonomy),
/// [`finish`](Self::finish) answers with a bare 500.
pub struct TinyHttpSink {
    request: Option<tiny_http::Request>,
}

impl TinyHttpSink {
    #[must_use]
    pub fn new(request: tiny_http::Request) -> Self {
        Self {
            request: Some(request),
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.request.is_none()
    }

    /// Answer with a payload-free 500 if nothing was sent.
    pub fn finish(mut self) {
        if let Some(request) = self.request.take() {
            warn!("No response was written, answering 500");
            if let Err(e) = request.respond(Response::empty(500)) {
                error!(error = %e, "Failed to write fallback response");
            }
        }
    }
}

impl ResponseSink for TinyHttpSink {
    fn emit(&mut self, status: u16, headers: &[(Arc<str>, String)], body: &[u8]) -> io::Result<()> {
        let request = self.request.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "response already written")
        })?;

        let mut response = Response::from_data(body.to_vec()).with_status_code(status);
        for (name, value) in headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => warn!(header = %name, "Skipping header that is not valid ASCII"),
            }
        }
        request.respond(response)
    }
}
