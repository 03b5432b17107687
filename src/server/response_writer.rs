use http::StatusCode;

/// The sink a [`ServerRequest`](crate::ServerRequest) writes its reply to.
///
/// Implementations are supplied by the hosting dispatcher. A writer is called
/// at most once per exchange; a notification that succeeds never calls it.
pub trait ResponseWriter {
    /// Emits the whole reply. `body` is always a bitcode encoded
    /// `ResponseEnvelope` and should be sent with
    /// [`CONTENT_TYPE`](crate::constants::CONTENT_TYPE).
    fn write_response(&mut self, status: StatusCode, body: Vec<u8>);
}

/// An in-memory [`ResponseWriter`] that records what was written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseRecorder {
    pub status: Option<StatusCode>,
    pub body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything was written at all.
    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }

    /// The recorded status, or `200 OK` if nothing was written (what an HTTP
    /// server sends for an untouched response).
    pub fn status_or_ok(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }
}

impl ResponseWriter for ResponseRecorder {
    fn write_response(&mut self, status: StatusCode, body: Vec<u8>) {
        self.status = Some(status);
        self.body = body;
    }
}
