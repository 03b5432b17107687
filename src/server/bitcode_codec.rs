use crate::codec::{decode_request, read_body};
use crate::constants::CONTENT_TYPE;
use crate::server::ServerRequest;
use std::io::Read;

/// The bitcode codec, as registered with a dispatcher.
///
/// Stateless; one value can serve any number of concurrent exchanges.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitcodeCodec;

impl BitcodeCodec {
    pub fn new() -> Self {
        Self
    }

    /// The `Content-Type` this codec reads and writes.
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Reads the whole request body and decodes it.
    ///
    /// Never fails directly: a read or decode failure is captured in the
    /// returned request and reported by [`ServerRequest::method`].
    pub fn new_request<R: Read>(&self, body: R) -> ServerRequest {
        let envelope = read_body(body).and_then(|bytes| decode_request(&bytes));

        if let Err(err) = &envelope {
            tracing::debug!(error = %err, "failed to decode request envelope");
        }

        ServerRequest::new(envelope)
    }
}
