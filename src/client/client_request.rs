use crate::codec::{RequestEnvelope, RpcError, RpcType, encode_request};
use crate::constants::{CONTENT_TYPE, NOTIFICATION_ID};
use crate::utils::generate_request_id;
use http::{Method, Request, header};

/// Encodes a call to `method`, expecting a reply.
///
/// Pass `None` for zero-argument methods. A random non-zero id is assigned.
pub fn encode_client_request<A: RpcType>(
    method: &str,
    args: Option<&A>,
) -> Result<Vec<u8>, RpcError> {
    let envelope = RequestEnvelope::new(method, args, generate_request_id())?;
    Ok(encode_request(&envelope))
}

/// Encodes a notification: the server replies only if the call fails.
pub fn encode_client_notification<A: RpcType>(
    method: &str,
    args: Option<&A>,
) -> Result<Vec<u8>, RpcError> {
    let envelope = RequestEnvelope::new(method, args, NOTIFICATION_ID)?;
    Ok(encode_request(&envelope))
}

/// Builds an HTTP request calling `method` at `url`.
///
/// The body comes from [`encode_client_request`], the verb is `POST` and
/// `Content-Type` is set to [`CONTENT_TYPE`].
pub fn build_request<A: RpcType>(
    url: &str,
    method: &str,
    args: Option<&A>,
) -> Result<Request<Vec<u8>>, RpcError> {
    let message = encode_client_request(method, args)?;

    Request::builder()
        .method(Method::POST)
        .uri(url)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .body(message)
        .map_err(|err| RpcError::Encode(format!("invalid request to {url}: {err}")))
}
