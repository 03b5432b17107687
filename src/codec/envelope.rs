use crate::codec::{RpcError, RpcType, Value, decode_bitcode, encode_bitcode};
use crate::constants::NOTIFICATION_ID;
use bitcode::{Decode, Encode};
use std::error::Error;
use std::io::Read;

/// The envelope framing one inbound call.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RequestEnvelope {
    /// Target procedure, conventionally `Service.Method`.
    pub method: String,

    /// Arguments, absent for zero-argument methods.
    pub params: Option<Value>,

    /// Correlation id. `0` marks a notification, which gets no reply on
    /// success.
    pub id: u64,
}

impl RequestEnvelope {
    pub fn new<A: RpcType>(method: &str, args: Option<&A>, id: u64) -> Result<Self, RpcError> {
        Ok(Self {
            method: method.to_string(),
            params: args.map(|args| args.to_value()).transpose()?,
            id,
        })
    }

    pub fn is_notification(&self) -> bool {
        self.id == NOTIFICATION_ID
    }
}

/// The envelope framing one reply. `result` and `error` are never both set.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ResponseEnvelope {
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: u64,
}

pub fn encode_request(envelope: &RequestEnvelope) -> Vec<u8> {
    encode_bitcode(envelope)
}

pub fn decode_request(bytes: &[u8]) -> Result<RequestEnvelope, RpcError> {
    decode_bitcode(bytes)
}

/// Encodes a reply.
///
/// Fails with [`RpcError::Encode`] if `error` is not a registered shape (see
/// [`RpcError::from_dyn`]); the caller is expected to fall back to
/// [`encode_fallback_response`].
pub fn encode_response(
    result: Option<Value>,
    error: Option<&(dyn Error + 'static)>,
    id: u64,
) -> Result<Vec<u8>, RpcError> {
    let error = error.map(RpcError::from_dyn).transpose()?;

    Ok(encode_bitcode(&ResponseEnvelope { result, error, id }))
}

/// Encodes the reply sent in place of one that could not be encoded.
///
/// Only the diagnostic is carried, and every `RpcError` is encodable, so
/// this cannot fail.
pub fn encode_fallback_response(diagnostic: RpcError, id: u64) -> Vec<u8> {
    encode_bitcode(&ResponseEnvelope {
        result: None,
        error: Some(diagnostic),
        id,
    })
}

pub fn decode_response(bytes: &[u8]) -> Result<ResponseEnvelope, RpcError> {
    decode_bitcode(bytes)
}

/// Drains `reader` to completion.
pub fn read_body<R: Read>(mut reader: R) -> Result<Vec<u8>, RpcError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(RpcError::decode)?;
    Ok(bytes)
}
