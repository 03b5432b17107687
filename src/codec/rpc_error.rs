use crate::constants::UNREGISTERED_ERROR_HINT;
use bitcode::{Decode, Encode};
use std::error::Error;
use std::fmt;

/// The error shapes that can cross the wire inside a `ResponseEnvelope`.
///
/// This enum is the error registry. Any error a handler reports is carried
/// verbatim only if it is one of these variants; anything else is replaced
/// by an [`RpcError::Encode`] diagnostic when the response is written.
/// Business logic should build its errors with [`new_error`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, thiserror::Error)]
pub enum RpcError {
    /// A malformed or truncated envelope or payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request params are not assignable to the handler's argument type.
    #[error("invalid parameter: expected {expected}, but got {actual}")]
    InvalidParameter { expected: String, actual: String },

    /// The response result is not assignable to the caller's reply type.
    #[error("invalid return value: method returns {actual}, not {expected}")]
    InvalidReturnValue { expected: String, actual: String },

    /// The response could not be serialized.
    #[error("{0}")]
    Encode(String),

    /// No handler is registered under the requested method name.
    #[error("rpc: can't find method \"{0}\"")]
    MethodNotFound(String),

    /// An error returned by business logic.
    #[error("{0}")]
    Remote(String),
}

/// Returns a registered error that formats as the given text.
///
/// Errors built any other way (`std::io::Error`, `anyhow`, custom types) are
/// not registered and cannot be sent back to the caller. Returning one from
/// a handler makes the client receive an encode diagnostic instead.
pub fn new_error(text: impl Into<String>) -> RpcError {
    RpcError::Remote(text.into())
}

impl RpcError {
    pub(crate) fn decode(cause: impl fmt::Display) -> Self {
        RpcError::Decode(cause.to_string())
    }

    /// Looks up `err` in the registry.
    ///
    /// Returns the registered shape, or an [`RpcError::Encode`] describing the
    /// registration requirement if `err` is of any other concrete type.
    pub fn from_dyn(err: &(dyn Error + 'static)) -> Result<RpcError, RpcError> {
        match err.downcast_ref::<RpcError>() {
            Some(rpc_error) => Ok(rpc_error.clone()),
            None => Err(RpcError::Encode(format!(
                "bitrpc: type not registered for error {:?}{}",
                err.to_string(),
                UNREGISTERED_ERROR_HINT
            ))),
        }
    }

    /// Whether this is one of the two type mismatch variants.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            RpcError::InvalidParameter { .. } | RpcError::InvalidReturnValue { .. }
        )
    }
}
