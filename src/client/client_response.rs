use crate::codec::{RpcError, RpcType, decode_response, read_body};
use std::io::Read;

/// Decodes a reply body into the caller's expected result type.
///
/// An error carried by the reply is returned as-is. Otherwise the result
/// must be assignable to `R`.
pub fn decode_client_response<R: RpcType>(body: impl Read) -> Result<R, RpcError> {
    let bytes = read_body(body)?;
    let response = decode_response(&bytes)?;

    if let Some(err) = response.error {
        return Err(err);
    }

    let Some(result) = response.result else {
        return Err(RpcError::Decode(format!(
            "response {} carries neither a result nor an error",
            response.id
        )));
    };

    if !R::assignable_from(&result) {
        return Err(RpcError::InvalidReturnValue {
            expected: R::type_name().into_owned(),
            actual: result.type_name,
        });
    }

    R::from_value(result)
}
