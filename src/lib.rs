pub mod client;
pub mod codec;
pub mod constants;
pub mod server;
pub mod utils;

pub use client::{
    build_request, decode_client_response, encode_client_notification, encode_client_request,
};
pub use codec::{RequestEnvelope, ResponseEnvelope, RpcError, RpcType, Value, new_error};
pub use server::{BitcodeCodec, ResponseRecorder, ResponseWriter, ServerRequest};
