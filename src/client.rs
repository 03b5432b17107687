mod client_request;
mod client_response;

pub use client_request::{build_request, encode_client_notification, encode_client_request};
pub use client_response::decode_client_response;
