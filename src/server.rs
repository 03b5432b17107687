mod bitcode_codec;
mod response_writer;
mod server_request;

pub use bitcode_codec::BitcodeCodec;
pub use response_writer::{ResponseRecorder, ResponseWriter};
pub use server_request::{ServerRequest, ServerRequestState};
