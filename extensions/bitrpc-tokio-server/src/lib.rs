mod error;
pub use error::RpcServerError;

mod method_handler;
pub use method_handler::*;

mod request_context;
pub use request_context::RequestContext;

mod rpc_server;
pub use rpc_server::*;

// Re-export so handlers can be written against this crate alone.
pub use bitrpc;
