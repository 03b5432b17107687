mod envelope;
mod rpc_error;
mod rpc_type;

pub use envelope::*;
pub use rpc_error::*;
pub use rpc_type::*;
