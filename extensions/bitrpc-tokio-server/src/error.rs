use std::io;

/// Errors raised while configuring or running an [`RpcServer`](crate::RpcServer).
///
/// Failures of individual exchanges never surface here; they are written back
/// to the caller inside a response envelope.
#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    #[error("a handler for method {0:?} is already registered")]
    DuplicateMethod(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
