use axum::http::HeaderMap;
use std::net::SocketAddr;

/// What a handler gets to know about the HTTP request that carried its call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub headers: HeaderMap,

    /// Peer address, when the server was started with connect info (always
    /// the case for `RpcServer::serve*`).
    pub remote_addr: Option<SocketAddr>,
}
