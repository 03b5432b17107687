//! Note: This `RpcServer` is a reference dispatcher and does not include
//! authentication, TLS or load balancing. It shows one way to host the
//! bitrpc codec over HTTP using the Axum web framework: codec selection by
//! `Content-Type`, method lookup by name, and the fixed
//! `method -> read_request -> send_response | send_error` call order.

use crate::{BoxError, RequestContext, RpcMethodHandler, RpcServerError, wrap_method_handler};
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use bitrpc::codec::encode_fallback_response;
use bitrpc::constants::{CONTENT_TYPE, CONTENT_TYPE_MEDIA, NOTIFICATION_ID};
use bitrpc::{BitcodeCodec, ResponseRecorder, ResponseWriter, RpcError, RpcType};
use std::collections::{HashMap, hash_map::Entry};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    sync::RwLock,
};

/// The path the RPC endpoint is mounted on.
pub const RPC_PATH: &str = "/rpc";

/// Upper bound on request bodies read by the server.
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// An HTTP RPC server dispatching bitrpc requests to registered methods.
pub struct RpcServer {
    codec: BitcodeCodec,
    methods: RwLock<HashMap<String, RpcMethodHandler>>,
    max_body_size: usize,
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcServer {
    pub fn new() -> Self {
        RpcServer {
            codec: BitcodeCodec::new(),
            methods: RwLock::new(HashMap::new()),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Registers `handler` under `name`, conventionally `Service.Method`.
    ///
    /// Fails if a handler with the same name already exists.
    pub async fn register_method<A, R, F, Fut>(
        &self,
        name: &str,
        handler: F,
    ) -> Result<(), RpcServerError>
    where
        A: RpcType + Default + Send + 'static,
        R: RpcType + Send + 'static,
        F: Fn(RequestContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        match self.methods.write().await.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RpcServerError::DuplicateMethod(name.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(wrap_method_handler(handler));
                tracing::debug!(method = name, "registered method");
                Ok(())
            }
        }
    }

    /// Builds the Axum router serving `POST /rpc`.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new().route(
            RPC_PATH,
            post({
                let server = self.clone();
                move |request: Request| async move { server.handle_http(request).await }
            }),
        )
    }

    /// Binds to an address and starts the RPC server.
    pub async fn serve<A: ToSocketAddrs>(self, addr: A) -> Result<SocketAddr, RpcServerError> {
        let listener = TcpListener::bind(addr).await?;
        Arc::new(self).serve_with_listener(listener).await
    }

    /// Starts the RPC server on a specific host and port.
    pub async fn serve_on(self, host: &str, port: u16) -> Result<SocketAddr, RpcServerError> {
        self.serve(format!("{host}:{port}")).await
    }

    /// Starts the RPC server with a pre-bound `TcpListener`.
    ///
    /// This is useful for binding to an ephemeral port (port 0) and then
    /// retrieving the actual address.
    pub async fn serve_with_listener(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<SocketAddr, RpcServerError> {
        let address = listener.local_addr()?;
        let app = self.router();

        tracing::info!("Server running on {:?}", address);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(address)
    }

    /// Runs one exchange through the codec and the registered method.
    ///
    /// Exposed separately from the HTTP layer so other transports can reuse
    /// the dispatch logic.
    pub async fn dispatch(&self, context: RequestContext, body: &[u8]) -> ResponseRecorder {
        let mut recorder = ResponseRecorder::new();
        let mut request = self.codec.new_request(body);

        let method = match request.method() {
            Ok(method) => method.to_string(),
            Err(err) => {
                request.send_error(&mut recorder, &err);
                return recorder;
            }
        };

        let handler = self.methods.read().await.get(&method).cloned();
        let Some(handler) = handler else {
            tracing::warn!(method = %method, "no handler registered for method");
            request.send_error(&mut recorder, &RpcError::MethodNotFound(method));
            return recorder;
        };

        tracing::debug!(method = %method, id = request.id(), "dispatching request");
        handler(context, request).await
    }

    async fn handle_http(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();

        if !accepts_content_type(&parts.headers) {
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            tracing::warn!(content_type, "rejected request with unsupported media type");
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("rpc: unrecognized Content-Type: {content_type}"),
            )
                .into_response();
        }

        let body = match to_bytes(body, self.max_body_size).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read request body");
                // Nothing was decoded, so the reply carries the notification id.
                let mut recorder = ResponseRecorder::new();
                recorder.write_response(
                    StatusCode::BAD_REQUEST,
                    encode_fallback_response(
                        RpcError::Decode(format!("failed to read request body: {err}")),
                        NOTIFICATION_ID,
                    ),
                );
                return into_http_response(recorder);
            }
        };

        let context = RequestContext {
            remote_addr: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            headers: parts.headers,
        };

        into_http_response(self.dispatch(context, &body).await)
    }
}

// A missing `Content-Type` is accepted since this server hosts one codec.
fn accepts_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(CONTENT_TYPE_MEDIA))
}

fn into_http_response(recorder: ResponseRecorder) -> Response {
    let status = recorder.status_or_ok();

    if recorder.body.is_empty() {
        return status.into_response();
    }

    (
        status,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        Body::from(recorder.body),
    )
        .into_response()
}
