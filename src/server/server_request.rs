use crate::codec::{
    RequestEnvelope, RpcError, RpcType, Value, encode_fallback_response, encode_response,
};
use crate::constants::NOTIFICATION_ID;
use crate::server::ResponseWriter;
use http::StatusCode;
use std::error::Error;

/// Lifecycle of one inbound exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRequestState {
    /// The body was read and decoded (or the failure captured).
    Decoded,

    /// The method name was handed to the dispatcher.
    MethodResolved,

    /// The params were bound into the handler's argument value (or failed to).
    ArgsBound,

    /// A reply was written, or deliberately skipped for a notification.
    ResponseSent,
}

/// One decoded request, driven by the dispatcher in the fixed order
/// `method` -> `read_request` -> `send_response` | `send_error`.
#[derive(Debug)]
pub struct ServerRequest {
    envelope: Result<RequestEnvelope, RpcError>,
    state: ServerRequestState,
}

impl ServerRequest {
    pub(crate) fn new(envelope: Result<RequestEnvelope, RpcError>) -> Self {
        Self {
            envelope,
            state: ServerRequestState::Decoded,
        }
    }

    pub fn state(&self) -> ServerRequestState {
        self.state
    }

    /// The correlation id, or `0` if the envelope could not be decoded.
    pub fn id(&self) -> u64 {
        self.envelope
            .as_ref()
            .map(|envelope| envelope.id)
            .unwrap_or(NOTIFICATION_ID)
    }

    pub fn is_notification(&self) -> bool {
        self.id() == NOTIFICATION_ID
    }

    /// Returns the requested method name, or the decode failure captured when
    /// the request was created.
    pub fn method(&mut self) -> Result<&str, RpcError> {
        self.state = ServerRequestState::MethodResolved;

        match &self.envelope {
            Ok(envelope) => Ok(&envelope.method),
            Err(err) => Err(err.clone()),
        }
    }

    /// Binds the request params into `args`.
    ///
    /// A request without params leaves `args` untouched and succeeds, which
    /// is how zero-argument methods are called. Otherwise the params must be
    /// assignable to `A`.
    pub fn read_request<A: RpcType>(&mut self, args: &mut A) -> Result<(), RpcError> {
        self.state = ServerRequestState::ArgsBound;

        let envelope = self.envelope.as_ref().map_err(|err| err.clone())?;

        let Some(params) = &envelope.params else {
            return Ok(());
        };

        if !A::assignable_from(params) {
            let err = RpcError::InvalidParameter {
                expected: A::type_name().into_owned(),
                actual: params.type_name.clone(),
            };
            tracing::warn!(method = %envelope.method, error = %err, "rejected request params");
            return Err(err);
        }

        *args = A::from_value(params.clone())?;

        Ok(())
    }

    /// Writes `reply` as the result. Notifications get no reply.
    pub fn send_response<R, W>(&mut self, w: &mut W, reply: &R)
    where
        R: RpcType,
        W: ResponseWriter + ?Sized,
    {
        if !self.begin_send() {
            return;
        }

        if self.is_notification() {
            tracing::debug!(method = ?self.method_name(), "notification handled, no reply written");
            return;
        }

        match reply.to_value() {
            Ok(result) => self.write_server_response(w, StatusCode::OK, Some(result), None),
            Err(err) => self.write_fallback(w, err),
        }
    }

    /// Writes `err` as the error, notification or not.
    ///
    /// `err` must be a registered shape ([`RpcError`], e.g. from
    /// [`new_error`](crate::new_error)); anything else is replaced by an
    /// encode diagnostic sent with status 500.
    pub fn send_error<W>(&mut self, w: &mut W, err: &(dyn Error + 'static))
    where
        W: ResponseWriter + ?Sized,
    {
        if !self.begin_send() {
            return;
        }

        self.write_server_response(w, StatusCode::BAD_REQUEST, None, Some(err));
    }

    fn begin_send(&mut self) -> bool {
        if self.state == ServerRequestState::ResponseSent {
            tracing::warn!(id = self.id(), "reply already sent for this request, ignoring");
            return false;
        }

        self.state = ServerRequestState::ResponseSent;
        true
    }

    fn method_name(&self) -> Option<&str> {
        self.envelope
            .as_ref()
            .ok()
            .map(|envelope| envelope.method.as_str())
    }

    fn write_server_response<W>(
        &self,
        w: &mut W,
        status: StatusCode,
        result: Option<Value>,
        error: Option<&(dyn Error + 'static)>,
    ) where
        W: ResponseWriter + ?Sized,
    {
        match encode_response(result, error, self.id()) {
            Ok(body) => w.write_response(status, body),
            Err(err) => self.write_fallback(w, err),
        }
    }

    // The reply couldn't be encoded, so send one that is known to encode so
    // that the client learns what happened.
    fn write_fallback<W>(&self, w: &mut W, diagnostic: RpcError)
    where
        W: ResponseWriter + ?Sized,
    {
        tracing::error!(
            method = ?self.method_name(),
            id = self.id(),
            error = %diagnostic,
            "failed to encode response, sending diagnostic instead"
        );

        w.write_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            encode_fallback_response(diagnostic, self.id()),
        );
    }
}
