use crate::RequestContext;
use bitrpc::{ResponseRecorder, RpcType, ServerRequest};
use std::{future::Future, pin::Pin, sync::Arc};

/// The error type business logic returns. Only [`bitrpc::RpcError`] values
/// (see [`bitrpc::new_error`]) reach the caller intact.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A registered method, erased over its argument and result types.
///
/// It receives the request after the method name has been resolved and
/// drives it to completion: bind args, call business logic, write the reply.
pub type RpcMethodHandler = Arc<
    dyn Fn(RequestContext, ServerRequest) -> Pin<Box<dyn Future<Output = ResponseRecorder> + Send>>
        + Send
        + Sync,
>;

/// Wraps a typed async handler into an [`RpcMethodHandler`].
///
/// The argument value starts as `A::default()`, so a call without params
/// reaches the handler with the default value.
pub fn wrap_method_handler<A, R, F, Fut>(handler: F) -> RpcMethodHandler
where
    A: RpcType + Default + Send + 'static,
    R: RpcType + Send + 'static,
    F: Fn(RequestContext, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
{
    Arc::new(move |context: RequestContext, mut request: ServerRequest| {
        let mut args = A::default();
        let call = request
            .read_request(&mut args)
            .map(|()| handler(context, args));

        Box::pin(async move {
            let mut recorder = ResponseRecorder::new();

            match call {
                Err(err) => request.send_error(&mut recorder, &err),
                Ok(call) => match call.await {
                    Ok(reply) => request.send_response(&mut recorder, &reply),
                    Err(err) => request.send_error(&mut recorder, &*err),
                },
            }

            recorder
        }) as Pin<Box<dyn Future<Output = ResponseRecorder> + Send>>
    })
}
