use bitrpc::new_error;
use bitrpc_tokio_server::{BoxError, RequestContext, RpcServer, RpcServerError};
use std::env;
use tracing_subscriber::EnvFilter;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), RpcServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = env::var("BITRPC_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("BITRPC_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let server = RpcServer::new();

    server
        .register_method("SomeService.Echo", |_: RequestContext, args: String| async move {
            Ok::<_, BoxError>(args)
        })
        .await?;

    server
        .register_method("SomeService.Error", |_: RequestContext, _: ()| async move {
            Err::<(), BoxError>(new_error("uh-oh").into())
        })
        .await?;

    server.serve_on(&host, port).await?;

    Ok(())
}
