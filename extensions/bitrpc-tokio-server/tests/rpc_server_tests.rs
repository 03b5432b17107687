use axum::body::{Body, to_bytes};
use bitcode::{Decode, Encode};
use bitrpc::{
    RpcError, RpcType, build_request, decode_client_response, encode_client_notification,
    new_error, rpc_type,
};
use bitrpc_tokio_server::{
    BoxError, RPC_PATH, RequestContext, RpcServer, RpcServerError,
};
use http::{Method, Request, StatusCode, header};
use std::io;
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Encode, Decode, Debug, Default, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

rpc_type!(Point);

async fn test_server() -> Arc<RpcServer> {
    let server = RpcServer::new();

    server
        .register_method("SomeService.Echo", |_: RequestContext, args: String| async move {
            Ok::<_, BoxError>(args)
        })
        .await
        .unwrap();

    server
        .register_method("SomeService.Error", |_: RequestContext, _: ()| async move {
            Err::<(), BoxError>(new_error("uh-oh").into())
        })
        .await
        .unwrap();

    server
        .register_method("SomeService.Unregistered", |_: RequestContext, _: ()| async move {
            Err::<(), BoxError>(io::Error::new(io::ErrorKind::Other, "uh-oh").into())
        })
        .await
        .unwrap();

    server
        .register_method("Geometry.Flip", |_: RequestContext, p: Point| async move {
            Ok::<_, BoxError>(Point { x: p.y, y: p.x })
        })
        .await
        .unwrap();

    server
        .register_method("SomeService.UserAgent", |ctx: RequestContext, _: ()| async move {
            let agent = ctx
                .headers
                .get(header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok::<_, BoxError>(agent)
        })
        .await
        .unwrap();

    Arc::new(server)
}

/// Sends one HTTP request through the router and returns status and body.
async fn send(server: &Arc<RpcServer>, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn do_request<A: RpcType, R: RpcType>(
    server: &Arc<RpcServer>,
    method: &str,
    args: Option<&A>,
) -> Result<R, RpcError> {
    let request = build_request(RPC_PATH, method, args)?.map(Body::from);
    let (_, body) = send(server, request).await;
    decode_client_response::<R>(&body[..])
}

#[tokio::test]
async fn test_echo() {
    let server = test_server().await;
    let reply: String = do_request(&server, "SomeService.Echo", Some(&"hello".to_string()))
        .await
        .unwrap();
    assert_eq!(reply, "hello");
}

#[tokio::test]
async fn test_registered_struct_roundtrip() {
    let server = test_server().await;
    let reply: Point = do_request(&server, "Geometry.Flip", Some(&Point { x: 1, y: 2 }))
        .await
        .unwrap();
    assert_eq!(reply, Point { x: 2, y: 1 });
}

#[tokio::test]
async fn test_bad_parameter() {
    let server = test_server().await;
    let err = do_request::<i64, String>(&server, "SomeService.Echo", Some(&3))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid parameter"), "{err}");
}

#[tokio::test]
async fn test_bad_return() {
    let server = test_server().await;
    let err = do_request::<String, i64>(&server, "SomeService.Echo", Some(&"hello".to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid return value"), "{err}");
}

#[tokio::test]
async fn test_error() {
    let server = test_server().await;
    let err = do_request::<(), ()>(&server, "SomeService.Error", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "uh-oh");
}

#[tokio::test]
async fn test_unregistered_error_hint() {
    let server = test_server().await;

    let request = build_request::<()>(RPC_PATH, "SomeService.Unregistered", None)
        .unwrap()
        .map(Body::from);
    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let err = decode_client_response::<()>(&body[..]).unwrap_err();
    assert!(matches!(err, RpcError::Encode(_)));
    assert!(err.to_string().contains("new_error()"), "{err}");
}

#[tokio::test]
async fn test_unknown_method() {
    let server = test_server().await;

    let request = build_request::<()>(RPC_PATH, "SomeService.Missing", None)
        .unwrap()
        .map(Body::from);
    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let err = decode_client_response::<()>(&body[..]).unwrap_err();
    assert_eq!(err, RpcError::MethodNotFound("SomeService.Missing".into()));
}

#[tokio::test]
async fn test_handler_sees_request_headers() {
    let server = test_server().await;

    let mut request = build_request::<()>(RPC_PATH, "SomeService.UserAgent", None)
        .unwrap()
        .map(Body::from);
    request
        .headers_mut()
        .insert(header::USER_AGENT, "bitrpc-tests".parse().unwrap());

    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        decode_client_response::<String>(&body[..]).unwrap(),
        "bitrpc-tests"
    );
}

#[tokio::test]
async fn test_notification_has_empty_body() {
    let server = test_server().await;

    let body = encode_client_notification("SomeService.Echo", Some(&"hello".to_string())).unwrap();
    let request = Request::post(RPC_PATH)
        .header(header::CONTENT_TYPE, bitrpc::constants::CONTENT_TYPE)
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_failed_notification_still_replies() {
    let server = test_server().await;

    let body = encode_client_notification::<()>("SomeService.Error", None).unwrap();
    let request = Request::post(RPC_PATH)
        .header(header::CONTENT_TYPE, bitrpc::constants::CONTENT_TYPE)
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        decode_client_response::<()>(&body[..]).unwrap_err(),
        new_error("uh-oh")
    );
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let server = test_server().await;

    let request = Request::post(RPC_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _) = send(&server, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_missing_content_type_uses_the_only_codec() {
    let server = test_server().await;

    let mut request = build_request(RPC_PATH, "SomeService.Echo", Some(&"hi".to_string()))
        .unwrap()
        .map(Body::from);
    request.headers_mut().remove(header::CONTENT_TYPE);

    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decode_client_response::<String>(&body[..]).unwrap(), "hi");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = test_server().await;

    let request = Request::post(RPC_PATH)
        .header(header::CONTENT_TYPE, bitrpc::constants::CONTENT_TYPE)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let err = decode_client_response::<()>(&body[..]).unwrap_err();
    assert!(matches!(err, RpcError::Decode(_)));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = RpcServer::new().with_max_body_size(8);
    server
        .register_method("SomeService.Echo", |_: RequestContext, args: String| async move {
            Ok::<_, BoxError>(args)
        })
        .await
        .unwrap();
    let server = Arc::new(server);

    let request = build_request(RPC_PATH, "SomeService.Echo", Some(&"hello".to_string()))
        .unwrap();
    assert!(request.body().len() > 8);

    let (status, body) = send(&server, request.map(Body::from)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let err = decode_client_response::<String>(&body[..]).unwrap_err();
    assert!(matches!(err, RpcError::Decode(_)), "{err}");
    assert!(err.to_string().contains("failed to read request body"), "{err}");
}

#[tokio::test]
async fn test_only_post_is_routed() {
    let server = test_server().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(RPC_PATH)
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&server, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_handler_registration() {
    let server = RpcServer::new();

    let result1 = server
        .register_method("A.B", |_: RequestContext, _: ()| async { Ok::<_, BoxError>(()) })
        .await;
    assert!(result1.is_ok());

    let result2 = server
        .register_method("A.B", |_: RequestContext, _: ()| async { Ok::<_, BoxError>(()) })
        .await;
    assert!(matches!(result2, Err(RpcServerError::DuplicateMethod(name)) if name == "A.B"));
}

#[tokio::test]
async fn test_serve_with_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = test_server().await;
    let _server_task = tokio::spawn(async move {
        let _ = server.serve_with_listener(listener).await;
    });

    // Plain HTTP/1.1 over a raw socket, to exercise the real listener path.
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let body = bitrpc::encode_client_request("SomeService.Echo", Some(&"wire".to_string())).unwrap();
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "POST {RPC_PATH} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        bitrpc::constants::CONTENT_TYPE,
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(&body).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let split = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .unwrap();
    let head = String::from_utf8_lossy(&raw[..split]);
    assert!(head.starts_with("HTTP/1.1 200"), "{head}");

    let reply = decode_client_response::<String>(&raw[split + 4..]).unwrap();
    assert_eq!(reply, "wire");
}
