use super::*;

#[test]
fn success_covers_2xx_only() {
    assert!(HttpResponse::new(200, "").is_success());
    assert!(HttpResponse::new(201, "").is_success());
    assert!(HttpResponse::new(299, "").is_success());
    assert!(!HttpResponse::new(199, "").is_success());
    assert!(!HttpResponse::new(301, "").is_success());
    assert!(!HttpResponse::new(401, "").is_success());
    assert!(!HttpResponse::new(500, "").is_success());
}

#[test]
fn builds_client_with_and_without_timeouts() {
    assert!(ReqwestTransport::new(Timeouts::default()).is_ok());
    assert!(ReqwestTransport::new(Timeouts { request_secs: Some(30), connect_secs: Some(5) }).is_ok());
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ReqwestTransport::new(Timeouts { request_secs: Some(5), connect_secs: Some(2) }).unwrap();
    let request = HttpRequest {
        method: Method::GET,
        url: Url::parse(&format!("http://{addr}/auth/login")).unwrap(),
        headers: HeaderMap::new(),
        body: None,
    };
    let err = transport.send(request).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
}

#[test]
fn request_debug_hides_body() {
    let request = HttpRequest {
        method: Method::POST,
        url: Url::parse("http://backend.test/auth/login").unwrap(),
        headers: HeaderMap::new(),
        body: Some(r#"{"password":"hunter2"}"#.to_owned()),
    };
    let printed = format!("{request:?}");
    assert!(!printed.contains("hunter2"));
    assert!(printed.contains("body_len"));
}
