//! Retry and normalization behavior of the executor against a live mock
//! server.

use std::sync::Arc;
use std::time::Duration;

use memeharness_evidence::FileRecorder;
use memeharness_http::{ApiRequest, AuthToken, Executor, HttpConfig, HttpError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAST: Duration = Duration::from_millis(10);

fn executor_for(server: &MockServer) -> Executor {
    Executor::new(server.uri()).expect("failed to build executor")
}

#[tokio::test]
async fn always_503_performs_exactly_n_attempts_and_returns_the_503() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    let response = executor
        .execute(ApiRequest::get("/meme").retries(4).backoff_base(FAST))
        .await
        .expect("5xx must be returned as data, not raised");

    assert_eq!(response.status_u16(), 503);
}

#[tokio::test]
async fn five_hundred_then_two_hundred_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"ok": true}"#, "application/json"))
        .with_priority(2)
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    let response = executor
        .execute(ApiRequest::get("/meme").retries(3).backoff_base(FAST))
        .await
        .unwrap();

    assert_eq!(response.status_u16(), 200);
    assert_eq!(response.json().unwrap()["ok"], true);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_errors_are_final_and_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme/99"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    let response = executor
        .execute(ApiRequest::get("/meme/99").retries(5).backoff_base(FAST))
        .await
        .unwrap();

    assert_eq!(response.status_u16(), 404);
}

#[tokio::test]
async fn live_token_overrides_caller_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .and(header("authorization", "issued-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    executor
        .token_store()
        .set(AuthToken::new("issued-token", "test_user"));

    // The caller's own Authorization value must be overwritten with the raw
    // token, no "Bearer " prefix.
    let response = executor
        .execute(
            ApiRequest::get("/meme")
                .header("Authorization", "caller-supplied")
                .backoff_base(FAST),
        )
        .await
        .unwrap();

    assert_eq!(response.status_u16(), 200);
}

#[tokio::test]
async fn unauthenticated_requests_send_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    executor.execute(ApiRequest::get("/meme")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn malformed_json_body_is_a_diagnostic_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string("{broken"),
        )
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    let response = executor.execute(ApiRequest::get("/meme")).await.unwrap();

    assert_eq!(response.status_u16(), 200);
    assert!(response.json().is_none());
    assert_eq!(response.body, "{broken");
}

#[tokio::test]
async fn non_json_content_type_keeps_body_raw_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/authorize/tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("Token is alive. Username is test_user"),
        )
        .mount(&server)
        .await;

    let executor = executor_for(&server);
    let response = executor
        .execute(ApiRequest::get("/authorize/tok"))
        .await
        .unwrap();

    assert!(response.json().is_none());
    assert!(response.body.ends_with("test_user"));
}

#[tokio::test]
async fn connection_failure_propagates_after_final_attempt() {
    // Nothing listens on this port; every attempt fails at connect time.
    let executor = Executor::new("http://127.0.0.1:1").unwrap();
    let result = executor
        .execute(ApiRequest::get("/meme").retries(2).backoff_base(FAST))
        .await;

    match result {
        Err(HttpError::Connect { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("expected connection failure, got {other:?}"),
    }
}

#[tokio::test]
async fn stalled_body_transfer_is_retried_like_a_send_failure() {
    // A raw socket that answers with headers promptly but never finishes
    // the declared body. The per-attempt timeout then fires while reading
    // the body, after send() has already returned.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000\r\n\r\npartial")
                    .await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    let executor = Executor::builder(format!("http://{addr}"))
        .config(HttpConfig {
            request_timeout: Duration::from_millis(250),
            ..HttpConfig::default()
        })
        .build()
        .unwrap();

    let result = executor
        .execute(ApiRequest::get("/meme").retries(2).backoff_base(FAST))
        .await;

    match result {
        Err(HttpError::Timeout { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("expected a timeout after the body stalled, got {other:?}"),
    }
}

#[tokio::test]
async fn final_response_is_recorded_as_evidence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/meme"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"id": 1, "text": "hello"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Arc::new(FileRecorder::new(dir.path()).unwrap());
    let executor = Executor::builder(server.uri())
        .recorder(recorder)
        .build()
        .unwrap();

    executor
        .execute(ApiRequest::post("/meme").json(serde_json::json!({"text": "hello"})))
        .await
        .unwrap();

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["000-response.txt", "001-response-json.json"]);
}
