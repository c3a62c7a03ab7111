mod support;

use std::time::Duration;

use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use weft_task::handlers::ApiCallHandler;
use weft_task::{NodeHandler, TaskContext, TaskError};

fn ctx(config: Value, inputs: Value) -> TaskContext {
  TaskContext::new(
    "exec-1",
    "api",
    config,
    inputs.as_object().cloned().unwrap_or_else(Map::new),
  )
}

#[tokio::test]
async fn test_get_returns_parsed_json() {
  let (url, server) = support::serve_once(200, "application/json", r#"{"ok":true,"n":2}"#).await;
  let handler = ApiCallHandler::with_client(support::client());

  let value = handler
    .execute(
      &ctx(json!({ "url": format!("{url}/items"), "headers": { "x-trace": "abc" } }), json!({})),
      &CancellationToken::new(),
    )
    .await
    .unwrap();

  assert_eq!(value, json!({ "ok": true, "n": 2 }));
  let request = server.await.unwrap();
  assert!(request.starts_with("GET /items HTTP/1.1"));
  assert!(request.to_lowercase().contains("x-trace: abc"));
}

#[tokio::test]
async fn test_post_sends_payload_as_json_body() {
  let (url, server) = support::serve_once(200, "application/json", "{}").await;
  let handler = ApiCallHandler::with_client(support::client());

  handler
    .execute(
      &ctx(
        json!({ "url": url, "method": "post" }),
        json!({ "payload": { "name": "weft" } }),
      ),
      &CancellationToken::new(),
    )
    .await
    .unwrap();

  let request = server.await.unwrap();
  assert!(request.starts_with("POST / HTTP/1.1"));
  assert!(request.ends_with(r#"{"name":"weft"}"#));
}

#[tokio::test]
async fn test_error_status_fails() {
  let (url, _server) = support::serve_once(500, "application/json", "{}").await;
  let handler = ApiCallHandler::with_client(support::client());

  let err = handler
    .execute(&ctx(json!({ "url": url }), json!({})), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, TaskError::ApiCall { .. }));
  assert!(err.to_string().starts_with("API call failed: HTTP 500"));
}

#[tokio::test]
async fn test_non_json_body_fails() {
  let (url, _server) = support::serve_once(200, "text/plain", "hello").await;
  let handler = ApiCallHandler::with_client(support::client());

  let err = handler
    .execute(&ctx(json!({ "url": url }), json!({})), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, TaskError::ApiCall { .. }));
}

#[tokio::test]
async fn test_timeout() {
  let url = support::serve_silent().await;
  let handler = ApiCallHandler::with_client(support::client());

  let err = handler
    .execute(
      &ctx(json!({ "url": url, "timeout": 50 }), json!({})),
      &CancellationToken::new(),
    )
    .await
    .unwrap_err();

  assert!(
    matches!(&err, TaskError::ApiCall { message } if message.contains("timed out")),
    "got {err}"
  );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_runs_on_tokio_clock_and_leaves_run_token_alone() {
  let url = support::serve_silent().await;
  let handler = ApiCallHandler::with_client(support::client());
  let cancel = CancellationToken::new();

  let err = handler
    .execute(&ctx(json!({ "url": url, "timeout": 10_000 }), json!({})), &cancel)
    .await
    .unwrap_err();

  assert!(
    matches!(&err, TaskError::ApiCall { message } if message.contains("10000ms")),
    "got {err}"
  );
  assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn test_run_cancellation_aborts_request() {
  let url = support::serve_silent().await;
  let handler = ApiCallHandler::with_client(support::client());
  let cancel = CancellationToken::new();

  let trigger = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(20)).await;
    trigger.cancel();
  });

  let err = handler
    .execute(&ctx(json!({ "url": url }), json!({})), &cancel)
    .await
    .unwrap_err();

  assert!(matches!(err, TaskError::Cancelled));
}

#[tokio::test]
async fn test_missing_url_is_invalid_config() {
  let handler = ApiCallHandler::new();

  let err = handler
    .execute(&ctx(json!({}), json!({})), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, TaskError::InvalidConfig { field, .. } if field == "url"));
}
