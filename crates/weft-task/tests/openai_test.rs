mod support;

use weft_task::{GenerationError, ImageGenerator, OpenAiCompatible, TextGenerator};

#[tokio::test]
async fn test_generate_text_reads_first_choice() {
  let (url, server) = support::serve_once(
    200,
    "application/json",
    r#"{"choices":[{"message":{"role":"assistant","content":"a short summary"}}]}"#,
  )
  .await;
  let provider = OpenAiCompatible::new(url, Some("sk-test".to_string()))
    .with_client(support::client())
    .with_text_model("tiny");

  let text = provider.generate_text("Summarize this", None).await.unwrap();
  assert_eq!(text, "a short summary");

  let request = server.await.unwrap();
  assert!(request.starts_with("POST /chat/completions HTTP/1.1"));
  assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
  assert!(request.contains(r#""model":"tiny""#));
  assert!(request.contains("Summarize this"));
}

#[tokio::test]
async fn test_generate_image_maps_aspect_ratio() {
  let (url, server) = support::serve_once(
    200,
    "application/json",
    r#"{"data":[{"url":"https://img/1.png"}]}"#,
  )
  .await;
  let provider = OpenAiCompatible::new(url, None).with_client(support::client());

  let images = provider
    .generate_image("a lighthouse", "16:9", Some("img-model"))
    .await
    .unwrap();
  assert_eq!(images, vec!["https://img/1.png"]);

  let request = server.await.unwrap();
  assert!(request.starts_with("POST /images/generations HTTP/1.1"));
  assert!(request.contains(r#""size":"1792x1024""#));
  assert!(request.contains(r#""model":"img-model""#));
}

#[tokio::test]
async fn test_provider_error_status() {
  let (url, _server) =
    support::serve_once(401, "application/json", r#"{"error":"bad key"}"#).await;
  let provider = OpenAiCompatible::new(url, None).with_client(support::client());

  let err = provider.generate_text("hi", None).await.unwrap_err();
  assert!(matches!(err, GenerationError::Provider(message) if message.contains("401")));
}
