use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::types::TaskContext;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCallConfig {
  #[serde(default)]
  method: Option<String>,
  #[serde(default)]
  url: Option<String>,
  #[serde(default)]
  headers: HashMap<String, String>,
  /// Milliseconds.
  #[serde(default)]
  timeout: Option<u64>,
}

/// Calls an HTTP endpoint and returns its JSON response.
#[derive(Debug, Clone, Default)]
pub struct ApiCallHandler {
  client: Client,
}

impl ApiCallHandler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_client(client: Client) -> Self {
    Self { client }
  }
}

fn parse_method(method: &str) -> Result<Method, TaskError> {
  match method.to_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "DELETE" => Ok(Method::DELETE),
    "PATCH" => Ok(Method::PATCH),
    "HEAD" => Ok(Method::HEAD),
    "OPTIONS" => Ok(Method::OPTIONS),
    _ => Err(TaskError::invalid_config(
      "method",
      format!("unsupported HTTP method: {method}"),
    )),
  }
}

async fn send(request: RequestBuilder) -> Result<Value, TaskError> {
  let response = request
    .send()
    .await
    .map_err(|e| TaskError::api_call(e.to_string()))?;

  let status = response.status();
  if !status.is_success() {
    return Err(TaskError::api_call(format!("HTTP {status}")));
  }

  response
    .json::<Value>()
    .await
    .map_err(|e| TaskError::api_call(format!("invalid JSON response: {e}")))
}

#[async_trait]
impl NodeHandler for ApiCallHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let config: ApiCallConfig = ctx.parse_config()?;

    let url = config
      .url
      .as_deref()
      .filter(|u| !u.is_empty())
      .ok_or_else(|| TaskError::invalid_config("url", "url is required"))?;
    let method = parse_method(config.method.as_deref().unwrap_or("GET"))?;
    let timeout_ms = config.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);

    let mut request = self.client.request(method.clone(), url);
    for (key, value) in &config.headers {
      request = request.header(key, value);
    }
    let sends_body = method == Method::POST || method == Method::PUT;
    if let Some(payload) = ctx.input("payload").filter(|_| sends_body) {
      request = request.json(payload);
    }

    debug!(
      node_id = %ctx.node_id,
      method = %method,
      url = %url,
      timeout_ms,
      "api_call_started"
    );

    tokio::select! {
      _ = cancel.cancelled() => Err(TaskError::Cancelled),
      _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
        Err(TaskError::api_call(format!("request timed out after {timeout_ms}ms")))
      }
      result = send(request) => result,
    }
  }
}
