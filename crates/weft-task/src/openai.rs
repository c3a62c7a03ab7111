//! Provider backed by an OpenAI-compatible HTTP API.
//!
//! Text generation and prompt enhancement use `POST {base}/chat/completions`;
//! images use `POST {base}/images/generations`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::providers::{
  EnhancedPrompt, GenerationError, ImageGenerator, PromptEnhancer, TextGenerator,
};

pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

const ENHANCE_INSTRUCTIONS: &str = "Rewrite the user's image prompt to be vivid and specific. \
Keep the subject and intent. Reply with the rewritten prompt only.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  size: &'a str,
  n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
  #[serde(default)]
  data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
  #[serde(default)]
  url: Option<String>,
  #[serde(default)]
  b64_json: Option<String>,
}

impl ImageData {
  fn into_reference(self) -> Option<String> {
    self
      .url
      .or_else(|| self.b64_json.map(|b64| format!("data:image/png;base64,{b64}")))
  }
}

/// Map an aspect ratio onto the closest supported image size.
pub fn image_size(aspect_ratio: &str) -> &'static str {
  match aspect_ratio {
    "16:9" | "3:2" | "4:3" => "1792x1024",
    "9:16" | "2:3" | "3:4" => "1024x1792",
    _ => "1024x1024",
  }
}

/// Client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
  http: Client,
  base_url: String,
  api_key: Option<String>,
  text_model: String,
  image_model: String,
}

impl OpenAiCompatible {
  pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key,
      text_model: DEFAULT_TEXT_MODEL.to_string(),
      image_model: DEFAULT_IMAGE_MODEL.to_string(),
    }
  }

  pub fn with_client(mut self, http: Client) -> Self {
    self.http = http;
    self
  }

  pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
    self.text_model = model.into();
    self
  }

  pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
    self.image_model = model.into();
    self
  }

  async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
    &self,
    path: &str,
    body: &Req,
  ) -> Result<Resp, GenerationError> {
    let mut request = self
      .http
      .post(format!("{}{}", self.base_url, path))
      .json(body);
    if let Some(key) = &self.api_key {
      request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(GenerationError::Provider(format!("{status}: {body}")));
    }
    Ok(response.json().await?)
  }

  async fn chat(
    &self,
    model: &str,
    messages: Vec<ChatMessage<'_>>,
  ) -> Result<String, GenerationError> {
    let response: ChatResponse = self
      .post("/chat/completions", &ChatRequest { model, messages })
      .await?;

    response
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(GenerationError::Empty)
  }
}

#[async_trait]
impl TextGenerator for OpenAiCompatible {
  async fn generate_text(
    &self,
    prompt: &str,
    model: Option<&str>,
  ) -> Result<String, GenerationError> {
    let model = model.unwrap_or(&self.text_model);
    self
      .chat(
        model,
        vec![ChatMessage {
          role: "user",
          content: prompt,
        }],
      )
      .await
  }
}

#[async_trait]
impl PromptEnhancer for OpenAiCompatible {
  async fn enhance_prompt(&self, prompt: &str) -> Result<EnhancedPrompt, GenerationError> {
    let rewritten = self
      .chat(
        &self.text_model,
        vec![
          ChatMessage {
            role: "system",
            content: ENHANCE_INSTRUCTIONS,
          },
          ChatMessage {
            role: "user",
            content: prompt,
          },
        ],
      )
      .await?;

    Ok(EnhancedPrompt {
      original_prompt: prompt.to_string(),
      final_prompt: rewritten.trim().to_string(),
    })
  }
}

#[async_trait]
impl ImageGenerator for OpenAiCompatible {
  async fn generate_image(
    &self,
    prompt: &str,
    aspect_ratio: &str,
    model: Option<&str>,
  ) -> Result<Vec<String>, GenerationError> {
    let request = ImageRequest {
      model: model.unwrap_or(&self.image_model),
      prompt,
      size: image_size(aspect_ratio),
      n: 1,
    };
    let response: ImageResponse = self.post("/images/generations", &request).await?;

    Ok(
      response
        .data
        .into_iter()
        .filter_map(ImageData::into_reference)
        .collect(),
    )
  }
}
