use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::providers::{ImageGenerator, LanguageModel, ProviderError};

const TEMPERATURE: f32 = 0.7;
// Error bodies are echoed into logs and API errors; keep them short.
const MAX_ERROR_BODY_CHARS: usize = 500;

static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n?\s*```\s*$").unwrap());

/// Client for an OpenAI-compatible API (chat completions and images).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    image_model: String,
    image_size: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

impl OpenAiClient {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let http = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.openai_base_url().to_string(),
            api_key: config.openai_api_key().map(str::to_string),
            chat_model: config.chat_model().to_string(),
            image_model: config.image_model().to_string(),
            image_size: config.image_size().to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(ProviderError::Status { status, body });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.chat_model, max_tokens = max_tokens))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let response: ChatResponse = self.post_json("/v1/chat/completions", &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        info!(chars = content.len(), "completion received");
        Ok(unwrap_code_fence(&content))
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.image_model, count = prompts.len()))]
    async fn generate(&self, prompts: &[String]) -> Result<Vec<String>, ProviderError> {
        let mut urls = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            let request = ImageRequest {
                model: &self.image_model,
                prompt,
                n: 1,
                size: &self.image_size,
            };
            let response: ImageResponse =
                self.post_json("/v1/images/generations", &request).await?;
            let url = response
                .data
                .into_iter()
                .find_map(|datum| datum.url)
                .ok_or_else(|| ProviderError::InvalidResponse("image response had no url".into()))?;
            debug!(%url, "image generated");
            urls.push(url);
        }
        Ok(urls)
    }
}

/// Models often wrap HTML in a Markdown code fence despite being asked not to.
pub fn unwrap_code_fence(content: &str) -> String {
    match CODE_FENCE_REGEX.captures(content) {
        Some(caps) => caps[1].trim().to_string(),
        None => content.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_html_fence() {
        let content = "```html\n<h1>Title</h1>\n<p>Body</p>\n```";
        assert_eq!(unwrap_code_fence(content), "<h1>Title</h1>\n<p>Body</p>");
    }

    #[test]
    fn test_unwrap_bare_fence() {
        assert_eq!(unwrap_code_fence("  ```\n<p>x</p>\n```  "), "<p>x</p>");
    }

    #[test]
    fn test_plain_content_is_trimmed_only() {
        assert_eq!(unwrap_code_fence("\n<p>x ``` y</p>\n"), "<p>x ``` y</p>");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported_before_any_request() {
        let client = OpenAiClient::from_config(&Config::default()).unwrap();
        assert!(!client.has_api_key());
        let err = client.complete("system", "user", 100).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
