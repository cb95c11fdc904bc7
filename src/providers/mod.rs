//! Seams to the outside world: the language model, the image generator and
//! the product scraper. The article pipeline only sees these traits, so tests
//! can swap in mocks and the HTTP clients are built once per process.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::product::{ProductData, ScrapeError};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider credentials are not configured")]
    MissingApiKey,

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a chat with one system and one user message.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// One image URL per prompt, in prompt order.
    async fn generate(&self, prompts: &[String]) -> Result<Vec<String>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ProductData, ScrapeError>;
}
