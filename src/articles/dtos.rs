use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use crate::markup::ArticleStats;
use crate::postprocess::{AffiliateLinkCount, DiscoveryMetadata, MetaTags, SpellingError};
use crate::product::ProductData;

const MAX_TOPIC_CHARS: usize = 300;
const MAX_KEYWORDS_CHARS: usize = 1000;
const MIN_WORD_COUNT: u32 = 100;
const MAX_WORD_COUNT: u32 = 10_000;
const MAX_IMAGE_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleType {
    #[default]
    Informational,
    Review,
    Comparison,
    Listicle,
    HowTo,
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArticleType::Informational => "informational",
            ArticleType::Review => "review",
            ArticleType::Comparison => "comparison",
            ArticleType::Listicle => "listicle",
            ArticleType::HowTo => "how-to",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleRequest {
    pub topic: String,
    /// Comma-separated SEO keywords.
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub article_type: ArticleType,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default = "default_country")]
    pub target_country: String,
    #[serde(default = "default_language")]
    pub target_language: String,
    #[serde(default = "default_word_count")]
    pub word_count: u32,
    #[serde(default = "default_tone")]
    pub tone_of_voice: String,
    #[serde(default)]
    pub include_images: bool,
    #[serde(default)]
    pub image_count: u32,
    /// Platform key to affiliate URL; blank URLs are ignored.
    #[serde(default)]
    pub affiliate_links: BTreeMap<String, String>,
}

fn default_country() -> String {
    "BR".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_word_count() -> u32 {
    1500
}

fn default_tone() -> String {
    "professional".to_string()
}

impl GenerateArticleRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("Topic cannot be empty".to_string());
        }
        if self.topic.chars().count() > MAX_TOPIC_CHARS {
            return Err("Topic too long".to_string());
        }
        if self.keywords.chars().count() > MAX_KEYWORDS_CHARS {
            return Err("Keywords too long".to_string());
        }
        if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&self.word_count) {
            return Err(format!(
                "Word count must be between {} and {}",
                MIN_WORD_COUNT, MAX_WORD_COUNT
            ));
        }
        if self.image_count > MAX_IMAGE_COUNT {
            return Err(format!("Image count cannot exceed {}", MAX_IMAGE_COUNT));
        }
        Ok(())
    }

    /// Product URL when one was actually provided.
    pub fn product_url(&self) -> Option<&str> {
        self.product_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn wants_images(&self) -> bool {
        self.include_images && self.image_count > 0
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleResponse {
    pub html: String,
    pub markdown: String,
    pub meta_tags: MetaTags,
    pub seo_score: u8,
    pub stats: ArticleStats,
    pub spelling_errors: Vec<SpellingError>,
    pub affiliate_links: Vec<AffiliateLinkCount>,
    pub discovery_metadata: DiscoveryMetadata,
    pub product_data: Option<ProductData>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
