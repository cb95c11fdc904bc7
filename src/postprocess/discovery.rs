//! Metadata for feed-style discovery surfaces (Google Discover and friends):
//! a short headline, a summary, the lead image and schema.org JSON-LD.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::markup::{first_h1_text, first_image_src, first_paragraph_text, truncate_words};
use crate::postprocess::seo::normalize_keywords;

const HEADLINE_MAX_CHARS: usize = 110;
const SUMMARY_MAX_CHARS: usize = 200;
const ROBOTS_DIRECTIVE: &str = "max-image-preview:large";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMetadata {
    pub headline: String,
    pub summary: String,
    pub primary_image: Option<String>,
    pub topics: Vec<String>,
    pub robots: String,
    #[schema(value_type = Object)]
    pub structured_data: Value,
}

pub fn generate_discovery_metadata(
    html: &str,
    topic: &str,
    keywords: &str,
    published_at: DateTime<Utc>,
) -> DiscoveryMetadata {
    let headline_source = first_h1_text(html).unwrap_or_else(|| topic.trim().to_string());
    let (headline, _) = truncate_words(&headline_source, HEADLINE_MAX_CHARS);
    let (summary, _) = truncate_words(
        &first_paragraph_text(html).unwrap_or_default(),
        SUMMARY_MAX_CHARS,
    );
    let primary_image = first_image_src(html);
    let topics = normalize_keywords(keywords);

    let mut structured_data = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": headline,
        "description": summary,
        "keywords": topics.join(", "),
        "datePublished": published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    if let Some(image) = &primary_image {
        structured_data["image"] = json!([image]);
    }

    DiscoveryMetadata {
        headline,
        summary,
        primary_image,
        topics,
        robots: ROBOTS_DIRECTIVE.to_string(),
        structured_data,
    }
}
