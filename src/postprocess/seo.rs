//! SEO scoring and meta tag derivation.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::markup::{
    first_h1_text, first_h2_text, first_paragraph_text, truncate_words, visible_text,
};
use crate::postprocess::language::matches_locale;

const TITLE_MAX_CHARS: usize = 60;
const TITLE_MIN_CHARS: usize = 30;
const DESCRIPTION_MAX_CHARS: usize = 160;
const DESCRIPTION_MIN_CHARS: usize = 120;
const MIN_WORDS: usize = 300;
const MIN_SECTIONS: usize = 2;
const DENSITY_MIN: f64 = 0.005;
const DENSITY_MAX: f64 = 0.025;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoReport {
    pub meta_tags: MetaTags,
    /// 0..=100
    pub score: u8,
}

/// Comma-separated keywords, trimmed, lowercased and de-duplicated in order.
pub fn normalize_keywords(keywords: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords.split(',') {
        let keyword = keyword.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

pub fn optimize_seo(html: &str, keywords: &str, language: &str, country: &str) -> SeoReport {
    let keywords = normalize_keywords(keywords);
    let primary = keywords.first().map(String::as_str);

    let h1 = first_h1_text(html);
    let title_source = h1
        .clone()
        .or_else(|| first_h2_text(html))
        .or_else(|| primary.map(str::to_string))
        .unwrap_or_default();
    let (title, _) = truncate_words(&title_source, TITLE_MAX_CHARS);

    let first_paragraph = first_paragraph_text(html).unwrap_or_default();
    let (mut description, cut) = truncate_words(&first_paragraph, DESCRIPTION_MAX_CHARS - 3);
    if cut {
        description.push_str("...");
    }

    let text = visible_text(html);
    let mut score = 0u8;

    if h1.is_some() {
        score += 10;
    }
    if (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title.chars().count()) {
        score += 10;
    }
    if (DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&description.chars().count()) {
        score += 10;
    }
    if let Some(primary) = primary {
        if title.to_lowercase().contains(primary) {
            score += 15;
        }
        if first_paragraph.to_lowercase().contains(primary) {
            score += 10;
        }
        let density = keyword_density(&text, primary);
        if (DENSITY_MIN..=DENSITY_MAX).contains(&density) {
            score += 15;
        }
    }
    if count_h2(html) >= MIN_SECTIONS {
        score += 10;
    }
    if text.split_whitespace().count() >= MIN_WORDS {
        score += 10;
    }
    if all_images_have_alt(html) {
        score += 5;
    }
    if matches_locale(&text, language) == Some(true) {
        score += 5;
    }

    debug!(score, language, country, "seo analysis complete");

    SeoReport {
        meta_tags: MetaTags {
            title,
            description,
            keywords: keywords.join(", "),
        },
        score,
    }
}

/// Share of the text's words taken up by occurrences of `keyword`. A
/// multi-word keyword counts all of its words per occurrence.
pub fn keyword_density(text: &str, keyword: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .collect();
    let needle: Vec<&str> = keyword.split_whitespace().collect();
    if words.is_empty() || needle.is_empty() {
        return 0.0;
    }

    let hits = words
        .windows(needle.len())
        .filter(|window| window.iter().zip(&needle).all(|(w, n)| w == n))
        .count();
    (hits * needle.len()) as f64 / words.len() as f64
}

fn count_h2(html: &str) -> usize {
    html.to_lowercase().matches("<h2").count()
}

fn all_images_have_alt(html: &str) -> bool {
    let lower = html.to_lowercase();
    lower.split("<img").skip(1).all(|rest| {
        let tag = rest.split('>').next().unwrap_or_default();
        match tag.find("alt=\"") {
            Some(pos) => !tag[pos + 5..].starts_with('"'),
            None => false,
        }
    })
}
