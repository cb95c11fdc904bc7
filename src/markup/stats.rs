use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::markup::visible_text;

/// Average adult reading speed used for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-6](?:\s[^>]*)?>").unwrap());
static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img(?:\s[^>]*)?/?>").unwrap());

/// Derived counters for a piece of markup. Always recomputed, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub word_count: usize,
    pub reading_time_minutes: usize,
    /// Display form of the reading time, e.g. `"3 min"`.
    pub reading_time: String,
    pub heading_count: usize,
    pub image_count: usize,
}

pub fn calculate_stats(html: &str) -> ArticleStats {
    let text = visible_text(html);
    // Empty markup counts as zero words rather than one empty token.
    let word_count = text.split_whitespace().count();
    let reading_time_minutes = word_count.div_ceil(WORDS_PER_MINUTE);

    ArticleStats {
        word_count,
        reading_time_minutes,
        reading_time: format!("{} min", reading_time_minutes),
        heading_count: HEADING_REGEX.find_iter(html).count(),
        image_count: IMAGE_REGEX.find_iter(html).count(),
    }
}
