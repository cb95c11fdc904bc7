//! Pattern-based rewrites over article markup.
//!
//! Article markup is the HTML subset the language model produces (headings,
//! paragraphs, emphasis, anchors, images, lists). It is never parsed into a
//! tree: every stage is a string-to-string rewrite, so malformed markup
//! degrades into passthrough text instead of failing.

pub mod images;
pub mod markdown;
pub mod stats;

pub use images::{figure_block, place_images};
pub use markdown::html_to_markdown;
pub use stats::{ArticleStats, calculate_stats};

use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static FIRST_PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p\s*>").unwrap());
static H1_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1(?:\s[^>]*)?>(.*?)</h1\s*>").unwrap());
static H2_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2(?:\s[^>]*)?>(.*?)</h2\s*>").unwrap());
static IMG_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\s[^>]*?\bsrc\s*=\s*"([^"]*)""#).unwrap());

/// Visible text of a markup fragment: every tag becomes a space, whitespace
/// runs collapse to one space, and the result is trimmed.
pub fn visible_text(html: &str) -> String {
    let spaced = TAG_REGEX.replace_all(html, " ");
    WHITESPACE_REGEX
        .replace_all(&spaced, " ")
        .trim()
        .to_string()
}

fn first_capture_text(regex: &Regex, html: &str) -> Option<String> {
    regex
        .captures(html)
        .map(|caps| visible_text(&caps[1]))
        .filter(|text| !text.is_empty())
}

/// Visible text of the first `<h1>`, if any.
pub fn first_h1_text(html: &str) -> Option<String> {
    first_capture_text(&H1_REGEX, html)
}

pub fn first_h2_text(html: &str) -> Option<String> {
    first_capture_text(&H2_REGEX, html)
}

/// Visible text of the first paragraph, if any.
pub fn first_paragraph_text(html: &str) -> Option<String> {
    first_capture_text(&FIRST_PARAGRAPH_REGEX, html)
}

/// `src` of the first `<img>` tag, if any, with attribute entities decoded.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC_REGEX
        .captures(html)
        .map(|caps| caps[1].replace("&quot;", "\"").replace("&amp;", "&"))
        .filter(|src| !src.is_empty())
}

/// Cut `text` at a word boundary so it holds at most `max_chars` characters.
/// Returns the text unchanged when it already fits.
pub fn truncate_words(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }

    let mut out = String::new();
    for word in text.split_whitespace() {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    // A single word longer than the limit still needs cutting.
    if out.is_empty() {
        out = text.chars().take(max_chars).collect();
    }
    (out, true)
}
