//! HTML to Markdown conversion for article markup.
//!
//! The converter only understands the tag set the generator emits: h1-h4,
//! strong/b, em/i, a, img, ul/ol/li and p. It runs a fixed sequence of
//! substitution passes; each pass rewrites one tag class and later passes rely
//! on earlier ones having run (the catch-all tag stripper must be last).
//!
//! Tag patterns match the exact tag name, are case-insensitive, accept
//! attributes and let element content span lines. Content is matched lazily up
//! to the first closing tag of the same name, so nesting the *same* tag inside
//! itself is not supported. Anything a pass does not match is left for the
//! final stripper, which removes leftover tags and keeps their text.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static HEADING_REGEXES: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (element_regex("h1"), "#"),
        (element_regex("h2"), "##"),
        (element_regex("h3"), "###"),
        (element_regex("h4"), "####"),
    ]
});
static STRONG_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("strong"));
static B_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("b"));
static EM_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("em"));
static I_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("i"));
static ANCHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#).unwrap()
});
static IMG_SRC_ALT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s[^>]*?\bsrc\s*=\s*"([^"]*)"[^>]*?\balt\s*=\s*"([^"]*)"[^>]*>"#)
        .unwrap()
});
static IMG_ALT_SRC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s[^>]*?\balt\s*=\s*"([^"]*)"[^>]*?\bsrc\s*=\s*"([^"]*)"[^>]*>"#)
        .unwrap()
});
static IMG_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\s[^>]*?\bsrc\s*=\s*"([^"]*)"[^>]*>"#).unwrap());
static LIST_CONTAINER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:ul|ol)(?:\s[^>]*)?>").unwrap());
static LIST_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("li"));
static PARAGRAPH_REGEX: LazyLock<Regex> = LazyLock::new(|| element_regex("p"));
static ANY_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static EXCESS_NEWLINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// `<tag attrs>content</tag>` with the content in group 1.
fn element_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>")).unwrap()
}

/// Convert article markup to Markdown. Never fails: unsupported or malformed
/// markup is stripped to its text.
pub fn html_to_markdown(html: &str) -> String {
    let markdown = convert_headings(html);
    let markdown = convert_emphasis(&markdown);
    let markdown = convert_links(&markdown);
    let markdown = convert_images(&markdown);
    let markdown = convert_lists(&markdown);
    let markdown = convert_paragraphs(&markdown);
    let markdown = strip_remaining_tags(&markdown);
    normalize_whitespace(&markdown)
}

pub(crate) fn convert_headings(html: &str) -> String {
    HEADING_REGEXES
        .iter()
        .fold(html.to_string(), |acc, (regex, hashes)| {
            regex
                .replace_all(&acc, |caps: &Captures| format!("{} {}\n\n", hashes, &caps[1]))
                .into_owned()
        })
}

pub(crate) fn convert_emphasis(html: &str) -> String {
    let out = STRONG_REGEX.replace_all(html, "**${1}**");
    let out = B_REGEX.replace_all(&out, "**${1}**");
    let out = EM_REGEX.replace_all(&out, "*${1}*");
    I_REGEX.replace_all(&out, "*${1}*").into_owned()
}

pub(crate) fn convert_links(html: &str) -> String {
    ANCHOR_REGEX.replace_all(html, "[${2}](${1})").into_owned()
}

/// `src` and `alt` may appear in either order; an image without `alt` gets
/// empty alt text. Images without `src` are left for the tag stripper.
pub(crate) fn convert_images(html: &str) -> String {
    let out = IMG_SRC_ALT_REGEX.replace_all(html, "![${2}](${1})");
    let out = IMG_ALT_SRC_REGEX.replace_all(&out, "![${1}](${2})");
    IMG_SRC_REGEX.replace_all(&out, "![](${1})").into_owned()
}

pub(crate) fn convert_lists(html: &str) -> String {
    let out = LIST_CONTAINER_REGEX.replace_all(html, "\n");
    LIST_ITEM_REGEX.replace_all(&out, "- ${1}\n").into_owned()
}

pub(crate) fn convert_paragraphs(html: &str) -> String {
    PARAGRAPH_REGEX.replace_all(html, "${1}\n\n").into_owned()
}

pub(crate) fn strip_remaining_tags(html: &str) -> String {
    ANY_TAG_REGEX.replace_all(html, "").into_owned()
}

pub(crate) fn normalize_whitespace(markdown: &str) -> String {
    EXCESS_NEWLINES_REGEX
        .replace_all(markdown, "\n\n")
        .trim()
        .to_string()
}
