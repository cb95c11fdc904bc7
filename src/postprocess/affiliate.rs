//! Affiliate link injection.
//!
//! The language model marks call-to-action phrases as `[CTA]text[/CTA]`.
//! Markers are turned into affiliate anchors, cycling over the active
//! platforms. Platforms that received no anchor get a closing CTA paragraph so
//! every configured link shows up at least once.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

static CTA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[CTA\](.*?)\[/CTA\]").unwrap());

const ANCHOR_REL: &str = "nofollow sponsored noopener";

/// An affiliate platform with a non-empty link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliateLink {
    pub platform: String,
    pub url: String,
}

/// How many times a platform's link ended up in the final article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AffiliateLinkCount {
    pub platform: String,
    pub count: usize,
}

/// Active links from the request map: blank URLs are skipped. Platforms come
/// out in key order.
pub fn active_links(links: &BTreeMap<String, String>) -> Vec<AffiliateLink> {
    links
        .iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(platform, url)| AffiliateLink {
            platform: platform.clone(),
            url: url.trim().to_string(),
        })
        .collect()
}

pub fn inject_affiliate_links(html: &str, links: &[AffiliateLink]) -> String {
    if links.is_empty() {
        return CTA_REGEX.replace_all(html, "${1}").into_owned();
    }

    let mut next = 0usize;
    let mut out = CTA_REGEX
        .replace_all(html, |caps: &Captures| {
            let link = &links[next % links.len()];
            next += 1;
            anchor(link, caps[1].trim())
        })
        .into_owned();

    for link in links {
        if count_occurrences(&out, &href_value(&link.url)) == 0 {
            let text = format!("Check it out on {}", display_name(&link.platform));
            out.push_str(&format!(
                "\n<p class=\"affiliate-cta\">{}</p>",
                anchor(link, &text)
            ));
        }
    }
    out
}

/// Non-overlapping literal occurrences of `url` in `html`.
pub fn count_occurrences(html: &str, url: &str) -> usize {
    if url.is_empty() {
        return 0;
    }
    html.matches(url).count()
}

pub fn count_links(html: &str, links: &[AffiliateLink]) -> Vec<AffiliateLinkCount> {
    links
        .iter()
        .map(|link| AffiliateLinkCount {
            platform: link.platform.clone(),
            count: count_occurrences(html, &href_value(&link.url)),
        })
        .collect()
}

/// Brand name shown to readers for a platform key.
pub fn display_name(platform: &str) -> String {
    let known = match platform {
        "amazon" => Some("Amazon"),
        "mercadoLivre" => Some("Mercado Livre"),
        "shopee" => Some("Shopee"),
        "magalu" => Some("Magalu"),
        "clickbank" => Some("ClickBank"),
        "hotmart" => Some("Hotmart"),
        "eduzz" => Some("Eduzz"),
        "kiwify" => Some("Kiwify"),
        "braip" => Some("Braip"),
        _ => None,
    };
    if let Some(name) = known {
        return name.to_string();
    }

    let mut chars = platform.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The URL as written into `href`; counting looks for this same form.
fn href_value(url: &str) -> String {
    url.replace('"', "&quot;")
}

fn anchor(link: &AffiliateLink, text: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"{}\" class=\"affiliate-link\" data-platform=\"{}\">{}</a>",
        href_value(&link.url),
        ANCHOR_REL,
        link.platform.replace('"', "&quot;"),
        text
    )
}
