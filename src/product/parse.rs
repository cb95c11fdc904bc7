//! Product facts from a product page.
//!
//! Structured data wins: a schema.org `Product` in JSON-LD usually carries
//! everything. Missing fields are then filled from OpenGraph, `itemprop`
//! microdata and plain page markup.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::product::types::ProductData;

const MAX_FEATURES: usize = 10;
const MAX_SPECS: usize = 30;

pub fn parse_product(html: &str) -> Option<ProductData> {
    let document = Html::parse_document(html);

    let mut product = json_ld_product(&document)
        .map(|node| product_from_json_ld(&node))
        .unwrap_or_default();

    if product.name.is_empty() {
        product.name = first_of(
            &document,
            &[
                ("meta[property='og:title']", Some("content")),
                ("[itemprop='name']", None),
                ("h1", None),
                ("title", None),
            ],
        )
        .unwrap_or_default();
    }
    if product.description.is_empty() {
        product.description = first_of(
            &document,
            &[
                ("meta[property='og:description']", Some("content")),
                ("meta[name='description']", Some("content")),
                ("[itemprop='description']", None),
            ],
        )
        .unwrap_or_default();
    }
    if product.price.is_none() {
        product.price = first_of(
            &document,
            &[
                ("meta[property='product:price:amount']", Some("content")),
                ("[itemprop='price']", Some("content")),
                ("[itemprop='price']", None),
            ],
        );
    }
    if product.rating.is_none() {
        product.rating = first_of(
            &document,
            &[
                ("[itemprop='ratingValue']", Some("content")),
                ("[itemprop='ratingValue']", None),
            ],
        )
        .and_then(|raw| parse_rating(&raw));
    }
    if product.features.is_empty() {
        product.features = feature_bullets(&document);
    }
    if product.specs.is_empty() {
        product.specs = spec_table(&document);
    }

    if product.name.is_empty() {
        return None;
    }
    Some(product)
}

/// The first schema.org Product node in any JSON-LD block, looking inside
/// arrays and `@graph` containers.
fn json_ld_product(document: &Html) -> Option<Value> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    document
        .select(&selector)
        .filter_map(|script| serde_json::from_str::<Value>(&script.inner_html()).ok())
        .find_map(|value| find_product_node(&value))
}

fn find_product_node(value: &Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product_node),
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value.clone());
            }
            map.get("@graph").and_then(find_product_node)
        }
        _ => None,
    }
}

fn is_product_type(kind: Option<&Value>) -> bool {
    match kind {
        Some(Value::String(s)) => s == "Product",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k == "Product"),
        _ => false,
    }
}

fn product_from_json_ld(node: &Value) -> ProductData {
    let text = |v: Option<&Value>| -> Option<String> {
        let value = match v? {
            Value::String(s) => clean(s),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    };

    // `offers` may be a single Offer, an AggregateOffer or a list of offers.
    let offer = match node.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };
    let price = offer.and_then(|offer| {
        let amount = text(offer.get("price")).or_else(|| text(offer.get("lowPrice")))?;
        Some(match text(offer.get("priceCurrency")) {
            Some(currency) => format!("{} {}", currency, amount),
            None => amount,
        })
    });

    let rating = node
        .get("aggregateRating")
        .and_then(|rating| text(rating.get("ratingValue")))
        .and_then(|raw| parse_rating(&raw));

    let mut specs = BTreeMap::new();
    if let Some(Value::Array(properties)) = node.get("additionalProperty") {
        for property in properties.iter().take(MAX_SPECS) {
            if let (Some(name), Some(value)) =
                (text(property.get("name")), text(property.get("value")))
            {
                specs.insert(name, value);
            }
        }
    }
    if let Some(brand) = node
        .get("brand")
        .and_then(|b| text(b.get("name")).or_else(|| text(Some(b))))
    {
        specs.entry("Brand".to_string()).or_insert(brand);
    }

    ProductData {
        name: text(node.get("name")).unwrap_or_default(),
        description: text(node.get("description")).unwrap_or_default(),
        features: Vec::new(),
        specs,
        price,
        rating,
    }
}

fn first_of(document: &Html, candidates: &[(&str, Option<&str>)]) -> Option<String> {
    candidates.iter().find_map(|(css, attr)| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).find_map(|element| {
            let value = match attr {
                Some(attr) => element.value().attr(attr).map(clean),
                None => Some(element_text(&element)),
            }?;
            (!value.is_empty()).then_some(value)
        })
    })
}

fn feature_bullets(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("[id*='feature'] li, [class*='feature'] li") else {
        return Vec::new();
    };
    let mut features: Vec<String> = Vec::new();
    for item in document.select(&selector) {
        let text = element_text(&item);
        if !text.is_empty() && !features.contains(&text) {
            features.push(text);
        }
        if features.len() == MAX_FEATURES {
            break;
        }
    }
    features
}

fn spec_table(document: &Html) -> BTreeMap<String, String> {
    let (Ok(rows), Ok(cells)) = (Selector::parse("table tr"), Selector::parse("th, td")) else {
        return BTreeMap::new();
    };
    let mut specs = BTreeMap::new();
    for row in document.select(&rows) {
        let values: Vec<String> = row.select(&cells).map(|c| element_text(&c)).collect();
        if let [key, value] = values.as_slice()
            && !key.is_empty()
            && !value.is_empty()
        {
            specs.insert(key.clone(), value.clone());
        }
        if specs.len() == MAX_SPECS {
            break;
        }
    }
    specs
}

fn parse_rating(raw: &str) -> Option<f32> {
    raw.trim()
        .split_whitespace()
        .next()?
        .replace(',', ".")
        .parse()
        .ok()
}

fn element_text(element: &ElementRef) -> String {
    clean(&element.text().collect::<String>())
}

fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
