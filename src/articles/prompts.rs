//! Prompts sent to the language model and the image generator.

use std::fmt::Write;

use crate::articles::dtos::{ArticleType, GenerateArticleRequest};
use crate::product::ProductData;

const MAX_COMPLETION_TOKENS: u32 = 4000;

pub const USER_PROMPT: &str =
    "Write the article now. Make it engaging, informative, and optimized for SEO.";

/// Token budget for the completion: two tokens per requested word, capped.
pub fn max_tokens(word_count: u32) -> u32 {
    word_count.saturating_mul(2).min(MAX_COMPLETION_TOKENS)
}

pub fn system_prompt(request: &GenerateArticleRequest, product: Option<&ProductData>) -> String {
    let mut prompt = format!(
        "You are an expert SEO content writer specialized in creating high-quality blog articles in {language} for the {country} market.\n\n\
         Your task is to write a {words}-word {kind} article with a {tone} tone about: \"{topic}\".\n",
        language = request.target_language,
        country = request.target_country,
        words = request.word_count,
        kind = request.article_type,
        tone = request.tone_of_voice,
        topic = request.topic.trim(),
    );

    if !request.keywords.trim().is_empty() {
        let _ = writeln!(prompt, "\nFocus on these SEO keywords: {}", request.keywords.trim());
    }

    if let Some(product) = product {
        prompt.push_str(&product_section(product));
    }

    let _ = write!(
        prompt,
        "\nRequirements:\n\
         1. Create an engaging, SEO-optimized article\n\
         2. Use proper HTML structure with semantic tags (h1, h2, h3, p, ul, ol, strong, em)\n\
         3. Include a compelling introduction and conclusion\n\
         4. Add relevant subheadings (H2, H3) throughout the article\n\
         5. Write in a natural, engaging style that resonates with the {country} audience\n\
         6. Include factual information and maintain credibility\n\
         7. {review}\n\
         8. Wrap call-to-action phrases where affiliate links can be inserted as [CTA]phrase[/CTA]\n\
         9. Optimize for featured snippets and Discovery platforms\n\
         10. Start with a single h1 title and open with a paragraph that summarizes the article\n\n\
         Format your response as a complete HTML article (just the body content, no <html> or <body> tags, no Markdown code fences).",
        country = request.target_country,
        review = if request.article_type == ArticleType::Review {
            "Include a pros and cons section"
        } else {
            "For comparisons and reviews, include pros/cons sections"
        },
    );
    prompt
}

fn product_section(product: &ProductData) -> String {
    let specs = if product.specs.is_empty() {
        "N/A".to_string()
    } else {
        product
            .specs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "\nProduct Information:\n\
         - Name: {}\n\
         - Description: {}\n\
         - Features: {}\n\
         - Technical Specs: {}\n\
         - Price: {}\n\
         - Rating: {}\n",
        product.name,
        product.description,
        product.features.join(", "),
        specs,
        product.price.as_deref().unwrap_or("N/A"),
        product
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    )
}

/// One prompt per image: a hero shot first, then numbered illustrations.
pub fn image_prompts(topic: &str, count: u32) -> Vec<String> {
    let topic = topic.trim();
    (0..count)
        .map(|i| {
            if i == 0 {
                format!("Professional hero image for blog article about {}", topic)
            } else {
                format!(
                    "Illustration or infographic related to {}, image {}",
                    topic,
                    i + 1
                )
            }
        })
        .collect()
}
