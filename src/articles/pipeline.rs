use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::articles::dtos::{ArticleType, GenerateArticleRequest, GenerateArticleResponse};
use crate::articles::prompts::{USER_PROMPT, image_prompts, max_tokens, system_prompt};
use crate::markup::{calculate_stats, html_to_markdown, place_images};
use crate::postprocess::{
    active_links, count_links, generate_discovery_metadata, inject_affiliate_links,
    optimize_seo, spell_check,
};
use crate::product::ProductData;
use crate::providers::{ImageGenerator, LanguageModel, ProductScraper, ProviderError};

/// Upper bound on spelling findings returned to the caller.
pub const MAX_SPELLING_ERRORS: usize = 20;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("article generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("the language model returned an empty article")]
    EmptyArticle,
}

/// Turns a generation request into a finished article. Stages run strictly
/// one after another; only product scraping and image generation may fail
/// without failing the request.
#[derive(Clone)]
pub struct ArticlePipeline {
    language_model: Arc<dyn LanguageModel>,
    image_generator: Arc<dyn ImageGenerator>,
    product_scraper: Arc<dyn ProductScraper>,
}

impl ArticlePipeline {
    pub fn new(
        language_model: Arc<dyn LanguageModel>,
        image_generator: Arc<dyn ImageGenerator>,
        product_scraper: Arc<dyn ProductScraper>,
    ) -> Self {
        Self {
            language_model,
            image_generator,
            product_scraper,
        }
    }

    #[instrument(skip_all, fields(topic = %request.topic, article_type = %request.article_type))]
    pub async fn generate(
        &self,
        request: &GenerateArticleRequest,
        now: DateTime<Utc>,
    ) -> Result<GenerateArticleResponse, PipelineError> {
        let product_data = self.scrape_product(request).await;

        let system = system_prompt(request, product_data.as_ref());
        let mut html = self
            .language_model
            .complete(&system, USER_PROMPT, max_tokens(request.word_count))
            .await?;
        if html.trim().is_empty() {
            return Err(PipelineError::EmptyArticle);
        }

        if request.wants_images() {
            html = self.add_images(html, request).await;
        }

        let links = active_links(&request.affiliate_links);
        let html = inject_affiliate_links(&html, &links);

        let seo = optimize_seo(
            &html,
            &request.keywords,
            &request.target_language,
            &request.target_country,
        );
        let mut spelling_errors = spell_check(&html, &request.target_language);
        spelling_errors.truncate(MAX_SPELLING_ERRORS);
        let discovery_metadata =
            generate_discovery_metadata(&html, &request.topic, &request.keywords, now);
        let stats = calculate_stats(&html);
        let markdown = html_to_markdown(&html);
        let affiliate_links = count_links(&html, &links);

        info!(
            words = stats.word_count,
            seo_score = seo.score,
            images = stats.image_count,
            affiliate_platforms = affiliate_links.len(),
            "article generated"
        );

        Ok(GenerateArticleResponse {
            html,
            markdown,
            meta_tags: seo.meta_tags,
            seo_score: seo.score,
            stats,
            spelling_errors,
            affiliate_links,
            discovery_metadata,
            product_data,
            generated_at: now,
        })
    }

    async fn scrape_product(&self, request: &GenerateArticleRequest) -> Option<ProductData> {
        if request.article_type != ArticleType::Review {
            return None;
        }
        let url = request.product_url()?;
        match self.product_scraper.scrape(url).await {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(error = %e, url, "product scraping failed; continuing without product data");
                None
            }
        }
    }

    async fn add_images(&self, html: String, request: &GenerateArticleRequest) -> String {
        let prompts = image_prompts(&request.topic, request.image_count);
        match self.image_generator.generate(&prompts).await {
            Ok(urls) => {
                if urls.len() != prompts.len() {
                    warn!(
                        requested = prompts.len(),
                        received = urls.len(),
                        "image generator returned a different number of images"
                    );
                }
                place_images(&html, &urls)
            }
            Err(e) => {
                warn!(error = %e, "image generation failed; continuing without images");
                html
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ScrapeError;
    use crate::providers::{MockImageGenerator, MockLanguageModel, MockProductScraper};
    use chrono::TimeZone;

    const ARTICLE: &str = "<h1>Guide to Tea</h1><p>Tea is great. [CTA]Buy tea[/CTA]</p><h2>Green</h2><p>Fresh.</p><h2>Black</h2><p>Bold.</p>";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    fn request(json: &str) -> GenerateArticleRequest {
        serde_json::from_str(json).unwrap()
    }

    fn llm_returning(text: &str) -> MockLanguageModel {
        let text = text.to_string();
        let mut llm = MockLanguageModel::new();
        llm.expect_complete()
            .times(1)
            .returning(move |_, _, _| Ok(text.clone()));
        llm
    }

    fn pipeline(
        llm: MockLanguageModel,
        images: MockImageGenerator,
        scraper: MockProductScraper,
    ) -> ArticlePipeline {
        ArticlePipeline::new(Arc::new(llm), Arc::new(images), Arc::new(scraper))
    }

    #[tokio::test]
    async fn test_text_only_article() {
        let mut images = MockImageGenerator::new();
        images.expect_generate().never();
        let mut scraper = MockProductScraper::new();
        scraper.expect_scrape().never();

        let req = request(
            r#"{"topic":"Tea","articleType":"informational","wordCount":500,"includeImages":false,"affiliateLinks":{}}"#,
        );
        let out = pipeline(llm_returning(ARTICLE), images, scraper)
            .generate(&req, now())
            .await
            .unwrap();

        assert!(!out.html.is_empty());
        assert!(out.html.contains("<p>Tea is great. Buy tea</p>"));
        assert_eq!(out.markdown, html_to_markdown(&out.html));
        assert_eq!(out.stats, calculate_stats(&out.html));
        assert!(out.affiliate_links.is_empty());
        assert!(out.product_data.is_none());
        assert_eq!(out.generated_at, now());
        assert_eq!(out.meta_tags.title, "Guide to Tea");
    }

    #[tokio::test]
    async fn test_token_budget_follows_word_count() {
        let mut llm = MockLanguageModel::new();
        llm.expect_complete()
            .withf(|system, user, max_tokens| {
                system.contains("500-word") && user == USER_PROMPT && *max_tokens == 1000
            })
            .times(1)
            .returning(|_, _, _| Ok(ARTICLE.to_string()));

        let req = request(r#"{"topic":"Tea","wordCount":500}"#);
        pipeline(llm, MockImageGenerator::new(), MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_images_are_placed() {
        let mut images = MockImageGenerator::new();
        images
            .expect_generate()
            .withf(|prompts| prompts.len() == 3)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    "https://img.example/0.png".to_string(),
                    "https://img.example/1.png".to_string(),
                    "https://img.example/2.png".to_string(),
                ])
            });

        let req = request(r#"{"topic":"Tea","includeImages":true,"imageCount":3}"#);
        let out = pipeline(llm_returning(ARTICLE), images, MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();

        assert_eq!(out.stats.image_count, 3);
        let hero = out.html.find("0.png").unwrap();
        let green = out.html.find("<h2>Green").unwrap();
        assert!(hero < green);
        assert_eq!(
            out.discovery_metadata.primary_image.as_deref(),
            Some("https://img.example/0.png")
        );
    }

    #[tokio::test]
    async fn test_signed_image_url_survives_into_discovery() {
        const SIGNED: &str = "https://img.example/hero.png?st=2024&se=2025&sig=abc";
        let mut images = MockImageGenerator::new();
        images
            .expect_generate()
            .times(1)
            .returning(|_| Ok(vec![SIGNED.to_string()]));

        let req = request(r#"{"topic":"Tea","includeImages":true,"imageCount":1}"#);
        let out = pipeline(llm_returning(ARTICLE), images, MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();

        assert!(out.html.contains(&format!("src=\"{}\"", SIGNED)));
        assert_eq!(out.discovery_metadata.primary_image.as_deref(), Some(SIGNED));
        assert_eq!(out.discovery_metadata.structured_data["image"][0], SIGNED);
        assert!(out.markdown.contains(&format!("![Image 1]({})", SIGNED)));
    }

    #[tokio::test]
    async fn test_image_failure_is_soft() {
        let mut images = MockImageGenerator::new();
        images
            .expect_generate()
            .times(1)
            .returning(|_| Err(ProviderError::InvalidResponse("boom".to_string())));

        let req = request(r#"{"topic":"Tea","includeImages":true,"imageCount":2}"#);
        let out = pipeline(llm_returning(ARTICLE), images, MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();
        assert_eq!(out.stats.image_count, 0);
    }

    #[tokio::test]
    async fn test_review_scrapes_product() {
        let mut scraper = MockProductScraper::new();
        scraper
            .expect_scrape()
            .withf(|url| url == "https://shop.example/tea")
            .times(1)
            .returning(|_| {
                Ok(ProductData {
                    name: "Tea Kettle".to_string(),
                    ..Default::default()
                })
            });
        let mut llm = MockLanguageModel::new();
        llm.expect_complete()
            .withf(|system, _, _| system.contains("- Name: Tea Kettle"))
            .times(1)
            .returning(|_, _, _| Ok(ARTICLE.to_string()));

        let req = request(
            r#"{"topic":"Tea","articleType":"review","productUrl":"https://shop.example/tea"}"#,
        );
        let out = pipeline(llm, MockImageGenerator::new(), scraper)
            .generate(&req, now())
            .await
            .unwrap();
        assert_eq!(out.product_data.unwrap().name, "Tea Kettle");
    }

    #[tokio::test]
    async fn test_scrape_failure_is_soft() {
        let mut scraper = MockProductScraper::new();
        scraper
            .expect_scrape()
            .times(1)
            .returning(|url| Err(ScrapeError::NotAProductPage(url.to_string())));

        let req = request(r#"{"topic":"Tea","articleType":"review","productUrl":"https://x.example"}"#);
        let out = pipeline(llm_returning(ARTICLE), MockImageGenerator::new(), scraper)
            .generate(&req, now())
            .await
            .unwrap();
        assert!(out.product_data.is_none());
    }

    #[tokio::test]
    async fn test_non_review_ignores_product_url() {
        let mut scraper = MockProductScraper::new();
        scraper.expect_scrape().never();

        let req = request(r#"{"topic":"Tea","articleType":"listicle","productUrl":"https://x.example"}"#);
        pipeline(llm_returning(ARTICLE), MockImageGenerator::new(), scraper)
            .generate(&req, now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_affiliate_counts() {
        let req = request(
            r#"{"topic":"Tea","affiliateLinks":{"amazon":"https://amzn.example/tea","shopee":"","hotmart":"https://hot.example/t"}}"#,
        );
        let out = pipeline(llm_returning(ARTICLE), MockImageGenerator::new(), MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();

        assert_eq!(out.affiliate_links.len(), 2);
        assert_eq!(out.affiliate_links[0].platform, "amazon");
        assert_eq!(out.affiliate_links[0].count, 1);
        assert_eq!(out.affiliate_links[1].platform, "hotmart");
        assert_eq!(out.affiliate_links[1].count, 1);
        assert!(out.markdown.contains("[Buy tea](https://amzn.example/tea)"));
    }

    #[tokio::test]
    async fn test_language_model_failure_is_fatal() {
        let mut llm = MockLanguageModel::new();
        llm.expect_complete()
            .returning(|_, _, _| Err(ProviderError::MissingApiKey));

        let req = request(r#"{"topic":"Tea"}"#);
        let err = pipeline(llm, MockImageGenerator::new(), MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(ProviderError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_empty_completion_is_fatal() {
        let req = request(r#"{"topic":"Tea"}"#);
        let err = pipeline(llm_returning("  \n"), MockImageGenerator::new(), MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyArticle));
    }

    #[tokio::test]
    async fn test_spelling_errors_are_capped() {
        let doubled: Vec<String> = (0..30).map(|i| format!("w{i} w{i}")).collect();
        let text = format!("<p>{}</p>", doubled.join(" "));
        let req = request(r#"{"topic":"Tea","targetLanguage":"en-US"}"#);
        let out = pipeline(llm_returning(&text), MockImageGenerator::new(), MockProductScraper::new())
            .generate(&req, now())
            .await
            .unwrap();
        assert_eq!(out.spelling_errors.len(), MAX_SPELLING_ERRORS);
    }
}
