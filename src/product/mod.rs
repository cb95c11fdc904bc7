pub mod parse;
pub mod types;

pub use parse::parse_product;
pub use types::ProductData;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use crate::fetcher::{FetchError, PageFetcher};
use crate::providers::ProductScraper;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("failed to fetch product page: {0}")]
    Fetch(#[from] FetchError),

    #[error("no product information found at {0}")]
    NotAProductPage(String),
}

/// Scrapes product facts from the product page itself.
#[derive(Debug, Clone)]
pub struct PageProductScraper {
    fetcher: PageFetcher,
}

impl PageProductScraper {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ProductScraper for PageProductScraper {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Result<ProductData, ScrapeError> {
        let page = self.fetcher.fetch(url).await?;
        let product = parse_product(&page.body_utf8)
            .ok_or_else(|| ScrapeError::NotAProductPage(page.url_final.to_string()))?;

        info!(
            name = %product.name,
            features = product.features.len(),
            specs = product.specs.len(),
            fetched_at = %page.fetched_at,
            "product scraped"
        );
        Ok(product)
    }
}
