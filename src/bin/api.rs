use std::sync::Arc;

use anyhow::{Context, Result};
use penman::{
    app_state::AppState,
    articles::ArticlePipeline,
    config::{Config, LogFormat},
    fetcher::PageFetcher,
    product::PageProductScraper,
    providers::OpenAiClient,
    router,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format());

    let openai = Arc::new(OpenAiClient::from_config(&config)?);
    if !openai.has_api_key() {
        warn!("OPENAI_API_KEY is not set; article generation will fail");
    }
    let fetcher = PageFetcher::new(config.connect_timeout(), config.request_timeout())?;
    let scraper = Arc::new(PageProductScraper::new(fetcher));

    let pipeline = ArticlePipeline::new(openai.clone(), openai.clone(), scraper);
    let app = router::app(AppState::new(pipeline, openai.has_api_key()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "article service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
