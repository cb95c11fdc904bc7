use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use penman::{
    app_state::AppState, articles::ArticlePipeline, config::Config, fetcher::PageFetcher,
    product::PageProductScraper, providers::OpenAiClient, router,
};

pub const SAMPLE_ARTICLE: &str = "<h1>Brewing Better Tea</h1>\n\
<p>Tea rewards patience. This guide covers the basics. [CTA]See our favourite kettle[/CTA]</p>\n\
<h2>Choosing leaves</h2>\n<p>Loose leaves beat <strong>bags</strong>.</p>\n\
<h2>Water</h2>\n<ul><li>Filtered</li><li>Not boiling</li></ul>\n\
<h2>Timing</h2>\n<p>Steep for <em>three</em> minutes.</p>";

/// App wired to real provider clients that talk to `openai` (a mock server).
pub fn test_app(openai: &MockServer) -> Router {
    build_app(
        Config::default()
            .with_openai_base_url(openai.uri())
            .with_openai_api_key("test-key"),
    )
}

pub fn test_app_without_api_key(openai: &MockServer) -> Router {
    build_app(Config::default().with_openai_base_url(openai.uri()))
}

fn build_app(config: Config) -> Router {
    let openai = Arc::new(OpenAiClient::from_config(&config).unwrap());
    let fetcher = PageFetcher::new(Duration::from_secs(5), Duration::from_secs(10)).unwrap();
    let scraper = Arc::new(PageProductScraper::new(fetcher));
    let pipeline = ArticlePipeline::new(openai.clone(), openai.clone(), scraper);
    router::app(AppState::new(pipeline, openai.has_api_key()))
}

pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .mount(server)
        .await;
}

pub async fn post_json(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
