use chrono::Utc;
use std::time::Duration;

use penman::fetcher::{FetchError, PageFetcher};
use penman::product::{PageProductScraper, ScrapeError};
use penman::providers::ProductScraper;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn fetcher() -> PageFetcher {
    PageFetcher::new(Duration::from_secs(5), Duration::from_secs(10)).unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    "<html><head><title>Test</title></head><body>Hello World</body></html>"
                        .as_bytes(),
                )
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/test", mock_server.uri());
    let before = Utc::now();
    let result = fetcher().fetch(&url).await.unwrap();

    assert!(result.status.is_success());
    assert!(result.body_utf8.contains("Hello World"));
    assert_eq!(result.url_final.as_str(), url);
    assert_eq!(result.encoding, "UTF-8");
    assert!(result.fetched_at >= before && result.fetched_at <= Utc::now());
}

#[tokio::test]
async fn test_fetch_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/notfound", mock_server.uri());
    match fetcher().fetch(&url).await {
        Err(FetchError::Http(status)) => assert_eq!(status.as_u16(), 404),
        other => panic!("Expected HTTP 404 error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/redirect"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/final"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<html><body>Final page</body></html>".as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/redirect", mock_server.uri());
    let result = fetcher().fetch(&url).await.unwrap();

    assert!(result.body_utf8.contains("Final page"));
    assert!(result.url_final.as_str().ends_with("/final"));
}

#[tokio::test]
async fn test_fetch_decodes_declared_charset() {
    let mock_server = MockServer::start().await;

    // "Café" in windows-1252
    let body: Vec<u8> = b"<html><body><p>Caf\xe9</p></body></html>".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("Content-Type", "text/html; charset=windows-1252"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/latin", mock_server.uri());
    let result = fetcher().fetch(&url).await.unwrap();

    assert!(result.body_utf8.contains("Café"));
    assert_eq!(result.encoding, "windows-1252");
}

#[tokio::test]
async fn test_fetch_unsupported_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF]) // JPEG header
                .insert_header("Content-Type", "image/jpeg"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/image", mock_server.uri());
    match fetcher().fetch(&url).await {
        Err(FetchError::UnsupportedContentType(content_type)) => {
            assert_eq!(content_type, "image/jpeg");
        }
        other => panic!("Expected UnsupportedContentType error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_body_too_large() {
    let mock_server = MockServer::start().await;

    // 6MB is over the 5MB cap
    let large_body = "x".repeat(6 * 1024 * 1024);

    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(large_body.as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/large", mock_server.uri());
    match fetcher().fetch(&url).await {
        Err(FetchError::BodyTooLarge(size)) => assert_eq!(size, 6 * 1024 * 1024),
        other => panic!("Expected BodyTooLarge error, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    assert!(matches!(
        fetcher().fetch("not-a-valid-url").await,
        Err(FetchError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn test_fetch_rejects_non_http_scheme() {
    assert!(matches!(
        fetcher().fetch("ftp://example.com/product").await,
        Err(FetchError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}

#[tokio::test]
async fn test_scrape_product_page() {
    let mock_server = MockServer::start().await;

    let page = r#"<html><head>
        <title>Shop</title>
        <script type="application/ld+json">
        {"@context":"https://schema.org","@type":"Product","name":"Aero Kettle",
         "description":"A fast electric kettle.",
         "offers":{"@type":"Offer","price":"39.90","priceCurrency":"USD"},
         "aggregateRating":{"@type":"AggregateRating","ratingValue":"4.6"}}
        </script></head>
        <body><ul class="features"><li>1.7 litres</li><li>Auto shut-off</li></ul></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/kettle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let scraper = PageProductScraper::new(fetcher());
    let product = scraper
        .scrape(&format!("{}/kettle", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(product.name, "Aero Kettle");
    assert_eq!(product.description, "A fast electric kettle.");
    assert_eq!(product.rating, Some(4.6));
    assert_eq!(product.price.as_deref(), Some("USD 39.90"));
}

#[tokio::test]
async fn test_scrape_page_without_product() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div>nothing</div></body></html>")
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let scraper = PageProductScraper::new(fetcher());
    let result = scraper.scrape(&format!("{}/blank", mock_server.uri())).await;
    assert!(matches!(result, Err(ScrapeError::NotAProductPage(_))));
}

#[tokio::test]
async fn test_scrape_propagates_fetch_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let scraper = PageProductScraper::new(fetcher());
    let result = scraper.scrape(&format!("{}/gone", mock_server.uri())).await;
    assert!(matches!(result, Err(ScrapeError::Fetch(FetchError::Http(_)))));
}
