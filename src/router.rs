//! HTTP routes, OpenAPI document and request tracing.

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    articles::{
        dtos::{ArticleType, ErrorResponse, GenerateArticleRequest, GenerateArticleResponse},
        handlers::{__path_generate_article, generate_article},
    },
    health::{__path_health_check, HealthResponse, health_check},
    markup::ArticleStats,
    postprocess::{AffiliateLinkCount, DiscoveryMetadata, MetaTags, SpellingError},
    product::ProductData,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(generate_article, health_check),
    components(schemas(
        GenerateArticleRequest,
        GenerateArticleResponse,
        ArticleType,
        ArticleStats,
        MetaTags,
        SpellingError,
        AffiliateLinkCount,
        DiscoveryMetadata,
        ProductData,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "articles", description = "Article generation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/generate-article", post(generate_article))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
