use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, warn};

use crate::{
    app_state::AppState,
    articles::{
        PipelineError,
        dtos::{ErrorResponse, GenerateArticleRequest, GenerateArticleResponse},
    },
};

/// Any failure of the generation endpoint. Clients only distinguish success
/// from failure, so every variant renders as a 500 with `{error}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidBody(JsonRejection),
    Validation(String),
    Pipeline(PipelineError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::InvalidBody(rejection) => {
                warn!(error = %rejection.body_text(), "rejected article request body");
                rejection.body_text()
            }
            ApiError::Validation(message) => {
                warn!(error = %message, "invalid article request");
                message
            }
            ApiError::Pipeline(err) => {
                error!(error = %err, "article generation failed");
                err.to_string()
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error }),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/api/generate-article",
    tag = "articles",
    request_body = GenerateArticleRequest,
    responses(
        (status = 200, description = "Article generated", body = GenerateArticleResponse),
        (status = 500, description = "Invalid request or generation failure", body = ErrorResponse)
    )
)]
pub async fn generate_article(
    State(state): State<AppState>,
    payload: Result<Json<GenerateArticleRequest>, JsonRejection>,
) -> Result<Json<GenerateArticleResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    let article = state.pipeline.generate(&request, Utc::now()).await?;
    Ok(Json(article))
}
