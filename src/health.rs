use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// `configured` or `missing-api-key`.
    pub language_model: String,
}

/// Liveness probe. A missing API key is reported but does not make the
/// service unhealthy; generation requests will fail until it is set.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let language_model = if state.language_model_configured {
        info!("Health check passed");
        "configured"
    } else {
        warn!("Health check passed without a language model API key");
        "missing-api-key"
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        language_model: language_model.to_string(),
    })
}
