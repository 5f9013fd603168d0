//! Health check handler

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use annotator_core::{HealthResponse, STATUS_OK};
use axum::{extract::State, Json};

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .annotations
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: STATUS_OK.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
