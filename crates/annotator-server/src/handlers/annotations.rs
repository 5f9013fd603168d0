//! Annotation handlers

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use annotator_core::{
    parse_save_request, parse_upload_request, AnnotationListResponse, DeleteResponse,
    StatusResponse, UploadResponse,
};
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

/// Parse the raw body regardless of `Content-Type`.
fn json_body(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

pub async fn save(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StatusResponse>> {
    let annotation = parse_save_request(json_body(&body)?)?;

    state.annotations.save(&annotation).await?;

    Ok(Json(StatusResponse::ok()))
}

pub async fn upload(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<UploadResponse>> {
    let annotations = parse_upload_request(json_body(&body)?)?;

    let inserted = state.annotations.bulk_upload(&annotations).await?;

    Ok(Json(UploadResponse::ok(inserted)))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<AnnotationListResponse>> {
    let annotations = state.annotations.list().await?;

    Ok(Json(AnnotationListResponse { annotations }))
}

pub async fn delete_all(State(state): State<AppState>) -> ApiResult<Json<DeleteResponse>> {
    state.annotations.delete_all().await?;

    Ok(Json(DeleteResponse::all_deleted()))
}
