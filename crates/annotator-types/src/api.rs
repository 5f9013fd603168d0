//! HTTP response bodies

use super::Annotation;
use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "ok";
pub const ALL_DELETED_MESSAGE: &str = "All annotations deleted.";

/// `{"status": "ok"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
        }
    }
}

/// Result of a bulk upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub inserted: usize,
}

impl UploadResponse {
    pub fn ok(inserted: usize) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            inserted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationListResponse {
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

impl DeleteResponse {
    pub fn all_deleted() -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: ALL_DELETED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body shared by every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
