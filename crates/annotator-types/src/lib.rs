//! Annotator Types - Pure type definitions
//!
//! The annotation record, HTTP request/response bodies and payload
//! validation. No async runtime or database dependencies.

pub mod annotation;
pub mod api;
pub mod payload;

pub use annotation::*;
pub use api::*;
pub use payload::{parse_save_request, parse_upload_request, PayloadError};
