//! Request payload validation
//!
//! Bodies arrive as untyped JSON so that a missing top-level key and a
//! wrong-typed field can be reported as different errors.

use crate::Annotation;
use serde_json::Value;
use thiserror::Error;

/// Rejections for malformed request bodies. The `Display` text is what the
/// client sees in `detail`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing annotation data")]
    MissingAnnotation,

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Uploaded JSON must be a list of objects.")]
    NotAList,

    #[error("Invalid annotation at index {index}: {reason}")]
    InvalidItem { index: usize, reason: String },
}

/// Extract the record from a `{"annotation": {...}}` body.
///
/// `annotation` must be present and truthy; a present but malformed record is
/// `InvalidAnnotation`, never `MissingAnnotation`.
pub fn parse_save_request(body: Value) -> Result<Annotation, PayloadError> {
    let Value::Object(mut body) = body else {
        return Err(PayloadError::NotAnObject);
    };

    let annotation = body
        .remove("annotation")
        .filter(is_truthy)
        .ok_or(PayloadError::MissingAnnotation)?;

    parse_record(annotation).map_err(PayloadError::InvalidAnnotation)
}

/// Extract the records from a `{"data": [...]}` body.
///
/// Every item is checked before any is returned, so a bad item anywhere in the
/// list rejects the whole upload.
pub fn parse_upload_request(body: Value) -> Result<Vec<Annotation>, PayloadError> {
    let Value::Object(mut body) = body else {
        return Err(PayloadError::NotAnObject);
    };

    let Some(Value::Array(items)) = body.remove("data") else {
        return Err(PayloadError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            parse_record(item).map_err(|reason| PayloadError::InvalidItem { index, reason })
        })
        .collect()
}

fn parse_record(value: Value) -> Result<Annotation, String> {
    if !value.is_object() {
        return Err(format!("expected an object, found {}", kind(&value)));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
