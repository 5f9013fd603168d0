//! Annotation record

use serde::{Deserialize, Serialize};

/// A reviewed query/response pair.
///
/// `id` is `None` only on the way in: a record without an id is inserted as a
/// new row and the store assigns one. Every other field is free-form and
/// nullable; `null` and an absent key mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub pass: Option<bool>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl Annotation {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            response: Some(response.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_pass(mut self, pass: bool) -> Self {
        self.pass = Some(pass);
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }
}
