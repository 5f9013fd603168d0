//! Annotator Core Library
//!
//! Domain errors and the storage port for the annotation service.

// Re-export pure types from annotator-types
pub use annotator_types::*;

pub mod error;
pub mod ports;

pub use error::{AnnotatorError, Result};
pub use ports::AnnotationStore;
