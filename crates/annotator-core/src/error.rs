//! Error types for the annotation service

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotatorError>;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

