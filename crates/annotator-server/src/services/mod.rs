//! Business logic services

pub mod annotation_service;

pub use annotation_service::AnnotationService;
