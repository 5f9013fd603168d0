//! HTTP handlers

pub mod annotations;
pub mod health;

pub use health::health;
