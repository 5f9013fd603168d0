//! Storage layer
//!
//! A single SQLite file behind a sqlx connection pool.

pub mod db;

pub use db::Database;
