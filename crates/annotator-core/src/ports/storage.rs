//! Storage traits for persistence

use crate::Result;
use annotator_types::Annotation;
use async_trait::async_trait;

/// Annotation store
///
/// Implementations own all persistence. Each call is atomic on its own; no
/// transaction spans two calls.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Insert or fully replace by id. A record without an id is inserted as a
    /// new row. Returns the row id.
    async fn upsert(&self, annotation: &Annotation) -> Result<i64>;

    /// Upsert every record in order inside one transaction: either all are
    /// committed or none are.
    async fn upsert_batch(&self, annotations: &[Annotation]) -> Result<usize>;

    async fn list(&self) -> Result<Vec<Annotation>>;

    /// Remove every row. Returns how many were removed.
    async fn delete_all(&self) -> Result<u64>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<()>;
}
