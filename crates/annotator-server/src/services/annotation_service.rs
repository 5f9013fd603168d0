//! Annotation service

use crate::config::BulkUploadMode;
use annotator_core::{Annotation, AnnotationStore, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AnnotationService {
    store: Arc<dyn AnnotationStore>,
    bulk_mode: BulkUploadMode,
}

impl AnnotationService {
    pub fn new(store: Arc<dyn AnnotationStore>, bulk_mode: BulkUploadMode) -> Self {
        Self { store, bulk_mode }
    }

    pub fn bulk_mode(&self) -> BulkUploadMode {
        self.bulk_mode
    }

    /// Upsert one annotation, returning its id.
    pub async fn save(&self, annotation: &Annotation) -> Result<i64> {
        let id = self.store.upsert(annotation).await?;
        match annotation.id {
            Some(_) => debug!("Upserted annotation {}", id),
            None => debug!("Inserted annotation {}", id),
        }
        Ok(id)
    }

    /// Upsert every annotation in list order. Returns how many were written.
    pub async fn bulk_upload(&self, annotations: &[Annotation]) -> Result<usize> {
        info!(
            "Bulk upload of {} annotations ({:?})",
            annotations.len(),
            self.bulk_mode
        );

        match self.bulk_mode {
            BulkUploadMode::Atomic => self.store.upsert_batch(annotations).await,
            BulkUploadMode::BestEffort => {
                let mut inserted = 0;
                for annotation in annotations {
                    if let Err(e) = self.store.upsert(annotation).await {
                        warn!(
                            "Bulk upload stopped after {} of {} annotations: {}",
                            inserted,
                            annotations.len(),
                            e
                        );
                        return Err(e);
                    }
                    inserted += 1;
                }
                Ok(inserted)
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Annotation>> {
        self.store.list().await
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let removed = self.store.delete_all().await?;
        info!("Deleted all annotations ({} rows)", removed);
        Ok(removed)
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
