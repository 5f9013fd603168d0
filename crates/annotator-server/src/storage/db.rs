//! SQLite database layer (embedded, no external dependencies)

use crate::config::DatabaseConfig;
use annotator_core::{Annotation, AnnotationStore, AnnotatorError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Executor, Sqlite, SqlitePool};

const UPSERT_BY_ID: &str = r#"
    INSERT INTO annotations (id, query, response, pass, feedback, error_code)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        query = excluded.query,
        response = excluded.response,
        pass = excluded.pass,
        feedback = excluded.feedback,
        error_code = excluded.error_code
"#;

const INSERT_NEW: &str = r#"
    INSERT INTO annotations (query, response, pass, feedback, error_code)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", config.path.display());

        // Create parent directory if needed
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tracing::debug!("Creating parent directory: {}", parent.display());
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        Self::ensure_schema(&pool).await?;

        tracing::info!("Database initialization complete");

        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS annotations (
                id INTEGER PRIMARY KEY,
                query TEXT,
                response TEXT,
                pass BOOLEAN,
                feedback TEXT,
                error_code TEXT
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    /// Wait for checked-out connections to be returned, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl AnnotationStore for Database {
    async fn upsert(&self, annotation: &Annotation) -> Result<i64> {
        upsert_with(&self.pool, annotation).await.map_err(db_error)
    }

    async fn upsert_batch(&self, annotations: &[Annotation]) -> Result<usize> {
        // Dropping an uncommitted transaction rolls it back.
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for annotation in annotations {
            upsert_with(&mut *tx, annotation).await.map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        Ok(annotations.len())
    }

    /// Rows written by older, untyped clients may hold blobs in text columns
    /// or text in `pass`. Text columns are cast; a non-numeric `pass` reads as null.
    async fn list(&self) -> Result<Vec<Annotation>> {
        let rows: Vec<AnnotationRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                CAST(query AS TEXT) AS query,
                CAST(response AS TEXT) AS response,
                CASE WHEN typeof(pass) IN ('integer', 'real') THEN pass <> 0 END AS pass,
                CAST(feedback AS TEXT) AS feedback,
                CAST(error_code AS TEXT) AS error_code
            FROM annotations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM annotations")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(())
    }
}

async fn upsert_with<'e, E>(executor: E, annotation: &Annotation) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    match annotation.id {
        Some(id) => {
            sqlx::query(UPSERT_BY_ID)
                .bind(id)
                .bind(&annotation.query)
                .bind(&annotation.response)
                .bind(annotation.pass)
                .bind(&annotation.feedback)
                .bind(&annotation.error_code)
                .execute(executor)
                .await?;
            Ok(id)
        }
        None => {
            let result = sqlx::query(INSERT_NEW)
                .bind(&annotation.query)
                .bind(&annotation.response)
                .bind(annotation.pass)
                .bind(&annotation.feedback)
                .bind(&annotation.error_code)
                .execute(executor)
                .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

fn db_error(e: sqlx::Error) -> AnnotatorError {
    AnnotatorError::Database(e.to_string())
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct AnnotationRow {
    id: i64,
    query: Option<String>,
    response: Option<String>,
    pass: Option<bool>,
    feedback: Option<String>,
    error_code: Option<String>,
}

impl From<AnnotationRow> for Annotation {
    fn from(r: AnnotationRow) -> Self {
        Annotation {
            id: Some(r.id),
            query: r.query,
            response: r.response,
            pass: r.pass,
            feedback: r.feedback,
            error_code: r.error_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulkUploadMode;
    use crate::services::AnnotationService;
    use std::collections::HashSet;
    use std::sync::Arc;

    async fn open(dir: &tempfile::TempDir) -> Database {
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("annotations.db"),
            max_connections: 2,
        };
        Database::connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        assert!(dir.path().join("nested").join("annotations.db").exists());
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_without_id_assigns_fresh_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        let mut seen = HashSet::new();
        for i in 0..5 {
            let id = db
                .upsert(&Annotation::new(format!("q{i}"), format!("r{i}")))
                .await
                .unwrap();
            assert!(seen.insert(id), "id {id} assigned twice");
        }

        assert_eq!(db.list().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_upsert_existing_id_replaces_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        let first = Annotation::new("q", "r")
            .with_id(42)
            .with_pass(true)
            .with_feedback("looks right")
            .with_error_code("none");
        assert_eq!(db.upsert(&first).await.unwrap(), 42);

        let replacement = Annotation {
            id: Some(42),
            query: Some("q2".to_string()),
            ..Default::default()
        };
        assert_eq!(db.upsert(&replacement).await.unwrap(), 42);

        let rows = db.list().await.unwrap();
        assert_eq!(rows, vec![replacement]);
    }

    #[tokio::test]
    async fn test_new_rows_never_reuse_explicit_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        db.upsert(&Annotation::default().with_id(10)).await.unwrap();
        let id = db.upsert(&Annotation::new("q", "r")).await.unwrap();

        assert_ne!(id, 10);
        let ids: Vec<_> = db.list().await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![Some(10), Some(id)]);
    }

    #[tokio::test]
    async fn test_upsert_batch_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        let batch = vec![
            Annotation::new("first", "r").with_id(1),
            Annotation::new("q", "r"),
            Annotation::new("second", "r").with_id(1),
        ];
        assert_eq!(db.upsert_batch(&batch).await.unwrap(), 3);

        let rows = db.list().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].query.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_delete_all_reports_removed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        db.upsert_batch(&[Annotation::default(), Annotation::default()])
            .await
            .unwrap();

        assert_eq!(db.delete_all().await.unwrap(), 2);
        assert_eq!(db.delete_all().await.unwrap(), 0);
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = open(&dir).await;
            db.upsert(&Annotation::new("q", "r").with_pass(false))
                .await
                .unwrap();
            db.close().await;
        }

        let db = open(&dir).await;
        let rows = db.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pass, Some(false));
        db.ping().await.unwrap();
    }

    /// Make SQLite itself reject any row whose query is "boom".
    async fn install_failing_trigger(db: &Database) {
        sqlx::query(
            r#"
            CREATE TRIGGER reject_boom BEFORE INSERT ON annotations
            WHEN NEW.query = 'boom'
            BEGIN
                SELECT RAISE(ABORT, 'boom');
            END
            "#,
        )
        .execute(&db.pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_batch_rolls_back_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;
        install_failing_trigger(&db).await;

        let batch = vec![Annotation::new("ok", "r"), Annotation::new("boom", "r")];
        assert!(db.upsert_batch(&batch).await.is_err());

        assert!(db.list().await.unwrap().is_empty());

        // The pool is still usable after the rollback.
        assert_eq!(db.upsert_batch(&batch[..1]).await.unwrap(), 1);
        assert_eq!(db.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_upload_keeps_rows_before_failure() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(open(&dir).await);
        install_failing_trigger(&db).await;

        let service = AnnotationService::new(db.clone(), BulkUploadMode::BestEffort);
        let batch = vec![
            Annotation::new("ok", "r"),
            Annotation::new("boom", "r"),
            Annotation::new("never", "r"),
        ];
        assert!(service.bulk_upload(&batch).await.is_err());

        let rows = db.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_list_reads_untyped_legacy_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir).await;

        sqlx::query(
            r#"
            INSERT INTO annotations (id, query, response, pass, feedback, error_code)
            VALUES
                (1, X'6869', 'r', 'yes', NULL, NULL),
                (2, 'q', 'r', 2, X'6f6b', 'E1'),
                (3, 'q', 'r', 0.0, NULL, NULL)
            "#,
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let rows = db.list().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].query.as_deref(), Some("hi"));
        assert_eq!(rows[0].pass, None);
        assert_eq!(rows[1].pass, Some(true));
        assert_eq!(rows[1].feedback.as_deref(), Some("ok"));
        assert_eq!(rows[2].pass, Some(false));
    }
}
