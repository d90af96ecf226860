//! `SQLite` implementation of the `ScratchRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use devpreview_core::{RepositoryError, Scratch, ScratchPayload, ScratchRepository, ScratchType};

use super::row_mappers::{SCRATCH_SELECT_COLUMNS, now_timestamp, row_to_scratch, storage_error};

/// Scratch records keyed by `(id, scratch_type)`, payload stored as JSON.
pub struct SqliteScratchRepository {
    pool: SqlitePool,
}

impl SqliteScratchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScratchRepository for SqliteScratchRepository {
    async fn get(
        &self,
        scratch_type: ScratchType,
        id: &str,
    ) -> Result<Option<Scratch>, RepositoryError> {
        let sql = format!(
            "SELECT {SCRATCH_SELECT_COLUMNS} FROM scratch WHERE id = ? AND scratch_type = ?"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scratch_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(row_to_scratch).transpose()
    }

    async fn upsert(&self, id: &str, payload: &ScratchPayload) -> Result<Scratch, RepositoryError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let now = now_timestamp();
        let scratch_type = payload.scratch_type();

        sqlx::query(
            r"
            INSERT INTO scratch (id, scratch_type, payload, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id, scratch_type)
            DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
            ",
        )
        .bind(id)
        .bind(scratch_type.as_str())
        .bind(&json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!(id = %id, scratch_type = scratch_type.as_str(), "Upserted scratch");

        self.get(scratch_type, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, scratch_type: ScratchType, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM scratch WHERE id = ? AND scratch_type = ?")
            .bind(id)
            .bind(scratch_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    async fn repo() -> SqliteScratchRepository {
        SqliteScratchRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let repo = repo().await;
        let payload = ScratchPayload::preview_url_override("http://localhost:3000");

        let saved = repo.upsert("ws-1", &payload).await.unwrap();
        assert_eq!(saved.id, "ws-1");
        assert_eq!(saved.payload, payload);

        let loaded = repo
            .get(ScratchType::PreviewUrlOverride, "ws-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.override_url(), Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn test_upsert_replaces_payload_keeps_created_at() {
        let repo = repo().await;
        let first = repo
            .upsert("ws-1", &ScratchPayload::preview_url_override("http://a.test"))
            .await
            .unwrap();
        let second = repo
            .upsert("ws-1", &ScratchPayload::preview_url_override("http://b.test"))
            .await
            .unwrap();

        assert_eq!(second.override_url(), Some("http://b.test"));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = repo().await;
        assert!(
            repo.get(ScratchType::PreviewUrlOverride, "nope")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        repo.upsert("ws-1", &ScratchPayload::preview_url_override("http://a.test"))
            .await
            .unwrap();

        repo.delete(ScratchType::PreviewUrlOverride, "ws-1")
            .await
            .unwrap();
        assert!(matches!(
            repo.delete(ScratchType::PreviewUrlOverride, "ws-1").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_payload_wire_format_in_table() {
        let repo = repo().await;
        repo.upsert("ws-1", &ScratchPayload::preview_url_override("http://a.test"))
            .await
            .unwrap();

        let (payload,): (String,) = sqlx::query_as("SELECT payload FROM scratch WHERE id = 'ws-1'")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["type"], "PREVIEW_URL_OVERRIDE");
        assert_eq!(json["data"]["url"], "http://a.test");
    }
}
