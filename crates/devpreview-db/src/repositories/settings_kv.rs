//! JSON values in the `settings_kv` table.

use devpreview_core::RepositoryError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{Row, SqlitePool};

use super::row_mappers::{now_timestamp, storage_error};

pub async fn load_json<T: DeserializeOwned>(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    let row = sqlx::query("SELECT value FROM settings_kv WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(storage_error)?;

    row.map(|r| {
        let json: String = r.get("value");
        serde_json::from_str(&json).map_err(|e| RepositoryError::Serialization(e.to_string()))
    })
    .transpose()
}

pub async fn save_json<T: Serialize + Sync>(
    pool: &SqlitePool,
    key: &str,
    value: &T,
) -> Result<(), RepositoryError> {
    let json =
        serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    sqlx::query("INSERT OR REPLACE INTO settings_kv (key, value, updated_at) VALUES (?, ?, ?)")
        .bind(key)
        .bind(&json)
        .bind(now_timestamp())
        .execute(pool)
        .await
        .map_err(storage_error)?;

    Ok(())
}
