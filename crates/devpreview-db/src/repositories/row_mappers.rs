//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDateTime, Utc};
use devpreview_core::{RepositoryError, Scratch, ScratchPayload};
use sqlx::Row;

/// Column list shared by scratch queries.
pub const SCRATCH_SELECT_COLUMNS: &str = "id, payload, created_at, updated_at";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Current time in the stored timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp, tolerating a trailing " UTC".
pub fn parse_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = datetime_str.trim_end_matches(" UTC");
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .ok()
}

pub fn storage_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// Parse a scratch row selected with [`SCRATCH_SELECT_COLUMNS`].
pub fn row_to_scratch(row: &sqlx::sqlite::SqliteRow) -> Result<Scratch, RepositoryError> {
    let payload_json: String = row.try_get("payload").map_err(storage_error)?;
    let payload: ScratchPayload = serde_json::from_str(&payload_json)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    let created_at: String = row.try_get("created_at").map_err(storage_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(storage_error)?;

    Ok(Scratch {
        id: row.try_get("id").map_err(storage_error)?,
        payload,
        created_at: parse_datetime(&created_at).unwrap_or_else(Utc::now),
        updated_at: parse_datetime(&updated_at).unwrap_or_else(Utc::now),
    })
}
