//! Scratch repository trait definition.
//!
//! This port defines the interface for the generic per-key blob store used
//! for preview URL overrides.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Scratch, ScratchPayload, ScratchType};

/// Repository for scratch persistence.
///
/// Records are keyed by `(scratch_type, id)`.
#[async_trait]
pub trait ScratchRepository: Send + Sync {
    /// Load a scratch record, `None` if it does not exist.
    async fn get(&self, scratch_type: ScratchType, id: &str)
    -> Result<Option<Scratch>, RepositoryError>;

    /// Insert or replace a scratch record.
    async fn upsert(&self, id: &str, payload: &ScratchPayload) -> Result<Scratch, RepositoryError>;

    /// Delete a scratch record.
    ///
    /// Returns `RepositoryError::NotFound` if there was nothing to delete.
    async fn delete(&self, scratch_type: ScratchType, id: &str) -> Result<(), RepositoryError>;
}
