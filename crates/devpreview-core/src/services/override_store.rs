//! Per-workspace preview URL override persistence.
//!
//! Writes are debounced per workspace so typing into the URL field produces a
//! single save of the final value. Clearing is immediate and always wins over
//! a pending or in-flight write for the same workspace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info};

use super::debounce::TrailingDebouncer;
use crate::domain::{Scratch, ScratchPayload, ScratchType};
use crate::ports::{CoreError, RepositoryError, ScratchRepository};
use crate::settings::DEFAULT_OVERRIDE_DEBOUNCE_MS;

/// Write ordering state for one workspace.
///
/// Every set or clear bumps `generation`; a debounced write only lands if no
/// newer operation was issued while it waited for `io`.
#[derive(Default)]
struct KeySlot {
    generation: AtomicU64,
    io: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct KeySlots {
    inner: Mutex<HashMap<String, Arc<KeySlot>>>,
}

impl KeySlots {
    fn slot(&self, workspace_id: &str) -> Arc<KeySlot> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(workspace_id.to_string()).or_default())
    }
}

struct PendingWrite {
    generation: u64,
    url: String,
}

/// Debounced store for per-workspace preview URL overrides.
pub struct PreviewUrlOverrideStore {
    repo: Arc<dyn ScratchRepository>,
    slots: Arc<KeySlots>,
    debouncer: TrailingDebouncer<String, PendingWrite>,
    delay: Duration,
}

impl PreviewUrlOverrideStore {
    /// Create a store with the default 300 ms debounce window.
    pub fn new(repo: Arc<dyn ScratchRepository>) -> Self {
        Self::with_debounce(repo, Duration::from_millis(DEFAULT_OVERRIDE_DEBOUNCE_MS))
    }

    /// Create a store with a custom debounce window.
    pub fn with_debounce(repo: Arc<dyn ScratchRepository>, delay: Duration) -> Self {
        let slots = Arc::new(KeySlots::default());

        let write_repo = Arc::clone(&repo);
        let write_slots = Arc::clone(&slots);
        let debouncer = TrailingDebouncer::new(move |workspace_id: String, write: PendingWrite| {
            let repo = Arc::clone(&write_repo);
            let slot = write_slots.slot(&workspace_id);
            Box::pin(async move {
                let _io = slot.io.lock().await;
                if slot.generation.load(Ordering::SeqCst) != write.generation {
                    debug!(workspace_id = %workspace_id, "Skipping superseded override write");
                    return;
                }
                let payload = ScratchPayload::preview_url_override(write.url);
                match repo.upsert(&workspace_id, &payload).await {
                    Ok(_) => info!(workspace_id = %workspace_id, "Saved preview URL override"),
                    Err(e) => {
                        error!(workspace_id = %workspace_id, error = %e, "Failed to save preview URL override");
                    }
                }
            }) as futures_util::future::BoxFuture<'static, ()>
        });

        Self {
            repo,
            slots,
            debouncer,
            delay,
        }
    }

    /// The debounce window.
    pub const fn debounce(&self) -> Duration {
        self.delay
    }

    /// Schedule a debounced write of `url` for the workspace.
    ///
    /// A blank URL is treated as a clear.
    pub async fn set_override_url(&self, workspace_id: &str, url: &str) -> Result<(), CoreError> {
        require_workspace(workspace_id)?;
        let url = url.trim();
        if url.is_empty() {
            return self.clear_override(workspace_id).await;
        }

        let slot = self.slots.slot(workspace_id);
        let generation = slot.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(workspace_id = %workspace_id, generation, "Scheduling override write");
        self.debouncer.schedule(
            workspace_id.to_string(),
            PendingWrite {
                generation,
                url: url.to_string(),
            },
            self.delay,
        );
        Ok(())
    }

    /// Delete the workspace's override immediately.
    ///
    /// Cancels any pending write. Clearing a missing record succeeds, and a
    /// storage failure is logged rather than returned.
    pub async fn clear_override(&self, workspace_id: &str) -> Result<(), CoreError> {
        require_workspace(workspace_id)?;
        self.debouncer.cancel(&workspace_id.to_string());

        let slot = self.slots.slot(workspace_id);
        slot.generation.fetch_add(1, Ordering::SeqCst);
        let _io = slot.io.lock().await;

        match self
            .repo
            .delete(ScratchType::PreviewUrlOverride, workspace_id)
            .await
        {
            Ok(()) => info!(workspace_id = %workspace_id, "Cleared preview URL override"),
            Err(RepositoryError::NotFound(_)) => {
                debug!(workspace_id = %workspace_id, "No preview URL override to clear");
            }
            Err(e) => {
                error!(workspace_id = %workspace_id, error = %e, "Failed to clear preview URL override");
            }
        }
        Ok(())
    }

    /// The persisted override, `None` if absent or blank.
    pub async fn get_override(&self, workspace_id: &str) -> Result<Option<String>, CoreError> {
        if workspace_id.is_empty() {
            return Ok(None);
        }
        let scratch = self
            .repo
            .get(ScratchType::PreviewUrlOverride, workspace_id)
            .await?;
        Ok(scratch
            .as_ref()
            .and_then(Scratch::override_url)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string))
    }

    /// Whether a non-blank override is persisted.
    pub async fn has_override(&self, workspace_id: &str) -> Result<bool, CoreError> {
        Ok(self.get_override(workspace_id).await?.is_some())
    }

    /// Whether a debounced write is waiting for the workspace.
    pub fn has_pending_write(&self, workspace_id: &str) -> bool {
        self.debouncer.pending(&workspace_id.to_string())
    }

    /// Drop the pending write for the workspace without saving it.
    pub fn cancel_pending(&self, workspace_id: &str) -> bool {
        self.debouncer.cancel(&workspace_id.to_string())
    }

    /// Save the workspace's pending write now.
    pub async fn flush(&self, workspace_id: &str) -> bool {
        self.debouncer.flush(&workspace_id.to_string()).await
    }

    /// Save every pending write now.
    pub async fn flush_all(&self) {
        self.debouncer.flush_all().await;
    }
}

fn require_workspace(workspace_id: &str) -> Result<(), CoreError> {
    if workspace_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "workspace id is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;
    use std::sync::Mutex as StdMutex;

    /// In-memory scratch repository that records every write.
    #[derive(Default)]
    struct MemoryScratch {
        rows: StdMutex<HashMap<String, ScratchPayload>>,
        upserts: StdMutex<Vec<(String, ScratchPayload)>>,
    }

    #[async_trait]
    impl ScratchRepository for MemoryScratch {
        async fn get(
            &self,
            _scratch_type: ScratchType,
            id: &str,
        ) -> Result<Option<Scratch>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(id).map(|payload| Scratch {
                id: id.to_string(),
                payload: payload.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        }

        async fn upsert(
            &self,
            id: &str,
            payload: &ScratchPayload,
        ) -> Result<Scratch, RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .insert(id.to_string(), payload.clone());
            self.upserts
                .lock()
                .unwrap()
                .push((id.to_string(), payload.clone()));
            Ok(Scratch {
                id: id.to_string(),
                payload: payload.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }

        async fn delete(&self, _scratch_type: ScratchType, id: &str) -> Result<(), RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
        }
    }

    mock! {
        Scratches {}

        #[async_trait]
        impl ScratchRepository for Scratches {
            async fn get(&self, scratch_type: ScratchType, id: &str) -> Result<Option<Scratch>, RepositoryError>;
            async fn upsert(&self, id: &str, payload: &ScratchPayload) -> Result<Scratch, RepositoryError>;
            async fn delete(&self, scratch_type: ScratchType, id: &str) -> Result<(), RepositoryError>;
        }
    }

    const DELAY: Duration = Duration::from_millis(300);

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn store() -> (PreviewUrlOverrideStore, Arc<MemoryScratch>) {
        let repo = Arc::new(MemoryScratch::default());
        let store = PreviewUrlOverrideStore::with_debounce(repo.clone(), DELAY);
        (store, repo)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_sets_persist_final_value_once() {
        let (store, repo) = store();
        for port in 3000..3005 {
            store
                .set_override_url("ws-1", &format!("http://localhost:{port}"))
                .await
                .unwrap();
            tokio::time::advance(Duration::from_millis(50)).await;
        }
        assert!(repo.upserts.lock().unwrap().is_empty());

        tokio::time::advance(DELAY).await;
        settle().await;

        let upserts = repo.upserts.lock().unwrap().clone();
        assert_eq!(upserts.len(), 1);
        assert_eq!(
            upserts[0].1,
            ScratchPayload::preview_url_override("http://localhost:3004")
        );
        assert_eq!(
            store.get_override("ws-1").await.unwrap().as_deref(),
            Some("http://localhost:3004")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_wins_over_pending_write() {
        let (store, repo) = store();
        store
            .set_override_url("ws-1", "http://example.com")
            .await
            .unwrap();
        store.clear_override("ws-1").await.unwrap();
        assert!(!store.has_override("ws-1").await.unwrap());

        tokio::time::advance(DELAY * 3).await;
        settle().await;

        assert!(repo.upserts.lock().unwrap().is_empty());
        assert!(!store.has_override("ws-1").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_missing_record_is_ok() {
        let (store, _repo) = store();
        assert!(store.clear_override("never-set").await.is_ok());
        assert!(store.clear_override("never-set").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_set_clears() {
        let (store, _repo) = store();
        store
            .set_override_url("ws-1", "http://example.com")
            .await
            .unwrap();
        assert!(store.flush("ws-1").await);
        assert!(store.has_override("ws-1").await.unwrap());

        store.set_override_url("ws-1", "   ").await.unwrap();
        assert!(!store.has_override("ws-1").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_workspaces_are_independent() {
        let (store, _repo) = store();
        store.set_override_url("a", "http://a.test").await.unwrap();
        store.set_override_url("b", "http://b.test").await.unwrap();
        store.clear_override("a").await.unwrap();

        tokio::time::advance(DELAY * 2).await;
        settle().await;

        assert!(!store.has_override("a").await.unwrap());
        assert_eq!(
            store.get_override("b").await.unwrap().as_deref(),
            Some("http://b.test")
        );
    }

    #[tokio::test]
    async fn test_empty_workspace_id_is_rejected() {
        let (store, _repo) = store();
        assert!(matches!(
            store.set_override_url("", "http://x.test").await,
            Err(CoreError::Validation(_))
        ));
        assert_eq!(store.get_override("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_swallows_storage_failure() {
        let mut repo = MockScratches::new();
        repo.expect_delete()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Storage("disk full".to_string())));

        let store = PreviewUrlOverrideStore::new(Arc::new(repo));
        assert!(store.clear_override("ws-1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_not_retried() {
        let mut repo = MockScratches::new();
        repo.expect_upsert()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Storage("locked".to_string())));

        let store = PreviewUrlOverrideStore::with_debounce(Arc::new(repo), DELAY);
        store
            .set_override_url("ws-1", "http://example.com")
            .await
            .unwrap();

        tokio::time::advance(DELAY * 5).await;
        settle().await;
        assert!(!store.has_pending_write("ws-1"));
    }
}
