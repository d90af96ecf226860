//! Keyed trailing-edge debouncer.
//!
//! Each key has at most one pending timer. Scheduling again for the same key
//! replaces the pending value and restarts the timer, so only the final value
//! of a burst reaches the handler.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Async callback invoked with the final value of a burst.
pub type DebounceHandler<K, V> = Arc<dyn Fn(K, V) -> BoxFuture<'static, ()> + Send + Sync>;

struct Entry<V> {
    id: u64,
    value: V,
    token: CancellationToken,
}

type Entries<K, V> = Arc<Mutex<HashMap<K, Entry<V>>>>;

fn lock<K, V>(entries: &Mutex<HashMap<K, Entry<V>>>) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trailing-edge debouncer keyed by `K`.
///
/// Timers run on the ambient tokio runtime. Dropping the debouncer cancels
/// every pending timer without invoking the handler.
pub struct TrailingDebouncer<K, V> {
    handler: DebounceHandler<K, V>,
    entries: Entries<K, V>,
    next_id: AtomicU64,
    root: CancellationToken,
}

impl<K, V> TrailingDebouncer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Send + 'static,
{
    /// Create a debouncer that calls `handler` once a key goes quiet.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(K, V) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            root: CancellationToken::new(),
        }
    }

    /// Schedule `value` for `key`, replacing any pending value.
    pub fn schedule(&self, key: K, value: V, delay: Duration) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.root.child_token();
        let deadline = tokio::time::Instant::now() + delay;

        if let Some(previous) = lock(&self.entries).insert(
            key.clone(),
            Entry {
                id,
                value,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
            debug!(?key, "Debounce timer reset");
        }

        let entries = Arc::clone(&self.entries);
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {
                    let due = {
                        let mut map = lock(&entries);
                        match map.get(&key) {
                            Some(entry) if entry.id == id => map.remove(&key),
                            _ => None,
                        }
                    };
                    if let Some(entry) = due {
                        debug!(?key, "Debounce timer fired");
                        handler(key, entry.value).await;
                    }
                }
            }
        });
    }

    /// Cancel the pending timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        let Some(entry) = lock(&self.entries).remove(key) else {
            return false;
        };
        entry.token.cancel();
        true
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&self) {
        for (_, entry) in lock(&self.entries).drain() {
            entry.token.cancel();
        }
    }

    /// Whether a timer is pending for `key`.
    pub fn pending(&self, key: &K) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Number of keys with a pending timer.
    pub fn pending_count(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Run the pending value for `key` now instead of waiting for its timer.
    ///
    /// Returns `true` if a value was pending.
    pub async fn flush(&self, key: &K) -> bool {
        let entry = lock(&self.entries).remove(key);
        match entry {
            Some(entry) => {
                entry.token.cancel();
                (self.handler)(key.clone(), entry.value).await;
                true
            }
            None => false,
        }
    }

    /// Run every pending value now.
    pub async fn flush_all(&self) {
        let drained: Vec<(K, Entry<V>)> = lock(&self.entries).drain().collect();
        for (key, entry) in drained {
            entry.token.cancel();
            (self.handler)(key, entry.value).await;
        }
    }
}

impl<K, V> Drop for TrailingDebouncer<K, V> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    type Calls = Arc<StdMutex<Vec<(String, u32)>>>;

    fn recording() -> (TrailingDebouncer<String, u32>, Calls) {
        let calls: Calls = Arc::default();
        let sink = Arc::clone(&calls);
        let debouncer = TrailingDebouncer::new(move |key: String, value: u32| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                sink.lock().unwrap().push((key, value));
            }) as BoxFuture<'static, ()>
        });
        (debouncer, calls)
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_last_value() {
        let (debouncer, calls) = recording();
        for value in 1..=5 {
            debouncer.schedule("ws".to_string(), value, DELAY);
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::advance(DELAY).await;
        settle().await;

        assert_eq!(*calls.lock().unwrap(), vec![("ws".to_string(), 5)]);
        assert!(!debouncer.pending(&"ws".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (debouncer, calls) = recording();
        debouncer.schedule("a".to_string(), 1, DELAY);
        debouncer.schedule("b".to_string(), 2, DELAY);
        assert_eq!(debouncer.pending_count(), 2);

        tokio::time::advance(DELAY + Duration::from_millis(1)).await;
        settle().await;

        let mut seen = calls.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_handler() {
        let (debouncer, calls) = recording();
        debouncer.schedule("ws".to_string(), 1, DELAY);
        assert!(debouncer.cancel(&"ws".to_string()));
        assert!(!debouncer.cancel(&"ws".to_string()));

        tokio::time::advance(DELAY * 2).await;
        settle().await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_immediately() {
        let (debouncer, calls) = recording();
        debouncer.schedule("ws".to_string(), 7, DELAY);
        assert!(debouncer.flush(&"ws".to_string()).await);
        assert_eq!(*calls.lock().unwrap(), vec![("ws".to_string(), 7)]);

        tokio::time::advance(DELAY * 2).await;
        settle().await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let (debouncer, calls) = recording();
        debouncer.schedule("ws".to_string(), 1, DELAY);
        drop(debouncer);

        tokio::time::advance(DELAY * 2).await;
        settle().await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
