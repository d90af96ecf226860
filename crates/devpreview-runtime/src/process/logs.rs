//! Dev-server log buffering and streaming.
//!
//! Every process gets a ring buffer of recent lines. A subscription replays
//! the buffer and then follows the live broadcast. Lines are broadcast under
//! the buffer lock, so the live feed carries each process's lines in sequence
//! order and only lines already in the replayed snapshot are dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use devpreview_core::{
    DEFAULT_LOG_BUFFER_LINES, DevServerLogSink, LogLine, LogLineStream, LogStream,
    LogStreamReader,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Broadcast capacity shared by all processes
const CHANNEL_CAPACITY: usize = 4096;

/// A log line tagged with its process and position.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub process_id: Arc<str>,
    /// Position in the process's log, starting at 0
    pub seq: u64,
    pub line: LogLine,
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<LogLine>,
    next_seq: u64,
    capacity: usize,
}

impl LogBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            next_seq: 0,
            capacity,
        }
    }

    /// Add a line, evicting the oldest at capacity. Returns its sequence number.
    fn push(&mut self, line: LogLine) -> u64 {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.lines.push_back(line);
        seq
    }
}

/// Log buffers and live broadcast for all dev-server processes.
pub struct ServerLogManager {
    buffers: RwLock<HashMap<String, LogBuffer>>,
    broadcast_tx: broadcast::Sender<LogEntry>,
    capacity: usize,
}

impl ServerLogManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_BUFFER_LINES)
    }

    /// Keep at most `capacity` lines per process.
    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            buffers: RwLock::new(HashMap::new()),
            broadcast_tx,
            capacity: capacity.max(1),
        }
    }

    /// Append a line (sync, callable from any thread).
    pub fn add_log(&self, process_id: &str, line: LogLine) {
        let mut buffers = self.buffers.write().unwrap_or_else(PoisonError::into_inner);
        let seq = buffers
            .entry(process_id.to_string())
            .or_insert_with(|| LogBuffer::new(self.capacity))
            .push(line.clone());

        // Sent before the lock drops so broadcast order matches seq order.
        // No receivers is fine
        let _ = self.broadcast_tx.send(LogEntry {
            process_id: Arc::from(process_id),
            seq,
            line,
        });
    }

    /// Whether a buffer exists for the process.
    pub fn has_process(&self, process_id: &str) -> bool {
        self.buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(process_id)
    }

    /// Buffered lines of a process, oldest first.
    pub fn get_logs(&self, process_id: &str) -> Vec<LogLine> {
        let buffers = self.buffers.read().unwrap_or_else(PoisonError::into_inner);
        buffers
            .get(process_id)
            .map(|b| b.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Receiver for live lines of every process.
    pub fn subscribe_all(&self) -> broadcast::Receiver<LogEntry> {
        self.broadcast_tx.subscribe()
    }

    pub fn clear_logs(&self, process_id: &str) {
        self.buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(process_id);
    }

    /// Start an empty buffer for a new process.
    pub fn init_process(&self, process_id: &str) {
        self.buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(process_id.to_string(), LogBuffer::new(self.capacity));
    }
}

impl Default for ServerLogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DevServerLogSink for ServerLogManager {
    fn append(&self, process_id: &str, stream: LogStream, line: String) {
        self.add_log(process_id, LogLine::new(stream, line));
    }
}

impl LogStreamReader for ServerLogManager {
    fn subscribe(&self, process_id: &str) -> LogLineStream {
        if process_id.is_empty() {
            return Box::pin(futures_util::stream::empty::<LogLine>());
        }

        // Snapshot and subscribe under the same lock so nothing falls between
        let (history, history_end, mut rx) = {
            let buffers = self.buffers.read().unwrap_or_else(PoisonError::into_inner);
            let (history, history_end): (Vec<LogLine>, u64) = buffers
                .get(process_id)
                .map(|b| (b.lines.iter().cloned().collect(), b.next_seq))
                .unwrap_or_default();
            (history, history_end, self.broadcast_tx.subscribe())
        };

        let process_id = process_id.to_string();
        Box::pin(async_stream::stream! {
            for line in history {
                yield line;
            }

            loop {
                match rx.recv().await {
                    Ok(entry) => {
                        // Everything below the boundary was in the snapshot
                        if *entry.process_id != *process_id || entry.seq < history_end {
                            continue;
                        }
                        yield entry.line;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(process_id = %process_id, skipped, "Log subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
