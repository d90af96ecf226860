//! Async stream log readers (non-UTF8-safe).
//!
//! Dev servers can emit non-UTF8 bytes. `BufReader::lines()` stops on invalid
//! UTF-8, so lines are read as bytes and decoded lossily.

use devpreview_core::{DevServerLogSink, LogStream};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    process_id: String,
    stream_type: LogStream,
    sink: Arc<dyn DevServerLogSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    sink.append(&process_id, stream_type, line);
                }
                Err(e) => {
                    debug!(process_id = %process_id, %stream_type, error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(process_id = %process_id, %stream_type, "log stream reader task exiting");
    })
}
