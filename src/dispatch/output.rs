//! Output sinks handed to the spawner, and the process-wide debug sink.
//!
//! # Design Decisions
//! - A debug-enabled sink forwards chunks through a channel to one background
//!   task per stream; writes never block on the debug sink
//! - Forwarding tasks are not joined: captured output may be recorded after
//!   the handler is deregistered and the response is sent
//! - Output of concurrent handlers interleaves at chunk granularity, not lines

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

/// Destination for captured stdout/stderr of debug-enabled routes.
pub trait DebugSink: Send + Sync {
    /// Record a raw chunk of process output.
    fn record(&self, chunk: &[u8]);
}

/// Emits each captured chunk as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn record(&self, chunk: &[u8]) {
        tracing::info!(target: "procmux::debug", output = %String::from_utf8_lossy(chunk));
    }
}

/// In-memory sink. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.buf.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DebugSink for BufferSink {
    fn record(&self, chunk: &[u8]) {
        self.buf.lock().extend_from_slice(chunk);
    }
}

/// A writable stream for one of the spawned process's outputs.
///
/// Either discards everything or forwards to a debug sink.
#[derive(Debug)]
pub struct OutputSink {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
}

impl OutputSink {
    /// A sink that drops every write.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// A sink whose writes are copied into `sink` by a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn forward_to(sink: Arc<dyn DebugSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
        tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                sink.record(&chunk);
            }
        });
        Self { tx: Some(tx) }
    }

    /// Returns true if writes are discarded.
    pub fn is_discard(&self) -> bool {
        self.tx.is_none()
    }

    /// Write a chunk without awaiting.
    pub fn write_chunk(&self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        if let Some(tx) = &self.tx {
            // A closed receiver only means the debug sink went away.
            let _ = tx.send(Bytes::copy_from_slice(chunk));
        }
    }
}

impl AsyncWrite for OutputSink {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.write_chunk(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.tx = None;
        Poll::Ready(Ok(()))
    }
}
