//! Capture session
//!
//! Drives one recorder over a borrowed stream, ingesting its emissions:
//! empty emissions are dropped, everything else is keyed, mirrored into the
//! in-memory buffer, and handed to the durable store without blocking the
//! emission path.

use crate::capture::traits::{ChunkRecorder, Emission, MediaStream, RecorderError};
use crate::recorder::state::SessionInfo;
use crate::store::{Chunk, ChunkStore, KeyAllocator};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One in-progress or completed recording attempt.
///
/// The stream handle is borrowed from the host; the coordinator tears it
/// down. The in-memory buffer is owned exclusively by the session and keeps
/// every chunk even when durable writes fail.
pub struct CaptureSession {
    recorder: Box<dyn ChunkRecorder>,
    stream: Arc<dyn MediaStream>,
    store: Option<Arc<ChunkStore>>,
    buffer: Arc<RwLock<Vec<Chunk>>>,
    drain: Option<JoinHandle<()>>,
    mime_type: String,
    info: SessionInfo,
}

impl CaptureSession {
    /// Create a session over an already-created recorder.
    ///
    /// `store` is `None` when durable storage is unavailable for this
    /// recording; the session then runs memory-only.
    pub fn new(
        recorder: Box<dyn ChunkRecorder>,
        stream: Arc<dyn MediaStream>,
        store: Option<Arc<ChunkStore>>,
        index: usize,
    ) -> Self {
        let mime_type = recorder.mime_type().to_string();
        Self {
            recorder,
            stream,
            store,
            buffer: Arc::new(RwLock::new(Vec::new())),
            drain: None,
            mime_type,
            info: SessionInfo::new(index),
        }
    }

    /// Start the recorder and begin ingesting emissions
    pub fn begin(&mut self, slice_interval: Duration) -> Result<(), RecorderError> {
        let rx = self.recorder.start(slice_interval)?;
        let buffer = Arc::clone(&self.buffer);
        let store = self.store.clone();

        self.drain = Some(tokio::spawn(drain_emissions(rx, buffer, store)));

        tracing::info!(
            mime = %self.mime_type,
            slice_ms = slice_interval.as_millis() as u64,
            "capture session started"
        );
        Ok(())
    }

    /// Stop the recorder and wait for its final emission to be ingested.
    ///
    /// Durable writes already in flight are left to complete on their own.
    pub async fn stop(&mut self) -> Result<(), RecorderError> {
        self.recorder.stop().await?;

        if let Some(drain) = self.drain.take() {
            drain
                .await
                .map_err(|err| RecorderError::Failed(format!("emission drain failed: {err}")))?;
        }

        self.info.end();
        tracing::info!(
            chunks = self.chunk_count(),
            duration_ms = self.info.duration_ms(),
            "capture session stopped"
        );
        Ok(())
    }

    /// Snapshot of the in-memory fallback buffer, in emission order
    pub fn buffered_chunks(&self) -> Vec<Chunk> {
        self.buffer.read().clone()
    }

    /// Number of chunks ingested so far
    pub fn chunk_count(&self) -> usize {
        self.buffer.read().len()
    }

    /// The durable store handle this session writes to, if any
    pub fn store(&self) -> Option<&Arc<ChunkStore>> {
        self.store.as_ref()
    }

    /// The borrowed stream this session records from
    pub fn stream(&self) -> &Arc<dyn MediaStream> {
        &self.stream
    }

    /// Format the recorder actually encodes to
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Bookkeeping for this attempt
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }
}

/// Ingest recorder emissions until the channel closes after the final flush.
async fn drain_emissions(
    mut rx: mpsc::Receiver<Emission>,
    buffer: Arc<RwLock<Vec<Chunk>>>,
    store: Option<Arc<ChunkStore>>,
) {
    let mut keys = KeyAllocator::new();

    while let Some(emission) = rx.recv().await {
        if emission.data.is_empty() {
            tracing::trace!(is_final = emission.is_final, "dropping empty emission");
            continue;
        }

        let key = keys.next(Utc::now().timestamp_millis() as u64);
        let chunk = Chunk::new(key, emission.data);

        buffer.write().push(chunk.clone());

        if let Some(store) = &store {
            let store = Arc::clone(store);
            tokio::spawn(async move {
                if let Err(err) = store.put(&chunk).await {
                    tracing::warn!(key = %chunk.key, "chunk not persisted: {err}");
                }
            });
        }
    }
}
