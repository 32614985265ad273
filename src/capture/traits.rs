//! Capture trait definitions
//!
//! Host-agnostic seams for the capture collaborators: stream acquisition,
//! live stream handles, and the slicing recorder. The recording core only
//! ever talks to these traits; device enumeration, previews and the actual
//! encoder live on the host side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Stream acquisition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("permission denied for capture device")]
    PermissionDenied,

    #[error("no capture device matched: {0}")]
    NotFound(String),

    #[error("capture constraints cannot be satisfied: {0}")]
    Overconstrained(String),
}

/// Recorder failures
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("unsupported recording format: {0}")]
    UnsupportedFormat(String),

    #[error("recorder failed: {0}")]
    Failed(String),
}

/// Constraints handed to the acquisition collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    /// Exact device to open; `None` lets the host pick
    pub device_id: Option<String>,

    /// Whether to capture audio alongside video
    pub audio: bool,
}

impl StreamConstraints {
    /// Constraints for a specific device (or the host default), with audio
    pub fn for_device(device_id: Option<&str>) -> Self {
        Self {
            device_id: device_id.map(str::to_string),
            audio: true,
        }
    }
}

/// A live media stream borrowed from the host.
///
/// The recording core never owns the underlying device; it must call
/// [`stop_tracks`](MediaStream::stop_tracks) before another stream may be
/// acquired, so hardware is never double-locked.
pub trait MediaStream: Send + Sync {
    /// Identifier of the device backing this stream
    fn id(&self) -> &str;

    /// Stop every track, releasing the device. Idempotent.
    fn stop_tracks(&self);

    /// Whether the stream still has live tracks
    fn is_active(&self) -> bool;
}

/// Acquires live streams from the host
#[async_trait]
pub trait StreamAcquirer: Send + Sync {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, AcquisitionError>;
}

/// One recorder emission.
///
/// `data` may legitimately be empty at session start/stop boundaries.
#[derive(Debug, Clone)]
pub struct Emission {
    /// Encoded media bytes for this time slice
    pub data: Vec<u8>,

    /// Set on the flush emitted in response to [`ChunkRecorder::stop`]
    pub is_final: bool,
}

/// Periodic chunk emitter over a borrowed stream
#[async_trait]
pub trait ChunkRecorder: Send {
    /// Begin emitting roughly every `slice_interval`. The returned channel
    /// closes after the final emission requested by [`stop`](Self::stop).
    fn start(
        &mut self,
        slice_interval: Duration,
    ) -> Result<mpsc::Receiver<Emission>, RecorderError>;

    /// Request the final flush of buffered partial data. Completion is
    /// signalled by the emission channel closing.
    async fn stop(&mut self) -> Result<(), RecorderError>;

    /// The format this recorder actually encodes to
    fn mime_type(&self) -> &str;
}

/// Creates recorders for a stream/format pair.
///
/// An empty `mime_type` asks for the host-chosen default format.
pub trait RecorderFactory: Send + Sync {
    fn create(
        &self,
        stream: Arc<dyn MediaStream>,
        mime_type: &str,
    ) -> Result<Box<dyn ChunkRecorder>, RecorderError>;
}
