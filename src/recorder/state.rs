//! Recording state management
//!
//! Defines the recording state machine and session bookkeeping.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Currently recording
    Recording,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Bookkeeping for one start-to-stop capture attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Session index (0, 1, 2, ...)
    pub index: usize,

    /// Unix timestamp when the session started
    pub unix_start_ms: u64,

    /// Unix timestamp when the session ended (equals start while running)
    pub unix_end_ms: u64,
}

impl SessionInfo {
    /// Create bookkeeping for a session starting now
    pub fn new(index: usize) -> Self {
        let now = Utc::now().timestamp_millis() as u64;
        Self {
            index,
            unix_start_ms: now,
            unix_end_ms: now,
        }
    }

    /// Mark the session as ended now
    pub fn end(&mut self) {
        self.unix_end_ms = Utc::now().timestamp_millis() as u64;
    }

    /// Wall-clock duration of the session so far, in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        let now = Utc::now().timestamp_millis() as u64;
        now.saturating_sub(self.unix_start_ms)
    }

    /// Duration between start and end, in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.unix_end_ms.saturating_sub(self.unix_start_ms)
    }
}

/// Result of a completed recording
#[derive(Debug, Clone)]
pub struct RecordingOutcome {
    /// The reconstructed recording
    pub artifact: crate::playback::PlayableArtifact,

    /// Number of chunks that fed the reconstruction
    pub chunk_count: usize,

    /// Total duration of the recording in milliseconds
    pub duration_ms: u64,

    /// Whether the chunks came from the durable store (vs. the memory buffer)
    pub from_durable_store: bool,
}
