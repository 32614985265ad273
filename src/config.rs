//! Recording configuration and defaults

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default recording format requested from the host recorder
pub const DEFAULT_MIME_TYPE: &str = "video/mp4";

/// Default duration between chunk emissions, in milliseconds
pub const DEFAULT_SLICE_INTERVAL_MS: u64 = 10_000;

/// Directory name of the durable chunk store
pub const STORE_NAME: &str = "recording-db";

/// Schema version of the durable chunk store
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Configuration for one recording attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Requested recording format; the host default is used if unsupported
    pub mime_type: String,

    /// Duration between chunk emissions, in milliseconds
    pub slice_interval_ms: u64,

    /// Whether to capture audio alongside video
    pub audio: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            slice_interval_ms: DEFAULT_SLICE_INTERVAL_MS,
            audio: true,
        }
    }
}

impl RecordingConfig {
    /// Slice interval as a [`Duration`]
    pub fn slice_interval(&self) -> Duration {
        Duration::from_millis(self.slice_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = RecordingConfig::default();
        assert_eq!(config.mime_type, "video/mp4");
        assert_eq!(config.slice_interval(), Duration::from_secs(10));
        assert!(config.audio);
    }
}
