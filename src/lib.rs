//! clipvault — crash-safe chunked recording.
//!
//! Captures a live media stream as a sequence of timestamped chunks,
//! persists each chunk durably the moment it is emitted, and reconstructs a
//! single playable artifact on stop — or at the next startup, when a prior
//! run was interrupted mid-recording.
//!
//! The host supplies devices, streams and the actual encoder through the
//! traits in [`capture`]; everything else is owned here:
//!
//! - [`store`] — the durable, ordered chunk store
//! - [`recorder`] — the capture session and the Idle/Recording coordinator
//! - [`playback`] — chunk-source resolution and artifact reconstruction
//! - [`settings`] — persisted device preference

pub mod capture;
pub mod config;
pub mod playback;
pub mod recorder;
pub mod settings;
pub mod store;
pub mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for hosts that don't install their own
/// subscriber
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipvault=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
