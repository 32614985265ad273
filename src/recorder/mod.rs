//! Recording system module
//!
//! This module implements the chunked recording architecture:
//! - CaptureSession ingesting recorder emissions into buffer and store
//! - RecordingCoordinator driving the Idle/Recording state machine

pub mod coordinator;
pub mod session;
pub mod state;

pub use coordinator::{CoordinatorError, RecordingCoordinator, RecordingEvent};
pub use session::CaptureSession;
pub use state::{RecordingOutcome, RecordingState, SessionInfo};
