//! Capture collaborator seams
//!
//! The recording core borrows streams and recorders from the host through
//! the traits defined here; nothing in this crate touches devices directly.

pub mod formats;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use traits::{
    AcquisitionError, ChunkRecorder, Emission, MediaStream, RecorderError, RecorderFactory,
    StreamAcquirer, StreamConstraints,
};
