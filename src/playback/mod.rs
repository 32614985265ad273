//! Artifact reconstruction
//!
//! Rebuilds one playable artifact from an ordered chunk sequence, preferring
//! the durable store and falling back to the in-memory session buffer.

pub mod reconstruct;

pub use reconstruct::{
    reconstruct, resolve_chunk_source, ChunkOrigin, ChunkSource, PlayableArtifact,
};
