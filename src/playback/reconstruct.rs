//! Chunk-source resolution and artifact reconstruction
//!
//! Reconstruction is pure concatenation in key order: no re-encoding, no
//! boundary repair. Identical chunk sequences always produce byte-identical
//! artifacts.

use crate::store::{Chunk, ChunkStore};
use std::sync::Arc;
use uuid::Uuid;

/// A reconstructed recording ready for a playback collaborator.
///
/// Cheap to clone; the payload is shared. The `id` is a transient handle for
/// playback surfaces, not a persisted identifier.
#[derive(Debug, Clone)]
pub struct PlayableArtifact {
    id: Uuid,
    mime_type: String,
    data: Arc<[u8]>,
}

impl PlayableArtifact {
    /// Transient handle for playback surfaces
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Format of the reconstructed recording
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The full reconstructed byte sequence
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the artifact holds no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which collection a reconstruction read its chunks from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOrigin {
    /// The durable chunk store
    DurableStore,
    /// The in-memory fallback buffer of the most recent session
    MemoryBuffer,
}

/// A resolved, ordered chunk sequence ready for reconstruction
#[derive(Debug, Clone)]
pub struct ChunkSource {
    pub origin: ChunkOrigin,
    pub chunks: Vec<Chunk>,
}

/// The single decision point for which chunks feed reconstruction: the
/// durable store when it is reachable and non-empty, otherwise a snapshot of
/// the in-memory buffer.
pub fn resolve_chunk_source(store: Option<&ChunkStore>, fallback: &[Chunk]) -> ChunkSource {
    if let Some(store) = store {
        match store.get_all() {
            Ok(chunks) if !chunks.is_empty() => {
                return ChunkSource {
                    origin: ChunkOrigin::DurableStore,
                    chunks,
                };
            }
            Ok(_) => {
                tracing::debug!("durable store empty, using memory buffer");
            }
            Err(err) => {
                tracing::warn!("durable store unreadable, using memory buffer: {err}");
            }
        }
    }

    ChunkSource {
        origin: ChunkOrigin::MemoryBuffer,
        chunks: fallback.to_vec(),
    }
}

/// Concatenate the source's chunks in key order into one playable artifact
pub fn reconstruct(source: &ChunkSource, mime_type: &str) -> PlayableArtifact {
    let mut ordered: Vec<&Chunk> = source.chunks.iter().collect();
    ordered.sort_by_key(|chunk| chunk.key);

    let total: usize = ordered.iter().map(|chunk| chunk.len()).sum();
    let mut data = Vec::with_capacity(total);
    for chunk in &ordered {
        data.extend_from_slice(&chunk.data);
    }

    tracing::debug!(
        chunks = ordered.len(),
        bytes = total,
        origin = ?source.origin,
        "artifact reconstructed"
    );

    PlayableArtifact {
        id: Uuid::new_v4(),
        mime_type: mime_type.to_string(),
        data: data.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChunkKey;
    use tempfile::tempdir;

    fn chunk(ts: u64, seq: u32, data: Vec<u8>) -> Chunk {
        Chunk::new(ChunkKey::new(ts, seq), data)
    }

    #[test]
    fn test_reconstruction_is_deterministic() {
        let source = ChunkSource {
            origin: ChunkOrigin::MemoryBuffer,
            chunks: vec![
                chunk(1_000, 0, vec![1; 500]),
                chunk(2_000, 0, vec![2; 700]),
                chunk(3_000, 0, vec![3; 300]),
            ],
        };

        let first = reconstruct(&source, "video/mp4");
        let second = reconstruct(&source, "video/mp4");

        assert_eq!(first.len(), 1_500);
        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn test_reconstruction_orders_by_key() {
        let source = ChunkSource {
            origin: ChunkOrigin::MemoryBuffer,
            chunks: vec![
                chunk(2_000, 0, vec![2]),
                chunk(1_000, 1, vec![1]),
                chunk(1_000, 0, vec![0]),
            ],
        };

        let artifact = reconstruct(&source, "video/mp4");
        assert_eq!(artifact.data(), &[0, 1, 2]);
    }

    #[tokio::test]
    async fn test_resolution_prefers_nonempty_durable_store() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), "recording-db", 1).unwrap();
        store.put(&chunk(1, 0, vec![9])).await.unwrap();

        let fallback = vec![chunk(1, 0, vec![1])];
        let source = resolve_chunk_source(Some(&store), &fallback);

        assert_eq!(source.origin, ChunkOrigin::DurableStore);
        assert_eq!(source.chunks[0].data, vec![9]);
    }

    #[tokio::test]
    async fn test_resolution_falls_back_when_store_is_empty() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), "recording-db", 1).unwrap();

        let fallback = vec![chunk(1, 0, vec![1])];
        let source = resolve_chunk_source(Some(&store), &fallback);

        assert_eq!(source.origin, ChunkOrigin::MemoryBuffer);
        assert_eq!(source.chunks.len(), 1);
    }

    #[test]
    fn test_resolution_falls_back_without_a_store() {
        let fallback = vec![chunk(1, 0, vec![1, 2, 3])];
        let source = resolve_chunk_source(None, &fallback);

        assert_eq!(source.origin, ChunkOrigin::MemoryBuffer);

        let artifact = reconstruct(&source, "video/webm;codecs=vp9,opus");
        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.mime_type(), "video/webm;codecs=vp9,opus");
    }
}
