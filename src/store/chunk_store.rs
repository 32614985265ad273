//! sled-backed chunk store
//!
//! Chunks live in one sled tree per schema version. The tree key is the
//! 12-byte big-endian encoding of [`ChunkKey`], so sled's iteration order is
//! already capture order; the value is the raw chunk payload.

use super::key::ChunkKey;
use super::Chunk;
use std::path::Path;
use thiserror::Error;

/// Storage-related errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("durable storage unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate chunk key: {0}")]
    DuplicateKey(ChunkKey),

    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("corrupt chunk entry: key of {0} bytes")]
    CorruptKey(usize),
}

/// Durable, ordered, keyed collection of recorded chunks.
///
/// Opened once per process lifetime and shared across sessions. A failed
/// operation after a successful open never corrupts committed entries.
pub struct ChunkStore {
    db: sled::Db,
    chunks: sled::Tree,
}

impl ChunkStore {
    /// Open (or create) the named store at `path` for the given schema
    /// version. Idempotent.
    pub fn open(path: &Path, name: &str, schema_version: u32) -> Result<Self, StorageError> {
        let db = sled::open(path.join(name))
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        let chunks = db
            .open_tree(format!("chunks-v{schema_version}"))
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;

        tracing::debug!("opened chunk store '{name}' (schema v{schema_version}) at {path:?}");

        Ok(Self { db, chunks })
    }

    /// Insert one chunk. Fails with [`StorageError::DuplicateKey`] if an
    /// entry with the same key already exists; the entry is visible to reads
    /// once this call returns.
    pub async fn put(&self, chunk: &Chunk) -> Result<(), StorageError> {
        self.chunks
            .compare_and_swap(
                chunk.key.encode(),
                None::<&[u8]>,
                Some(chunk.data.as_slice()),
            )?
            .map_err(|_| StorageError::DuplicateKey(chunk.key))?;

        self.chunks.flush_async().await?;

        tracing::trace!(key = %chunk.key, bytes = chunk.data.len(), "chunk persisted");
        Ok(())
    }

    /// Remove all entries. Reads started after this returns see an empty
    /// store.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.chunks.clear()?;
        self.chunks.flush_async().await?;

        tracing::debug!("chunk store cleared");
        Ok(())
    }

    /// All chunks, ascending by key. Each call performs a fresh scan.
    pub fn get_all(&self) -> Result<Vec<Chunk>, StorageError> {
        let mut chunks = Vec::with_capacity(self.len());
        for entry in self.chunks.iter() {
            let (key_bytes, value) = entry?;
            let key = ChunkKey::decode(&key_bytes)
                .ok_or(StorageError::CorruptKey(key_bytes.len()))?;
            chunks.push(Chunk::new(key, value.to_vec()));
        }
        Ok(chunks)
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
