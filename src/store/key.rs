//! Chunk ordering keys
//!
//! Chunks are ordered by capture time, but wall-clock time alone cannot key
//! them: two emissions can land in the same millisecond, and the clock may
//! step backwards. The key is therefore a (timestamp, sequence) pair, and
//! [`KeyAllocator`] guarantees strict monotonicity per session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte length of an encoded [`ChunkKey`].
pub const ENCODED_KEY_LEN: usize = 12;

/// Composite ordering key for one chunk: capture timestamp plus a
/// tie-breaking sequence counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkKey {
    /// Wall-clock capture time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,

    /// Disambiguates chunks captured within the same millisecond
    pub sequence: u32,
}

impl ChunkKey {
    /// Create a key from its components
    pub fn new(timestamp_ms: u64, sequence: u32) -> Self {
        Self {
            timestamp_ms,
            sequence,
        }
    }

    /// Encode as 12 big-endian bytes, so byte-wise order equals key order
    pub fn encode(&self) -> [u8; ENCODED_KEY_LEN] {
        let mut bytes = [0u8; ENCODED_KEY_LEN];
        bytes[..8].copy_from_slice(&self.timestamp_ms.to_be_bytes());
        bytes[8..].copy_from_slice(&self.sequence.to_be_bytes());
        bytes
    }

    /// Decode a key previously produced by [`encode`](Self::encode)
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ENCODED_KEY_LEN {
            return None;
        }
        let timestamp_ms = u64::from_be_bytes(bytes[..8].try_into().ok()?);
        let sequence = u32::from_be_bytes(bytes[8..].try_into().ok()?);
        Some(Self {
            timestamp_ms,
            sequence,
        })
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.timestamp_ms, self.sequence)
    }
}

/// Issues strictly increasing chunk keys for one capture session.
///
/// If the observed clock has not advanced past the last issued key's
/// timestamp (same tick, or a backwards step), the timestamp is held and the
/// sequence incremented instead.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    last: Option<ChunkKey>,
}

impl KeyAllocator {
    /// Create an allocator that has issued no keys yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key for an emission observed at `now_ms`
    pub fn next(&mut self, now_ms: u64) -> ChunkKey {
        let key = match self.last {
            Some(last) if now_ms <= last.timestamp_ms => {
                ChunkKey::new(last.timestamp_ms, last.sequence + 1)
            }
            _ => ChunkKey::new(now_ms, 0),
        };
        self.last = Some(key);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_increase_under_frozen_clock() {
        let mut alloc = KeyAllocator::new();
        let a = alloc.next(1_000);
        let b = alloc.next(1_000);
        let c = alloc.next(1_000);

        assert!(a < b && b < c);
        assert_eq!(b, ChunkKey::new(1_000, 1));
        assert_eq!(c, ChunkKey::new(1_000, 2));
    }

    #[test]
    fn test_keys_increase_when_clock_steps_backwards() {
        let mut alloc = KeyAllocator::new();
        let a = alloc.next(5_000);
        let b = alloc.next(4_000);

        assert!(a < b);
        assert_eq!(b.timestamp_ms, 5_000);
    }

    #[test]
    fn test_advancing_clock_resets_sequence() {
        let mut alloc = KeyAllocator::new();
        alloc.next(1_000);
        alloc.next(1_000);
        let key = alloc.next(2_000);

        assert_eq!(key, ChunkKey::new(2_000, 0));
    }

    #[test]
    fn test_encoded_order_matches_key_order() {
        let keys = [
            ChunkKey::new(1, 2),
            ChunkKey::new(2, 0),
            ChunkKey::new(2, 1),
            ChunkKey::new(u32::MAX as u64 + 1, 0),
        ];

        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].encode() < pair[1].encode());
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(ChunkKey::decode(&[0u8; 4]).is_none());

        let key = ChunkKey::new(1_234, 7);
        assert_eq!(ChunkKey::decode(&key.encode()), Some(key));
    }
}
