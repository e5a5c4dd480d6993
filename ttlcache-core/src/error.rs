//! Error types for cache operations.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by fallible cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// `add` found a live entry under the key
    #[error("Item {0} already exists")]
    DuplicateKey(String),

    /// `replace` found no live entry under the key
    #[error("Item {0} doesn't exist")]
    MissingKey(String),

    /// Snapshot encoding failed (serializer rejected a value or the writer failed)
    #[error("Encoding error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Snapshot decoding failed; the cache was left unmodified
    #[error("Decoding error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// File or thread I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sweeper cannot tick on a zero period
    #[error("Invalid sweep interval: {0:?}")]
    InvalidSweepInterval(Duration),
}

impl CacheError {
    /// Returns `true` if `add` was rejected because the key is live.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, CacheError::DuplicateKey(_))
    }

    /// Returns `true` if `replace` was rejected because the key is absent.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, CacheError::MissingKey(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
