//! Error taxonomy for the B-Tree index engine.

use std::fmt;

/// Errors produced by the B-Tree engine and index handle.
///
/// These are kinds, not wrapped source errors — the engine never needs to
/// preserve a lower-level cause beyond what each variant already names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BTreeError {
    /// A seek, short read, short write, or file-open call failed.
    Io(String),
    /// Opened a file whose block 0 does not start with the expected magic.
    BadMagic,
    /// An operation requiring an open index was called on a closed handle.
    NotOpen,
    /// Insert called with a key that is already present.
    DuplicateKey,
    /// Search called for a key that is not present.
    NotFound,
    /// A line in a bulk-load text file could not be parsed as `key,value`.
    Parse(String),
    /// Node allocation failed (block id space or memory exhausted).
    Alloc,
}

impl fmt::Display for BTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BTreeError::Io(msg) => write!(f, "I/O error: {msg}"),
            BTreeError::BadMagic => write!(f, "file does not start with the B-Tree magic number"),
            BTreeError::NotOpen => write!(f, "no index file is currently open"),
            BTreeError::DuplicateKey => write!(f, "key already exists"),
            BTreeError::NotFound => write!(f, "key not found"),
            BTreeError::Parse(msg) => write!(f, "parse error: {msg}"),
            BTreeError::Alloc => write!(f, "node allocation failed"),
        }
    }
}

impl std::error::Error for BTreeError {}

impl From<std::io::Error> for BTreeError {
    fn from(e: std::io::Error) -> Self {
        BTreeError::Io(e.to_string())
    }
}

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, BTreeError>;
