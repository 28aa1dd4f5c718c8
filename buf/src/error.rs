//! Error types for buffer operations.

use std::fmt;
use std::io;

/// Result type for buffer operations.
pub type BufResult<T> = Result<T, BufError>;

/// Errors that can occur while writing into a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufError {
    /// Growing the buffer failed, either because the required block count
    /// would exceed the ceiling or because the allocator refused.
    OutOfMemory {
        /// Number of bytes the caller asked to reserve.
        needed: usize,
        /// Capacity the buffer had when the request failed.
        capacity: usize,
    },

    /// An in-place overwrite addressed bytes that were never written.
    OutOfBounds {
        /// Start offset of the overwrite.
        offset: usize,
        /// Number of bytes to overwrite.
        len: usize,
        /// Number of bytes written so far.
        written: usize,
    },

    /// The flush callback of a streaming buffer reported failure.
    FlushFailed {
        /// The I/O error kind the callback returned.
        kind: io::ErrorKind,
    },
}

impl fmt::Display for BufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { needed, capacity } => {
                write!(
                    f,
                    "cannot reserve {needed} more bytes at capacity {capacity}"
                )
            }
            Self::OutOfBounds {
                offset,
                len,
                written,
            } => {
                write!(
                    f,
                    "overwrite of {len} bytes at offset {offset} exceeds {written} written bytes"
                )
            }
            Self::FlushFailed { kind } => {
                write!(f, "flush callback failed: {kind}")
            }
        }
    }
}

impl std::error::Error for BufError {}
