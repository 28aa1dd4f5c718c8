//! Error types for tag classification.

use std::fmt;

/// Result type for tag classification.
pub type TagResult<T> = Result<T, TagError>;

/// Errors raised while classifying a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
    /// The byte is reserved and carries no meaning in this revision.
    ///
    /// Covers the unassigned range `0xAE..=0xBF` and the float16 tag
    /// `0xA1`, which has a slot in the table but no defined payload.
    Reserved {
        /// The offending tag byte.
        tag: u8,
    },
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved { tag } => write!(f, "reserved tag byte 0x{tag:02X}"),
        }
    }
}

impl std::error::Error for TagError {}
