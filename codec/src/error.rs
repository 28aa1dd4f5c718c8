//! Error types for pack and unpack operations.

use std::fmt;
use std::io;

use crate::value::ValueKind;
use buf::BufError;
use wire::TagError;

/// Result type for pack operations.
pub type PackResult<T> = Result<T, PackError>;

/// Result type for unpack operations.
pub type UnpackResult<T> = Result<T, UnpackError>;

/// Errors that can occur while encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PackError {
    /// Buffer growth failed or would exceed the block-count ceiling.
    OutOfMemory {
        /// Bytes the encoder asked to reserve.
        needed: usize,
        /// Capacity at the time of the failure.
        capacity: usize,
    },

    /// The streaming flush callback reported failure.
    Io {
        /// The I/O error kind the callback returned.
        kind: io::ErrorKind,
    },

    /// A back-patch handle no longer points at the container tag it was
    /// issued for.
    InvalidHandle {
        /// Offset the handle refers to.
        offset: usize,
    },

    /// A back-reference target does not lie before the current position.
    InvalidRef {
        /// Requested target offset.
        offset: u64,
        /// Current encode position.
        position: usize,
    },

    /// A map key of a kind the wire format does not allow for keys.
    InvalidMapKey {
        /// Kind of the offending key value.
        kind: ValueKind,
    },

    /// The operation requires an owned buffer and is not available on a
    /// streaming context.
    StreamingUnsupported,
}

impl From<BufError> for PackError {
    fn from(err: BufError) -> Self {
        match err {
            BufError::OutOfMemory { needed, capacity } => Self::OutOfMemory { needed, capacity },
            BufError::FlushFailed { kind } => Self::Io { kind },
            BufError::OutOfBounds { offset, .. } => Self::InvalidHandle { offset },
        }
    }
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { needed, capacity } => {
                write!(
                    f,
                    "cannot reserve {needed} more bytes at capacity {capacity}"
                )
            }
            Self::Io { kind } => write!(f, "flush callback failed: {kind}"),
            Self::InvalidHandle { offset } => {
                write!(f, "stale back-patch handle at offset {offset}")
            }
            Self::InvalidRef { offset, position } => {
                write!(
                    f,
                    "back-reference target {offset} does not precede position {position}"
                )
            }
            Self::InvalidMapKey { kind } => {
                write!(f, "{kind} cannot be used as a map key")
            }
            Self::StreamingUnsupported => {
                write!(f, "fixed-length containers are not supported on a streaming context")
            }
        }
    }
}

impl std::error::Error for PackError {}

/// The syntactic position a decoded value was required to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Explicit array index after an index marker.
    Index,
    /// Map key.
    Key,
    /// Array or set element.
    Element,
    /// Any standalone value.
    Value,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Index => "array index",
            Self::Key => "map key",
            Self::Element => "element",
            Self::Value => "value",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur while decoding.
///
/// A clean end of input at a tag boundary is not an error; `next` reports
/// it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnpackError {
    /// The tag byte is reserved or its attribute bits are inconsistent
    /// with its kind.
    IllegalTag {
        /// The offending tag byte.
        tag: u8,
    },

    /// A value of the wrong kind appeared where a specific role was
    /// required.
    RoleMismatch {
        /// The role that was being decoded.
        role: Role,
        /// Tag byte of the value actually found.
        tag: u8,
    },

    /// A tag declared more payload bytes than remain in the input.
    Truncated {
        /// Bytes the tag requires.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Input ended cleanly where a value was still required.
    UnexpectedEnd,

    /// A back-reference points at or past the tag that contains it.
    RefOutOfRange {
        /// Target offset carried by the reference.
        offset: u64,
        /// First offset the reference may not reach.
        limit: usize,
    },

    /// An explicit array index exceeds the fill limit.
    IndexOutOfRange {
        /// The decoded index.
        index: u64,
        /// Configured fill limit.
        limit: usize,
    },

    /// Container nesting exceeded the configured depth limit.
    DepthLimitExceeded {
        /// Configured depth limit.
        limit: usize,
    },

    /// Decoding produced more values than the configured node limit.
    NodeLimitExceeded {
        /// Configured node limit.
        limit: usize,
    },
}

impl From<TagError> for UnpackError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Reserved { tag } => Self::IllegalTag { tag },
        }
    }
}

impl fmt::Display for UnpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalTag { tag } => write!(f, "illegal tag byte 0x{tag:02X}"),
            Self::RoleMismatch { role, tag } => {
                write!(f, "tag 0x{tag:02X} cannot fill a {role} position")
            }
            Self::Truncated { needed, available } => {
                write!(
                    f,
                    "truncated input: tag declares {needed} payload bytes, {available} remain"
                )
            }
            Self::UnexpectedEnd => write!(f, "input ended inside a container"),
            Self::RefOutOfRange { offset, limit } => {
                write!(
                    f,
                    "back-reference target {offset} must lie before offset {limit}"
                )
            }
            Self::IndexOutOfRange { index, limit } => {
                write!(f, "explicit array index {index} exceeds fill limit {limit}")
            }
            Self::DepthLimitExceeded { limit } => {
                write!(f, "container nesting exceeds depth limit {limit}")
            }
            Self::NodeLimitExceeded { limit } => {
                write!(f, "decoded value count exceeds node limit {limit}")
            }
        }
    }
}

impl std::error::Error for UnpackError {}
