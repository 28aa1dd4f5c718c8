//! The tag byte table — the single source of truth for the wire format.
//!
//! Every encoded value starts with one tag byte. The byte partitions into
//! four disjoint ranges:
//!
//! | Byte            | Meaning                                               |
//! |-----------------|-------------------------------------------------------|
//! | `0x00..=0x3F`   | inline non-negative integer, value = tag              |
//! | `0x40..=0x7F`   | inline negative integer, value = −(tag & 0x3F)        |
//! | `0x80..=0x9F`   | extended type: `0b100_tttww` (type id, width code)    |
//! | `0xA0..=0xAD`   | one-byte singletons (see constants below)             |
//! | `0xAE..=0xBF`   | reserved, rejected                                    |
//! | `0xC0..=0xDF`   | inline string, length = tag & 0x1F                    |
//! | `0xE0..=0xEF`   | inline array, length = tag & 0x0F                     |
//! | `0xF0..=0xFF`   | inline map, length = tag & 0x0F                       |
//!
//! Multi-byte payloads following a tag are always little-endian.

use crate::error::{TagError, TagResult};
use crate::width::Width;

/// Largest integer magnitude representable inline in the tag byte.
pub const FIXINT_MAX: u8 = 0x3F;

/// Base byte of the extended-type range.
pub const EXT_BASE: u8 = 0x80;

/// NaN singleton.
pub const TAG_NAN: u8 = 0xA0;
/// Reserved float16 slot. Present in the table, never emitted, always
/// rejected on decode.
pub const TAG_F16: u8 = 0xA1;
/// float32 marker; a 4-byte payload follows.
pub const TAG_F32: u8 = 0xA2;
/// float64 marker; an 8-byte payload follows.
pub const TAG_F64: u8 = 0xA3;
/// Negative infinity singleton.
pub const TAG_NINF: u8 = 0xA4;
/// Positive infinity singleton.
pub const TAG_PINF: u8 = 0xA5;
/// Boolean true singleton.
pub const TAG_TRUE: u8 = 0xA6;
/// Boolean false singleton.
pub const TAG_FALSE: u8 = 0xA7;
/// Nil singleton.
pub const TAG_NIL: u8 = 0xA8;
/// Non-consecutive array index marker; an encoded unsigned integer follows.
pub const TAG_IDX: u8 = 0xA9;
/// End-of-stream sentinel terminating streaming aggregates.
pub const TAG_EOS: u8 = 0xAA;
/// Streaming array opener.
pub const TAG_SARR: u8 = 0xAB;
/// Streaming map opener.
pub const TAG_SMAP: u8 = 0xAC;
/// Streaming set opener.
pub const TAG_SSET: u8 = 0xAD;

/// Base byte of the inline string range.
pub const FIXSTR_BASE: u8 = 0xC0;
/// Largest inline string length.
pub const FIXSTR_MAX: usize = 0x1F;
/// Base byte of the inline array range.
pub const FIXARR_BASE: u8 = 0xE0;
/// Largest inline array length.
pub const FIXARR_MAX: usize = 0x0F;
/// Base byte of the inline map range.
pub const FIXMAP_BASE: u8 = 0xF0;
/// Largest inline map length.
pub const FIXMAP_MAX: usize = 0x0F;

/// Type id of an extended tag, carried in bits 4..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExtKind {
    /// Unsigned integer payload.
    Uint = 0,
    /// Signed integer payload.
    Int = 1,
    /// Raw byte string: length payload, then that many bytes.
    Raw = 2,
    /// String: length payload, then that many bytes.
    Str = 3,
    /// Back-reference: byte offset of a previously encoded aggregate.
    Ref = 4,
    /// Array: element count payload.
    Arr = 5,
    /// Map: pair count payload.
    Map = 6,
    /// Set: element count payload.
    Set = 7,
}

impl ExtKind {
    /// Returns the 3-bit type id.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a 3-bit type id. Only the low three bits are examined.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => Self::Uint,
            1 => Self::Int,
            2 => Self::Raw,
            3 => Self::Str,
            4 => Self::Ref,
            5 => Self::Arr,
            6 => Self::Map,
            _ => Self::Set,
        }
    }
}

/// Builds the tag byte for an extended type at the given width.
#[must_use]
pub const fn ext_tag(kind: ExtKind, width: Width) -> u8 {
    EXT_BASE | (kind.code() << 2) | width.code()
}

/// A classified tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Inline integer `0..=63`.
    PosFixInt(u8),
    /// Inline integer `-63..=0`.
    NegFixInt(i8),
    /// Extended type; a payload of `width.bytes()` bytes follows.
    Ext {
        /// Type id.
        kind: ExtKind,
        /// Payload width.
        width: Width,
    },
    /// NaN.
    Nan,
    /// float32 marker.
    F32,
    /// float64 marker.
    F64,
    /// Negative infinity.
    NegInf,
    /// Positive infinity.
    PosInf,
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// Nil.
    Nil,
    /// Non-consecutive array index marker.
    Index,
    /// End-of-stream sentinel.
    Eos,
    /// Streaming array opener.
    StreamArr,
    /// Streaming map opener.
    StreamMap,
    /// Streaming set opener.
    StreamSet,
    /// Inline string of the given length.
    FixStr(u8),
    /// Inline array of the given length.
    FixArr(u8),
    /// Inline map of the given length.
    FixMap(u8),
}

impl Tag {
    /// Classifies a tag byte, rejecting reserved bytes.
    pub const fn classify(byte: u8) -> TagResult<Self> {
        #[allow(clippy::cast_possible_wrap)]
        let tag = match byte {
            0x00..=0x3F => Self::PosFixInt(byte),
            0x40..=0x7F => Self::NegFixInt(-((byte & 0x3F) as i8)),
            0x80..=0x9F => Self::Ext {
                kind: ExtKind::from_code(byte >> 2),
                width: Width::from_code(byte),
            },
            TAG_NAN => Self::Nan,
            TAG_F32 => Self::F32,
            TAG_F64 => Self::F64,
            TAG_NINF => Self::NegInf,
            TAG_PINF => Self::PosInf,
            TAG_TRUE => Self::True,
            TAG_FALSE => Self::False,
            TAG_NIL => Self::Nil,
            TAG_IDX => Self::Index,
            TAG_EOS => Self::Eos,
            TAG_SARR => Self::StreamArr,
            TAG_SMAP => Self::StreamMap,
            TAG_SSET => Self::StreamSet,
            TAG_F16 | 0xAE..=0xBF => return Err(TagError::Reserved { tag: byte }),
            0xC0..=0xDF => Self::FixStr(byte & 0x1F),
            0xE0..=0xEF => Self::FixArr(byte & 0x0F),
            0xF0..=0xFF => Self::FixMap(byte & 0x0F),
        };
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_inline_positive() {
        assert_eq!(Tag::classify(0x00), Ok(Tag::PosFixInt(0)));
        assert_eq!(Tag::classify(0x3F), Ok(Tag::PosFixInt(63)));
    }

    #[test]
    fn classify_inline_negative() {
        assert_eq!(Tag::classify(0x40), Ok(Tag::NegFixInt(0)));
        assert_eq!(Tag::classify(0x41), Ok(Tag::NegFixInt(-1)));
        assert_eq!(Tag::classify(0x7F), Ok(Tag::NegFixInt(-63)));
    }

    #[test]
    fn classify_extended() {
        assert_eq!(
            Tag::classify(0x80),
            Ok(Tag::Ext {
                kind: ExtKind::Uint,
                width: Width::W8
            })
        );
        assert_eq!(
            Tag::classify(0x9F),
            Ok(Tag::Ext {
                kind: ExtKind::Set,
                width: Width::W64
            })
        );
        assert_eq!(
            Tag::classify(ext_tag(ExtKind::Str, Width::W32)),
            Ok(Tag::Ext {
                kind: ExtKind::Str,
                width: Width::W32
            })
        );
    }

    #[test]
    fn classify_singletons() {
        assert_eq!(Tag::classify(TAG_NAN), Ok(Tag::Nan));
        assert_eq!(Tag::classify(TAG_F32), Ok(Tag::F32));
        assert_eq!(Tag::classify(TAG_F64), Ok(Tag::F64));
        assert_eq!(Tag::classify(TAG_NINF), Ok(Tag::NegInf));
        assert_eq!(Tag::classify(TAG_PINF), Ok(Tag::PosInf));
        assert_eq!(Tag::classify(TAG_TRUE), Ok(Tag::True));
        assert_eq!(Tag::classify(TAG_FALSE), Ok(Tag::False));
        assert_eq!(Tag::classify(TAG_NIL), Ok(Tag::Nil));
        assert_eq!(Tag::classify(TAG_IDX), Ok(Tag::Index));
        assert_eq!(Tag::classify(TAG_EOS), Ok(Tag::Eos));
        assert_eq!(Tag::classify(TAG_SARR), Ok(Tag::StreamArr));
        assert_eq!(Tag::classify(TAG_SMAP), Ok(Tag::StreamMap));
        assert_eq!(Tag::classify(TAG_SSET), Ok(Tag::StreamSet));
    }

    #[test]
    fn classify_rejects_reserved() {
        assert_eq!(
            Tag::classify(TAG_F16),
            Err(TagError::Reserved { tag: 0xA1 })
        );
        for byte in 0xAE..=0xBF {
            assert_eq!(Tag::classify(byte), Err(TagError::Reserved { tag: byte }));
        }
    }

    #[test]
    fn classify_inline_aggregates() {
        assert_eq!(Tag::classify(0xC0), Ok(Tag::FixStr(0)));
        assert_eq!(Tag::classify(0xDF), Ok(Tag::FixStr(31)));
        assert_eq!(Tag::classify(0xE0), Ok(Tag::FixArr(0)));
        assert_eq!(Tag::classify(0xEF), Ok(Tag::FixArr(15)));
        assert_eq!(Tag::classify(0xF0), Ok(Tag::FixMap(0)));
        assert_eq!(Tag::classify(0xFF), Ok(Tag::FixMap(15)));
    }

    #[test]
    fn every_byte_classifies_or_is_reserved() {
        let mut reserved = 0;
        for byte in 0..=0xFFu8 {
            match Tag::classify(byte) {
                Ok(_) => {}
                Err(TagError::Reserved { tag }) => {
                    assert_eq!(tag, byte);
                    reserved += 1;
                }
            }
        }
        // 0xA1 plus 0xAE..=0xBF
        assert_eq!(reserved, 1 + 18);
    }

    #[test]
    fn ext_tag_layout() {
        assert_eq!(ext_tag(ExtKind::Uint, Width::W8), 0x80);
        assert_eq!(ext_tag(ExtKind::Int, Width::W64), 0x87);
        assert_eq!(ext_tag(ExtKind::Ref, Width::W16), 0x91);
        assert_eq!(ext_tag(ExtKind::Map, Width::W64), 0x9B);
        assert_eq!(ext_tag(ExtKind::Set, Width::W64), 0x9F);
    }

    #[test]
    fn ext_kind_code_roundtrip() {
        for kind in [
            ExtKind::Uint,
            ExtKind::Int,
            ExtKind::Raw,
            ExtKind::Str,
            ExtKind::Ref,
            ExtKind::Arr,
            ExtKind::Map,
            ExtKind::Set,
        ] {
            assert_eq!(ExtKind::from_code(kind.code()), kind);
        }
    }
}
