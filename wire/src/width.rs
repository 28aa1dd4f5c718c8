//! Payload width selection for extended tags.

/// Payload width of an extended tag, carried in its two low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Width {
    /// 1-byte payload.
    W8 = 0,
    /// 2-byte payload.
    W16 = 1,
    /// 4-byte payload.
    W32 = 2,
    /// 8-byte payload.
    W64 = 3,
}

impl Width {
    /// Returns the 2-bit width code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a 2-bit width code. Only the low two bits are examined, so
    /// every tag byte yields a valid width.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::W8,
            1 => Self::W16,
            2 => Self::W32,
            _ => Self::W64,
        }
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }

    /// Smallest width whose unsigned range contains `value`. Used for
    /// integer payloads, lengths, back-reference offsets, and explicit
    /// indexes alike.
    #[must_use]
    pub const fn for_uint(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            Self::W8
        } else if value <= u16::MAX as u64 {
            Self::W16
        } else if value <= u32::MAX as u64 {
            Self::W32
        } else {
            Self::W64
        }
    }

    /// Smallest width whose signed range contains `value`.
    #[must_use]
    pub const fn for_int(value: i64) -> Self {
        if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
            Self::W8
        } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
            Self::W16
        } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            Self::W32
        } else {
            Self::W64
        }
    }
}
