//! Pull-style decoder over a byte slice.

use wire::{ExtKind, Tag, Width};

use crate::error::{Role, UnpackError, UnpackResult};

/// One decoded item, borrowing payload bytes from the input.
///
/// This is the raw decode surface: containers come out as their headers
/// (`Arr { len }`, `StreamMap`, ...) and the caller drives the element
/// loop. [`unpack_value`](crate::unpack_value) builds trees on top of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extract<'a> {
    /// Nil.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer (from an inline negative or signed-payload tag).
    Int(i64),
    /// Unsigned integer (from an inline positive or unsigned-payload tag).
    Uint(u64),
    /// NaN.
    Nan,
    /// Negative infinity.
    NegInf,
    /// Positive infinity.
    PosInf,
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Byte string payload.
    Str(&'a [u8]),
    /// Raw bytes payload.
    Raw(&'a [u8]),
    /// Fixed-length array header; `len` elements follow.
    Arr {
        /// Declared element count.
        len: u64,
    },
    /// Fixed-length map header; `len` key/value pairs follow.
    Map {
        /// Declared pair count.
        len: u64,
    },
    /// Fixed-length set header; `len` elements follow.
    Set {
        /// Declared element count.
        len: u64,
    },
    /// Streaming array opener; elements follow until [`Extract::Eos`].
    StreamArr,
    /// Streaming map opener; pairs follow until [`Extract::Eos`].
    StreamMap,
    /// Streaming set opener; elements follow until [`Extract::Eos`].
    StreamSet,
    /// Explicit array index marker; the index integer follows.
    Index,
    /// End-of-stream sentinel.
    Eos,
    /// Back-reference to the aggregate encoded at `offset`.
    Ref {
        /// Absolute byte offset of the target's tag.
        offset: u64,
    },
}

/// A map key: the subset of [`Extract`] the wire format allows in key
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExtract<'a> {
    /// Unsigned integer key.
    Uint(u64),
    /// Signed integer key.
    Int(i64),
    /// Byte string key.
    Str(&'a [u8]),
}

/// The decoder: a cursor over an encoded byte slice.
///
/// [`next`](Self::next) pulls one item at a time and reports a clean end of
/// input as `Ok(None)`. Borrowed payloads (`Str`, `Raw`) point into the
/// input slice; nothing is copied.
///
/// # Example
///
/// ```
/// use codec::{Extract, Unpacker};
///
/// let mut u = Unpacker::new(&[0xE1, 0x05]);
/// assert_eq!(u.next().unwrap(), Some(Extract::Arr { len: 1 }));
/// assert_eq!(u.next().unwrap(), Some(Extract::Uint(5)));
/// assert_eq!(u.next().unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacker<'a> {
    data: &'a [u8],
    cur: usize,
}

impl<'a> Unpacker<'a> {
    /// Creates a decoder over `data`, positioned at its first byte.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, cur: 0 }
    }

    /// Returns the byte offset of the next unread tag.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cur
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.cur
    }

    /// Returns `true` if the input is exhausted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cur >= self.data.len()
    }

    /// Creates a decoder positioned at `offset` in the same input, for
    /// following a back-reference. The offset must lie inside the input.
    pub fn sub_decoder(&self, offset: u64) -> UnpackResult<Self> {
        if offset >= self.data.len() as u64 {
            return Err(UnpackError::RefOutOfRange {
                offset,
                limit: self.data.len(),
            });
        }
        Ok(Self {
            data: self.data,
            cur: offset as usize,
        })
    }

    fn take(&mut self, n: usize) -> UnpackResult<&'a [u8]> {
        let available = self.data.len() - self.cur;
        if n > available {
            return Err(UnpackError::Truncated {
                needed: n,
                available,
            });
        }
        let slice = &self.data[self.cur..self.cur + n];
        self.cur += n;
        Ok(slice)
    }

    fn take_uint(&mut self, width: Width) -> UnpackResult<u64> {
        let bytes = self.take(width.bytes())?;
        let mut le = [0u8; 8];
        le[..bytes.len()].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(le))
    }

    fn take_int(&mut self, width: Width) -> UnpackResult<i64> {
        let bytes = self.take(width.bytes())?;
        Ok(match width {
            Width::W8 => i64::from(bytes[0] as i8),
            Width::W16 => i64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            Width::W32 => i64::from(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            Width::W64 => {
                let mut le = [0u8; 8];
                le.copy_from_slice(bytes);
                i64::from_le_bytes(le)
            }
        })
    }

    /// Reads a `width`-byte length field and then that many payload bytes.
    fn take_len_prefixed(&mut self, width: Width) -> UnpackResult<&'a [u8]> {
        let len = self.take_uint(width)?;
        let available = self.data.len() - self.cur;
        if len > available as u64 {
            return Err(UnpackError::Truncated {
                needed: len as usize,
                available,
            });
        }
        self.take(len as usize)
    }

    /// Decodes the next item, or `Ok(None)` at a clean end of input.
    ///
    /// Hitting the end of input mid-payload is [`UnpackError::Truncated`];
    /// only a boundary between items counts as a clean end.
    pub fn next(&mut self) -> UnpackResult<Option<Extract<'a>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let byte = self.data[self.cur];
        let tag = Tag::classify(byte)?;
        self.cur += 1;

        let item = match tag {
            Tag::PosFixInt(v) => Extract::Uint(u64::from(v)),
            Tag::NegFixInt(v) => Extract::Int(i64::from(v)),
            Tag::Ext { kind, width } => match kind {
                ExtKind::Uint => Extract::Uint(self.take_uint(width)?),
                ExtKind::Int => Extract::Int(self.take_int(width)?),
                ExtKind::Raw => Extract::Raw(self.take_len_prefixed(width)?),
                ExtKind::Str => Extract::Str(self.take_len_prefixed(width)?),
                ExtKind::Ref => Extract::Ref {
                    offset: self.take_uint(width)?,
                },
                ExtKind::Arr => Extract::Arr {
                    len: self.take_uint(width)?,
                },
                ExtKind::Map => Extract::Map {
                    len: self.take_uint(width)?,
                },
                ExtKind::Set => Extract::Set {
                    len: self.take_uint(width)?,
                },
            },
            Tag::Nan => Extract::Nan,
            Tag::F32 => {
                let bytes = self.take(4)?;
                Extract::F32(f32::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ]))
            }
            Tag::F64 => {
                let bytes = self.take(8)?;
                let mut le = [0u8; 8];
                le.copy_from_slice(bytes);
                Extract::F64(f64::from_le_bytes(le))
            }
            Tag::NegInf => Extract::NegInf,
            Tag::PosInf => Extract::PosInf,
            Tag::True => Extract::Bool(true),
            Tag::False => Extract::Bool(false),
            Tag::Nil => Extract::Nil,
            Tag::Index => Extract::Index,
            Tag::Eos => Extract::Eos,
            Tag::StreamArr => Extract::StreamArr,
            Tag::StreamMap => Extract::StreamMap,
            Tag::StreamSet => Extract::StreamSet,
            Tag::FixStr(len) => Extract::Str(self.take(usize::from(len))?),
            Tag::FixArr(len) => Extract::Arr {
                len: u64::from(len),
            },
            Tag::FixMap(len) => Extract::Map {
                len: u64::from(len),
            },
        };
        Ok(Some(item))
    }

    /// Reads the non-negative integer that follows an index marker.
    pub fn read_index(&mut self) -> UnpackResult<u64> {
        let tag_byte = self.peek_tag()?;
        match self.next()? {
            Some(Extract::Uint(v)) => Ok(v),
            Some(Extract::Int(v)) if v >= 0 => Ok(v.unsigned_abs()),
            Some(_) => Err(UnpackError::RoleMismatch {
                role: Role::Index,
                tag: tag_byte,
            }),
            None => Err(UnpackError::UnexpectedEnd),
        }
    }

    /// Reads a map key: an integer or a string. With `allow_eos`, an
    /// end-of-stream sentinel terminates the map and yields `Ok(None)`.
    pub fn read_key(&mut self, allow_eos: bool) -> UnpackResult<Option<KeyExtract<'a>>> {
        let tag_byte = self.peek_tag()?;
        match self.next()? {
            Some(Extract::Eos) if allow_eos => Ok(None),
            Some(Extract::Uint(v)) => Ok(Some(KeyExtract::Uint(v))),
            Some(Extract::Int(v)) => Ok(Some(KeyExtract::Int(v))),
            Some(Extract::Str(bytes)) => Ok(Some(KeyExtract::Str(bytes))),
            Some(_) => Err(UnpackError::RoleMismatch {
                role: Role::Key,
                tag: tag_byte,
            }),
            None => Err(UnpackError::UnexpectedEnd),
        }
    }

    /// Reads an array or set element: any value, never an index marker.
    /// With `allow_eos`, an end-of-stream sentinel yields `Ok(None)`.
    pub fn read_element(&mut self, allow_eos: bool) -> UnpackResult<Option<Extract<'a>>> {
        let tag_byte = self.peek_tag()?;
        match self.next()? {
            Some(Extract::Eos) if allow_eos => Ok(None),
            Some(Extract::Eos) | Some(Extract::Index) => Err(UnpackError::RoleMismatch {
                role: Role::Element,
                tag: tag_byte,
            }),
            Some(item) => Ok(Some(item)),
            None => Err(UnpackError::UnexpectedEnd),
        }
    }

    fn peek_tag(&self) -> UnpackResult<u8> {
        self.data
            .get(self.cur)
            .copied()
            .ok_or(UnpackError::UnexpectedEnd)
    }
}
