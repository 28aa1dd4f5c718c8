//! Value-emission operations over an owned or streaming destination.

use std::io;

use buf::{BufResult, GrowBuf, StreamBuf};
use wire::{
    ext_tag, ExtKind, Width, FIXARR_BASE, FIXARR_MAX, FIXINT_MAX, FIXMAP_BASE, FIXMAP_MAX,
    FIXSTR_BASE, FIXSTR_MAX, TAG_EOS, TAG_F32, TAG_F64, TAG_FALSE, TAG_IDX, TAG_NAN, TAG_NIL,
    TAG_NINF, TAG_PINF, TAG_SARR, TAG_SMAP, TAG_SSET, TAG_TRUE,
};

use crate::error::{PackError, PackResult};

/// Where encoded bytes go: an owned growable buffer, or a fixed buffer
/// drained through a flush callback.
#[derive(Debug)]
enum Storage<'a> {
    Grow(GrowBuf),
    Stream(StreamBuf<'a>),
}

impl Storage<'_> {
    fn put(&mut self, bytes: &[u8]) -> BufResult<()> {
        match self {
            Self::Grow(buf) => buf.put(bytes),
            Self::Stream(buf) => buf.put(bytes),
        }
    }

    const fn position(&self) -> usize {
        match self {
            Self::Grow(buf) => buf.position(),
            Self::Stream(buf) => buf.position(),
        }
    }
}

/// Back-patch handle for a container whose length is written later.
///
/// Holds a logical byte offset, never a pointer, so buffer growth cannot
/// invalidate it. [`Packer::patch_len`] re-validates the tag at the offset
/// before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHandle {
    offset: usize,
    kind: ExtKind,
}

/// The encoder: one emission operation per value kind.
///
/// Construct with [`new`](Self::new) / [`with_block_size`](Self::with_block_size)
/// for an owned buffer, or [`streaming`](Self::streaming) to drain through a
/// flush callback. Every operation appends the tag (and payload) for exactly
/// one value.
///
/// # Example
///
/// ```
/// use codec::Packer;
///
/// let mut packer = Packer::new().unwrap();
/// packer.pack_array(2).unwrap();
/// packer.pack_int(1).unwrap();
/// packer.pack_str(b"hi").unwrap();
/// let bytes = packer.finish().unwrap();
/// assert_eq!(bytes, [0xE2, 0x01, 0xC2, b'h', b'i']);
/// ```
#[derive(Debug)]
pub struct Packer<'a> {
    dst: Storage<'a>,
}

impl<'a> Packer<'a> {
    /// Creates an owned-buffer packer with the default block size.
    pub fn new() -> PackResult<Self> {
        Ok(Self {
            dst: Storage::Grow(GrowBuf::new()?),
        })
    }

    /// Creates an owned-buffer packer with the given block size (0 selects
    /// the default).
    pub fn with_block_size(block_size: usize) -> PackResult<Self> {
        Ok(Self {
            dst: Storage::Grow(GrowBuf::with_block_size(block_size)?),
        })
    }

    /// Creates a streaming packer. Encoded bytes are handed to `flush` in
    /// blocks; any `pack_*` call may invoke it zero or more times.
    pub fn streaming<F>(block_size: usize, flush: F) -> PackResult<Self>
    where
        F: FnMut(&[u8]) -> io::Result<()> + 'a,
    {
        Ok(Self {
            dst: Storage::Stream(StreamBuf::new(block_size, flush)?),
        })
    }

    /// Returns `true` if this packer drains through a flush callback.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self.dst, Storage::Stream(_))
    }

    /// Returns the number of bytes encoded so far (flushed bytes included).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.dst.position()
    }

    fn put_tag(&mut self, tag: u8) -> PackResult<()> {
        self.dst.put(&[tag])?;
        Ok(())
    }

    /// Writes the low `width.bytes()` bytes of `value`, little-endian.
    /// Two's complement makes this correct for signed payloads as well.
    fn put_payload(&mut self, value: u64, width: Width) -> PackResult<()> {
        let bytes = value.to_le_bytes();
        self.dst.put(&bytes[..width.bytes()])?;
        Ok(())
    }

    fn put_uint_tagged(&mut self, kind: ExtKind, value: u64) -> PackResult<()> {
        let width = Width::for_uint(value);
        self.put_tag(ext_tag(kind, width))?;
        self.put_payload(value, width)
    }

    /// Encodes nil.
    pub fn pack_nil(&mut self) -> PackResult<()> {
        self.put_tag(TAG_NIL)
    }

    /// Encodes a boolean.
    pub fn pack_bool(&mut self, value: bool) -> PackResult<()> {
        self.put_tag(if value { TAG_TRUE } else { TAG_FALSE })
    }

    /// Encodes NaN.
    pub fn pack_nan(&mut self) -> PackResult<()> {
        self.put_tag(TAG_NAN)
    }

    /// Encodes positive or negative infinity.
    pub fn pack_inf(&mut self, negative: bool) -> PackResult<()> {
        self.put_tag(if negative { TAG_NINF } else { TAG_PINF })
    }

    /// Encodes a signed integer at the smallest width that represents it,
    /// inlining values in `-63..=63` into the tag byte.
    pub fn pack_int(&mut self, value: i64) -> PackResult<()> {
        let inline_max = i64::from(FIXINT_MAX);
        if (0..=inline_max).contains(&value) {
            return self.put_tag(value as u8);
        }
        if (-inline_max..0).contains(&value) {
            return self.put_tag(0x40 | value.unsigned_abs() as u8);
        }
        let width = Width::for_int(value);
        self.put_tag(ext_tag(ExtKind::Int, width))?;
        self.put_payload(value as u64, width)
    }

    /// Encodes an unsigned integer at the smallest width that represents
    /// it, inlining values up to 63 into the tag byte.
    pub fn pack_uint(&mut self, value: u64) -> PackResult<()> {
        if value <= u64::from(FIXINT_MAX) {
            return self.put_tag(value as u8);
        }
        self.put_uint_tagged(ExtKind::Uint, value)
    }

    /// Encodes a 32-bit float. NaN and the infinities reroute to their
    /// singleton tags; zero keeps its sign bit in the payload.
    pub fn pack_f32(&mut self, value: f32) -> PackResult<()> {
        if value.is_nan() {
            return self.pack_nan();
        }
        if value.is_infinite() {
            return self.pack_inf(value.is_sign_negative());
        }
        self.put_tag(TAG_F32)?;
        self.dst.put(&value.to_le_bytes())?;
        Ok(())
    }

    /// Encodes a 64-bit float. NaN and the infinities reroute to their
    /// singleton tags; zero keeps its sign bit in the payload.
    pub fn pack_f64(&mut self, value: f64) -> PackResult<()> {
        if value.is_nan() {
            return self.pack_nan();
        }
        if value.is_infinite() {
            return self.pack_inf(value.is_sign_negative());
        }
        self.put_tag(TAG_F64)?;
        self.dst.put(&value.to_le_bytes())?;
        Ok(())
    }

    /// Encodes a byte string, using the one-byte inline form for lengths
    /// up to 31.
    pub fn pack_str(&mut self, bytes: &[u8]) -> PackResult<()> {
        if bytes.len() <= FIXSTR_MAX {
            self.put_tag(FIXSTR_BASE | bytes.len() as u8)?;
        } else {
            self.put_uint_tagged(ExtKind::Str, bytes.len() as u64)?;
        }
        self.dst.put(bytes)?;
        Ok(())
    }

    /// Encodes raw bytes. Raw has no inline form; the length is always a
    /// separate smallest-width field.
    pub fn pack_raw(&mut self, bytes: &[u8]) -> PackResult<()> {
        self.put_uint_tagged(ExtKind::Raw, bytes.len() as u64)?;
        self.dst.put(bytes)?;
        Ok(())
    }

    /// Opens an array of known length, using the one-byte inline form for
    /// up to 15 elements. The `len` elements follow as individual values.
    pub fn pack_array(&mut self, len: u64) -> PackResult<()> {
        if len <= FIXARR_MAX as u64 {
            return self.put_tag(FIXARR_BASE | len as u8);
        }
        self.put_uint_tagged(ExtKind::Arr, len)
    }

    /// Opens a map of known length, using the one-byte inline form for up
    /// to 15 pairs. The `len` key/value pairs follow.
    pub fn pack_map(&mut self, len: u64) -> PackResult<()> {
        if len <= FIXMAP_MAX as u64 {
            return self.put_tag(FIXMAP_BASE | len as u8);
        }
        self.put_uint_tagged(ExtKind::Map, len)
    }

    /// Opens a set of known length. Sets have no inline form.
    pub fn pack_set(&mut self, len: u64) -> PackResult<()> {
        self.put_uint_tagged(ExtKind::Set, len)
    }

    fn begin_container(&mut self, kind: ExtKind) -> PackResult<PatchHandle> {
        if self.is_streaming() {
            return Err(PackError::StreamingUnsupported);
        }
        let offset = self.position();
        self.put_tag(ext_tag(kind, Width::W64))?;
        self.put_payload(0, Width::W64)?;
        Ok(PatchHandle { offset, kind })
    }

    /// Opens an array whose length is not yet known, reserving a 64-bit
    /// length to be filled in by [`patch_len`](Self::patch_len). Not
    /// available on streaming contexts.
    pub fn begin_array(&mut self) -> PackResult<PatchHandle> {
        self.begin_container(ExtKind::Arr)
    }

    /// Opens a map whose length is not yet known. See [`begin_array`](Self::begin_array).
    pub fn begin_map(&mut self) -> PackResult<PatchHandle> {
        self.begin_container(ExtKind::Map)
    }

    /// Opens a set whose length is not yet known. See [`begin_array`](Self::begin_array).
    pub fn begin_set(&mut self) -> PackResult<PatchHandle> {
        self.begin_container(ExtKind::Set)
    }

    /// Writes the final element count into a container opened by a
    /// `begin_*` call. The handle is validated against the bytes actually
    /// at its offset before anything is mutated.
    pub fn patch_len(&mut self, handle: PatchHandle, len: u64) -> PackResult<()> {
        let Storage::Grow(buf) = &mut self.dst else {
            return Err(PackError::StreamingUnsupported);
        };
        let expected = ext_tag(handle.kind, Width::W64);
        if buf.byte_at(handle.offset) != Some(expected) {
            return Err(PackError::InvalidHandle {
                offset: handle.offset,
            });
        }
        buf.overwrite(handle.offset + 1, &len.to_le_bytes())?;
        Ok(())
    }

    /// Opens a streaming array, terminated by [`pack_end`](Self::pack_end).
    pub fn pack_array_streaming(&mut self) -> PackResult<()> {
        self.put_tag(TAG_SARR)
    }

    /// Opens a streaming map, terminated by [`pack_end`](Self::pack_end).
    pub fn pack_map_streaming(&mut self) -> PackResult<()> {
        self.put_tag(TAG_SMAP)
    }

    /// Opens a streaming set, terminated by [`pack_end`](Self::pack_end).
    pub fn pack_set_streaming(&mut self) -> PackResult<()> {
        self.put_tag(TAG_SSET)
    }

    /// Terminates the innermost streaming aggregate.
    pub fn pack_end(&mut self) -> PackResult<()> {
        self.put_tag(TAG_EOS)
    }

    /// Marks the next array element as sitting at an explicit index rather
    /// than the running sequential position.
    pub fn pack_index(&mut self, index: u64) -> PackResult<()> {
        self.put_tag(TAG_IDX)?;
        self.pack_uint(index)
    }

    /// Encodes a back-reference to an aggregate previously written at
    /// `offset`. The target must lie strictly before the current position.
    pub fn pack_ref(&mut self, offset: u64) -> PackResult<()> {
        let position = self.position();
        if offset >= position as u64 {
            return Err(PackError::InvalidRef { offset, position });
        }
        self.put_uint_tagged(ExtKind::Ref, offset)
    }

    /// Finishes the encode. An owned-buffer packer returns its bytes; a
    /// streaming packer flushes the buffered tail and returns an empty
    /// vector, every byte having gone through the callback.
    pub fn finish(self) -> PackResult<Vec<u8>> {
        match self.dst {
            Storage::Grow(buf) => Ok(buf.into_bytes()),
            Storage::Stream(mut buf) => {
                buf.finish()?;
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(f: impl FnOnce(&mut Packer<'_>)) -> Vec<u8> {
        let mut p = Packer::new().unwrap();
        f(&mut p);
        p.finish().unwrap()
    }

    #[test]
    fn singletons() {
        assert_eq!(packed(|p| p.pack_nil().unwrap()), [TAG_NIL]);
        assert_eq!(packed(|p| p.pack_bool(true).unwrap()), [TAG_TRUE]);
        assert_eq!(packed(|p| p.pack_bool(false).unwrap()), [TAG_FALSE]);
        assert_eq!(packed(|p| p.pack_nan().unwrap()), [TAG_NAN]);
        assert_eq!(packed(|p| p.pack_inf(false).unwrap()), [TAG_PINF]);
        assert_eq!(packed(|p| p.pack_inf(true).unwrap()), [TAG_NINF]);
    }

    #[test]
    fn inline_integers() {
        assert_eq!(packed(|p| p.pack_int(0).unwrap()), [0x00]);
        assert_eq!(packed(|p| p.pack_int(63).unwrap()), [0x3F]);
        assert_eq!(packed(|p| p.pack_int(-1).unwrap()), [0x41]);
        assert_eq!(packed(|p| p.pack_int(-63).unwrap()), [0x7F]);
        assert_eq!(packed(|p| p.pack_uint(63).unwrap()), [0x3F]);
    }

    #[test]
    fn smallest_width_int_boundaries() {
        // 64 leaves the inline range: 1-byte signed payload.
        assert_eq!(
            packed(|p| p.pack_int(64).unwrap()),
            [ext_tag(ExtKind::Int, Width::W8), 64]
        );
        assert_eq!(
            packed(|p| p.pack_int(-64).unwrap()),
            [ext_tag(ExtKind::Int, Width::W8), 0xC0]
        );
        assert_eq!(
            packed(|p| p.pack_int(128).unwrap()),
            [ext_tag(ExtKind::Int, Width::W16), 0x80, 0x00]
        );
        assert_eq!(
            packed(|p| p.pack_int(i64::MIN).unwrap()),
            {
                let mut expect = vec![ext_tag(ExtKind::Int, Width::W64)];
                expect.extend_from_slice(&i64::MIN.to_le_bytes());
                expect
            }
        );
    }

    #[test]
    fn smallest_width_uint_boundaries() {
        assert_eq!(
            packed(|p| p.pack_uint(64).unwrap()),
            [ext_tag(ExtKind::Uint, Width::W8), 64]
        );
        assert_eq!(
            packed(|p| p.pack_uint(255).unwrap()),
            [ext_tag(ExtKind::Uint, Width::W8), 0xFF]
        );
        assert_eq!(
            packed(|p| p.pack_uint(256).unwrap()),
            [ext_tag(ExtKind::Uint, Width::W16), 0x00, 0x01]
        );
        assert_eq!(
            packed(|p| p.pack_uint(1_000_000).unwrap()),
            [ext_tag(ExtKind::Uint, Width::W32), 0x40, 0x42, 0x0F, 0x00]
        );
    }

    #[test]
    fn floats_carry_full_payload() {
        assert_eq!(
            packed(|p| p.pack_f32(1.5).unwrap()),
            {
                let mut expect = vec![TAG_F32];
                expect.extend_from_slice(&1.5f32.to_le_bytes());
                expect
            }
        );
        assert_eq!(
            packed(|p| p.pack_f64(-2.25).unwrap()),
            {
                let mut expect = vec![TAG_F64];
                expect.extend_from_slice(&(-2.25f64).to_le_bytes());
                expect
            }
        );
    }

    #[test]
    fn negative_zero_keeps_sign_bit() {
        let bytes = packed(|p| p.pack_f64(-0.0).unwrap());
        assert_eq!(bytes[0], TAG_F64);
        assert_eq!(bytes[8], 0x80, "sign bit must survive in the payload");
    }

    #[test]
    fn non_finite_floats_become_singletons() {
        assert_eq!(packed(|p| p.pack_f64(f64::NAN).unwrap()), [TAG_NAN]);
        assert_eq!(packed(|p| p.pack_f32(f32::INFINITY).unwrap()), [TAG_PINF]);
        assert_eq!(
            packed(|p| p.pack_f64(f64::NEG_INFINITY).unwrap()),
            [TAG_NINF]
        );
    }

    #[test]
    fn inline_string_threshold() {
        let bytes = packed(|p| p.pack_str(&[b'x'; 31]).unwrap());
        assert_eq!(bytes[0], FIXSTR_BASE | 31);
        assert_eq!(bytes.len(), 32);

        let bytes = packed(|p| p.pack_str(&[b'x'; 32]).unwrap());
        assert_eq!(bytes[0], ext_tag(ExtKind::Str, Width::W8));
        assert_eq!(bytes[1], 32);
        assert_eq!(bytes.len(), 34);
    }

    #[test]
    fn raw_always_length_prefixed() {
        let bytes = packed(|p| p.pack_raw(b"ab").unwrap());
        assert_eq!(
            bytes,
            [ext_tag(ExtKind::Raw, Width::W8), 2, b'a', b'b']
        );
    }

    #[test]
    fn inline_container_thresholds() {
        assert_eq!(packed(|p| p.pack_array(0).unwrap()), [0xE0]);
        assert_eq!(packed(|p| p.pack_array(15).unwrap()), [0xEF]);
        assert_eq!(
            packed(|p| p.pack_array(16).unwrap()),
            [ext_tag(ExtKind::Arr, Width::W8), 16]
        );
        assert_eq!(packed(|p| p.pack_map(15).unwrap()), [0xFF]);
        assert_eq!(
            packed(|p| p.pack_map(16).unwrap()),
            [ext_tag(ExtKind::Map, Width::W8), 16]
        );
        // Sets never inline.
        assert_eq!(
            packed(|p| p.pack_set(0).unwrap()),
            [ext_tag(ExtKind::Set, Width::W8), 0]
        );
    }

    #[test]
    fn begin_and_patch_array() {
        let mut p = Packer::new().unwrap();
        let handle = p.begin_array().unwrap();
        p.pack_int(1).unwrap();
        p.pack_int(2).unwrap();
        p.patch_len(handle, 2).unwrap();
        let bytes = p.finish().unwrap();
        assert_eq!(bytes[0], ext_tag(ExtKind::Arr, Width::W64));
        assert_eq!(bytes[1..9], 2u64.to_le_bytes());
        assert_eq!(&bytes[9..], &[0x01, 0x02]);
    }

    #[test]
    fn patch_validates_tag_at_offset() {
        let mut p = Packer::new().unwrap();
        let handle = p.begin_array().unwrap();
        let mut q = Packer::new().unwrap();
        q.pack_nil().unwrap();
        let bogus = q.begin_map().unwrap();
        // A map handle used against the array tag must be rejected.
        let err = p.patch_len(bogus, 1).unwrap_err();
        assert!(matches!(err, PackError::InvalidHandle { .. }));
        p.patch_len(handle, 0).unwrap();
    }

    #[test]
    fn begin_on_streaming_is_unsupported() {
        let mut p = Packer::streaming(0, |_: &[u8]| Ok(())).unwrap();
        assert!(matches!(
            p.begin_array(),
            Err(PackError::StreamingUnsupported)
        ));
        assert!(matches!(
            p.begin_map(),
            Err(PackError::StreamingUnsupported)
        ));
    }

    #[test]
    fn streaming_aggregate_tags() {
        let bytes = packed(|p| {
            p.pack_array_streaming().unwrap();
            p.pack_int(1).unwrap();
            p.pack_end().unwrap();
        });
        assert_eq!(bytes, [TAG_SARR, 0x01, TAG_EOS]);
    }

    #[test]
    fn index_marker_encoding() {
        let bytes = packed(|p| p.pack_index(5).unwrap());
        assert_eq!(bytes, [TAG_IDX, 0x05]);
        let bytes = packed(|p| p.pack_index(300).unwrap());
        assert_eq!(
            bytes,
            [TAG_IDX, ext_tag(ExtKind::Uint, Width::W16), 0x2C, 0x01]
        );
    }

    #[test]
    fn ref_must_point_backwards() {
        let mut p = Packer::new().unwrap();
        p.pack_array(1).unwrap();
        p.pack_int(1).unwrap();
        p.pack_ref(0).unwrap();
        let err = p.pack_ref(100).unwrap_err();
        assert!(matches!(err, PackError::InvalidRef { offset: 100, .. }));
    }

    #[test]
    fn ref_at_position_zero_is_invalid() {
        let mut p = Packer::new().unwrap();
        let err = p.pack_ref(0).unwrap_err();
        assert!(matches!(err, PackError::InvalidRef { offset: 0, .. }));
    }

    #[test]
    fn streaming_finish_flushes_everything() {
        let mut out = Vec::new();
        {
            let mut p = Packer::streaming(16, |chunk: &[u8]| {
                out.extend_from_slice(chunk);
                Ok(())
            })
            .unwrap();
            p.pack_str(&[b'z'; 40]).unwrap();
            let tail = p.finish().unwrap();
            assert!(tail.is_empty());
        }
        // Tag + 1-byte length + payload.
        assert_eq!(out.len(), 2 + 40);
        assert_eq!(out[0], ext_tag(ExtKind::Str, Width::W8));
        assert_eq!(out[1], 40);
    }

    #[test]
    fn position_tracks_all_bytes_in_streaming_mode() {
        let mut p = Packer::streaming(16, |_: &[u8]| Ok(())).unwrap();
        p.pack_str(&[0u8; 30]).unwrap();
        assert_eq!(p.position(), 32);
    }
}
