//! Growable block-allocated byte buffer.

use crate::error::{BufError, BufResult};

/// Default block size in bytes when none is requested.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Smallest honored block size; requests below this are clamped.
pub const MIN_BLOCK_SIZE: usize = 16;

/// Normalizes a requested block size: zero selects the default, anything
/// else is clamped to [`MIN_BLOCK_SIZE`] and rounded down to a multiple
/// of 16.
pub(crate) fn normalize_block_size(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_BLOCK_SIZE
    } else {
        let clamped = requested.max(MIN_BLOCK_SIZE);
        clamped / 16 * 16
    }
}

/// An owned byte buffer that grows in fixed-size blocks.
///
/// The buffer keeps a write cursor and grows geometrically by whole blocks
/// when a reservation does not fit. It never shrinks. Growth past the block
/// count ceiling (`usize::MAX / block_size`) or an allocator refusal is
/// reported as [`BufError::OutOfMemory`].
#[derive(Debug)]
pub struct GrowBuf {
    /// Backing storage; `mem.len()` is the current capacity in bytes.
    mem: Vec<u8>,
    /// Write cursor, always `<= mem.len()`.
    cur: usize,
    blk_size: usize,
    n_blk: usize,
    n_blk_max: usize,
}

impl GrowBuf {
    /// Creates a buffer with the default block size.
    pub fn new() -> BufResult<Self> {
        Self::with_block_size(0)
    }

    /// Creates a buffer with the given block size (0 selects the default).
    pub fn with_block_size(block_size: usize) -> BufResult<Self> {
        let blk_size = normalize_block_size(block_size);
        let mut mem = Vec::new();
        mem.try_reserve_exact(blk_size)
            .map_err(|_| BufError::OutOfMemory {
                needed: blk_size,
                capacity: 0,
            })?;
        mem.resize(blk_size, 0);
        Ok(Self {
            mem,
            cur: 0,
            blk_size,
            n_blk: 1,
            n_blk_max: usize::MAX / blk_size,
        })
    }

    /// Returns the write cursor (number of bytes written so far).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cur
    }

    /// Returns the current capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Returns the configured block size.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.blk_size
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mem[..self.cur]
    }

    /// Guarantees at least `n` writable bytes beyond the cursor, growing by
    /// whole blocks if necessary.
    pub fn reserve(&mut self, n: usize) -> BufResult<()> {
        let remain = self.mem.len() - self.cur;
        if remain >= n {
            return Ok(());
        }

        let shortfall = n - remain;
        let add = shortfall / self.blk_size + usize::from(shortfall % self.blk_size != 0);
        if add >= self.n_blk_max - self.n_blk {
            return Err(BufError::OutOfMemory {
                needed: n,
                capacity: self.mem.len(),
            });
        }

        let new_len = self.blk_size * (self.n_blk + add);
        self.mem
            .try_reserve_exact(new_len - self.mem.len())
            .map_err(|_| BufError::OutOfMemory {
                needed: n,
                capacity: self.mem.len(),
            })?;
        self.mem.resize(new_len, 0);
        self.n_blk += add;
        Ok(())
    }

    /// Appends bytes at the cursor, growing as needed.
    pub fn put(&mut self, bytes: &[u8]) -> BufResult<()> {
        self.reserve(bytes.len())?;
        self.mem[self.cur..self.cur + bytes.len()].copy_from_slice(bytes);
        self.cur += bytes.len();
        Ok(())
    }

    /// Returns the byte at `offset` if it has been written.
    #[must_use]
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset < self.cur {
            Some(self.mem[offset])
        } else {
            None
        }
    }

    /// Overwrites already-written bytes in place. Used for back-patching
    /// container lengths; the range must lie entirely below the cursor.
    pub fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> BufResult<()> {
        let end = offset.checked_add(bytes.len());
        match end {
            Some(end) if end <= self.cur => {
                self.mem[offset..end].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(BufError::OutOfBounds {
                offset,
                len: bytes.len(),
                written: self.cur,
            }),
        }
    }

    /// Rewinds the cursor without releasing capacity.
    pub fn clear(&mut self) {
        self.cur = 0;
    }

    /// Consumes the buffer and returns the written bytes.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.mem.truncate(self.cur);
        self.mem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_normalization() {
        assert_eq!(normalize_block_size(0), DEFAULT_BLOCK_SIZE);
        assert_eq!(normalize_block_size(1), MIN_BLOCK_SIZE);
        assert_eq!(normalize_block_size(16), 16);
        assert_eq!(normalize_block_size(17), 16);
        assert_eq!(normalize_block_size(100), 96);
        assert_eq!(normalize_block_size(1024), 1024);
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = GrowBuf::new().unwrap();
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.capacity(), DEFAULT_BLOCK_SIZE);
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn put_within_first_block() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[1, 2, 3]).unwrap();
        assert_eq!(buf.position(), 3);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn grows_by_whole_blocks() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[0u8; 17]).unwrap();
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.position(), 17);
    }

    #[test]
    fn grows_enough_for_large_put() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[0xEEu8; 100]).unwrap();
        assert!(buf.capacity() >= 100);
        assert_eq!(buf.capacity() % 16, 0);
        assert_eq!(buf.as_slice(), &[0xEEu8; 100]);
    }

    #[test]
    fn reserve_is_idempotent_when_space_remains() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.reserve(10).unwrap();
        let cap = buf.capacity();
        buf.reserve(10).unwrap();
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn overwrite_patches_written_bytes() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[0u8; 8]).unwrap();
        buf.overwrite(2, &[0xAA, 0xBB]).unwrap();
        assert_eq!(buf.as_slice()[2..4], [0xAA, 0xBB]);
    }

    #[test]
    fn overwrite_past_cursor_fails() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[0u8; 4]).unwrap();
        let err = buf.overwrite(2, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, BufError::OutOfBounds { written: 4, .. }));
    }

    #[test]
    fn byte_at_bounds() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[7, 8]).unwrap();
        assert_eq!(buf.byte_at(1), Some(8));
        assert_eq!(buf.byte_at(2), None);
    }

    #[test]
    fn clear_rewinds_without_shrinking() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[0u8; 20]).unwrap();
        let cap = buf.capacity();
        buf.clear();
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn into_bytes_truncates_to_cursor() {
        let mut buf = GrowBuf::with_block_size(16).unwrap();
        buf.put(&[1, 2, 3]).unwrap();
        let bytes = buf.into_bytes();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
