//! Fixed-capacity buffer that flushes to a callback instead of growing.

use std::fmt;
use std::io;

use crate::error::{BufError, BufResult};
use crate::grow::normalize_block_size;

/// Flush callback invoked with full blocks of encoded bytes.
pub type FlushFn<'a> = Box<dyn FnMut(&[u8]) -> io::Result<()> + 'a>;

/// A fixed-capacity write buffer backed by a flush callback.
///
/// When a reservation or append does not fit, the buffered bytes are handed
/// to the callback and the cursor rewinds to zero. Payloads larger than the
/// whole buffer bypass it and go to the callback directly. A callback error
/// aborts the write with [`BufError::FlushFailed`].
pub struct StreamBuf<'a> {
    mem: Vec<u8>,
    cur: usize,
    /// Total bytes handed to the callback so far.
    flushed: usize,
    flush: FlushFn<'a>,
}

impl fmt::Debug for StreamBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBuf")
            .field("capacity", &self.mem.len())
            .field("cur", &self.cur)
            .field("flushed", &self.flushed)
            .finish_non_exhaustive()
    }
}

impl<'a> StreamBuf<'a> {
    /// Creates a streaming buffer with the given block size (0 selects the
    /// default) and flush callback.
    pub fn new<F>(block_size: usize, flush: F) -> BufResult<Self>
    where
        F: FnMut(&[u8]) -> io::Result<()> + 'a,
    {
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
            flushed: 0,
            flush: Box::new(flush),
        })
    }

    /// Returns the fixed capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Returns the number of bytes currently buffered (not yet flushed).
    #[must_use]
    pub const fn buffered(&self) -> usize {
        self.cur
    }

    /// Returns the total number of bytes produced so far, flushed and
    /// buffered.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.flushed + self.cur
    }

    /// Guarantees `n` writable bytes, flushing buffered bytes first if the
    /// remaining space is short. `n` larger than the whole buffer cannot be
    /// satisfied.
    pub fn reserve(&mut self, n: usize) -> BufResult<()> {
        let remain = self.mem.len() - self.cur;
        if remain >= n {
            return Ok(());
        }
        self.flush_buffered()?;
        if n > self.mem.len() {
            return Err(BufError::OutOfMemory {
                needed: n,
                capacity: self.mem.len(),
            });
        }
        Ok(())
    }

    /// Appends bytes, splitting across flush cycles when they do not fit.
    pub fn put(&mut self, bytes: &[u8]) -> BufResult<()> {
        let remain = self.mem.len() - self.cur;
        if bytes.len() <= remain {
            self.mem[self.cur..self.cur + bytes.len()].copy_from_slice(bytes);
            self.cur += bytes.len();
            return Ok(());
        }

        // Fill the remaining space, flush, then place the tail: buffered if
        // it fits in one empty buffer, straight to the callback otherwise.
        self.mem[self.cur..].copy_from_slice(&bytes[..remain]);
        self.cur = self.mem.len();
        self.flush_buffered()?;

        let tail = &bytes[remain..];
        if tail.len() < self.mem.len() {
            self.mem[..tail.len()].copy_from_slice(tail);
            self.cur = tail.len();
        } else {
            (self.flush)(tail).map_err(|e| BufError::FlushFailed { kind: e.kind() })?;
            self.flushed += tail.len();
        }
        Ok(())
    }

    /// Hands any buffered bytes to the callback and rewinds the cursor.
    pub fn flush_buffered(&mut self) -> BufResult<()> {
        if self.cur > 0 {
            (self.flush)(&self.mem[..self.cur])
                .map_err(|e| BufError::FlushFailed { kind: e.kind() })?;
            self.flushed += self.cur;
            self.cur = 0;
        }
        Ok(())
    }

    /// Final flush at the end of an encode.
    pub fn finish(&mut self) -> BufResult<()> {
        self.flush_buffered()
    }
}
