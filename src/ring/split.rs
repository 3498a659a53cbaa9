//! Producer and consumer handles for a ring shared by exactly two contexts.

use super::buffer::RingBuffer;
use super::lock::BufferLock;

/// Write side of a split [`RingBuffer`].
///
/// Only one exists per split, so the write cursor has a single owner whatever
/// the lock strategy.
pub struct RingWriter<'r, 'a, L: BufferLock> {
    ring: &'r RingBuffer<'a, L>,
}

/// Read side of a split [`RingBuffer`].
pub struct RingReader<'r, 'a, L: BufferLock> {
    ring: &'r RingBuffer<'a, L>,
}

// SAFETY: `RingBuffer::split` borrows the ring mutably and creates one writer
// and one reader. The writer only moves `head` and fills free slots, the
// reader only moves `tail` and drains occupied slots, so the two may run in
// different contexts. `L: Sync` because both reach the shared lock.
unsafe impl<L: BufferLock + Sync> Send for RingWriter<'_, '_, L> {}
// SAFETY: See `RingWriter`.
unsafe impl<L: BufferLock + Sync> Send for RingReader<'_, '_, L> {}

impl<'r, 'a, L: BufferLock> RingWriter<'r, 'a, L> {
    pub(crate) fn new(ring: &'r RingBuffer<'a, L>) -> Self {
        Self { ring }
    }

    /// See [`RingBuffer::write`]
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.ring.write(data)
    }

    /// See [`RingBuffer::commit_write`]
    pub fn commit_write(&mut self, len: usize) -> usize {
        self.ring.commit_write(len)
    }

    /// See [`RingBuffer::peek_write_ptr`]
    pub fn peek_write_ptr(&self) -> *mut u8 {
        self.ring.peek_write_ptr()
    }

    /// Free bytes
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    /// See [`RingBuffer::writable_contiguous`]
    pub fn writable_contiguous(&self) -> usize {
        self.ring.writable_contiguous()
    }
}

impl<'r, 'a, L: BufferLock> RingReader<'r, 'a, L> {
    pub(crate) fn new(ring: &'r RingBuffer<'a, L>) -> Self {
        Self { ring }
    }

    /// See [`RingBuffer::read`]
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        self.ring.read(out)
    }

    /// See [`RingBuffer::peek`]
    pub fn peek(&mut self, out: &mut [u8]) -> usize {
        self.ring.peek(out)
    }

    /// See [`RingBuffer::skip`]
    pub fn skip(&mut self, len: usize) -> usize {
        self.ring.skip(len)
    }

    /// See [`RingBuffer::peek_read_ptr`]
    pub fn peek_read_ptr(&self) -> *const u8 {
        self.ring.peek_read_ptr()
    }

    /// Unread bytes
    pub fn used(&self) -> usize {
        self.ring.used()
    }

    /// See [`RingBuffer::readable_contiguous`]
    pub fn readable_contiguous(&self) -> usize {
        self.ring.readable_contiguous()
    }
}

impl<L: BufferLock> core::fmt::Debug for RingWriter<'_, '_, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingWriter").field("free", &self.free()).finish()
    }
}

impl<L: BufferLock> core::fmt::Debug for RingReader<'_, '_, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingReader").field("used", &self.used()).finish()
    }
}
