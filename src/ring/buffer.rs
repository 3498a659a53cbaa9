//! Fixed-capacity byte ring over caller-owned storage.

use core::marker::PhantomData;
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::lock::{BufferLock, NoLock, SharedLock};
use super::split::{RingReader, RingWriter};
use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::RESERVED_SLOTS;

/// Occupancy for a pair of cursors over `size` slots.
#[inline(always)]
const fn occupancy(head: usize, tail: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else if head >= tail {
        head - tail
    } else {
        size - (tail - head)
    }
}

/// Byte FIFO over externally owned storage with wraparound cursors.
///
/// One slot is always kept free so that `head == tail` means empty, never
/// full: storage of `size` bytes holds at most `size - 1` bytes of payload.
///
/// The write side only moves `head` and the read side only moves `tail`.
/// With one producer context and one consumer context no locking is needed;
/// see [`BufferLock`] for the strategies available otherwise.
///
/// Every operation has a data-carrying form and a position-only form:
///
/// | Side  | Copies data    | Moves cursor only     |
/// |-------|----------------|-----------------------|
/// | write | [`write`]      | [`commit_write`]      |
/// | read  | [`read`]       | [`skip`]              |
///
/// The position-only forms pair with [`peek_write_ptr`] and
/// [`peek_read_ptr`] for zero-copy access by a DMA engine.
///
/// [`write`]: Self::write
/// [`commit_write`]: Self::commit_write
/// [`read`]: Self::read
/// [`skip`]: Self::skip
/// [`peek_write_ptr`]: Self::peek_write_ptr
/// [`peek_read_ptr`]: Self::peek_read_ptr
///
/// # Example
///
/// ```
/// use ph_uart_dma::RingBuffer;
///
/// let mut storage = [0u8; 8];
/// let rb: RingBuffer<'_> = RingBuffer::new(&mut storage).unwrap();
///
/// assert_eq!(rb.write(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), 7);
///
/// let mut out = [0u8; 4];
/// assert_eq!(rb.read(&mut out), 4);
/// assert_eq!(out, [1, 2, 3, 4]);
/// assert_eq!(rb.used(), 3);
/// ```
///
/// A ring without a [`SharedLock`] cannot be shared between contexts; hand
/// out [`split`](Self::split) handles instead:
///
/// ```compile_fail
/// use ph_uart_dma::RingBuffer;
///
/// fn shared<T: Sync>(_: &T) {}
///
/// let mut storage = [0u8; 8];
/// let rb: RingBuffer<'_> = RingBuffer::new(&mut storage).unwrap();
/// shared(&rb);
/// ```
pub struct RingBuffer<'a, L: BufferLock = NoLock> {
    /// Start of the bound storage (null while unbound)
    storage: *mut u8,
    /// Total storage size in bytes
    size: usize,
    /// Write cursor, owned by the producer
    head: AtomicUsize,
    /// Read cursor, owned by the consumer
    tail: AtomicUsize,
    /// Side synchronization strategy
    lock: L,
    _storage: PhantomData<&'a mut [u8]>,
}

// SAFETY: The raw storage pointer is derived from a `&'a mut [u8]` the ring
// holds exclusively, so moving the ring to another context moves sole access
// to the storage with it.
unsafe impl<L: BufferLock + Send> Send for RingBuffer<'_, L> {}
// SAFETY: With a `SharedLock` every write-side access runs under the write
// lock and every read-side access under the read lock, so each cursor has one
// writer at a time. Producer-side access only touches free slots and
// consumer-side access only touches occupied slots; cursor hand-off uses
// release/acquire ordering.
unsafe impl<L: SharedLock + Sync> Sync for RingBuffer<'_, L> {}

impl<'a, L: BufferLock> RingBuffer<'a, L> {
    /// Create an unbound ring (const, suitable for static initialization).
    ///
    /// An unbound ring has zero capacity: writes accept nothing and reads
    /// deliver nothing until [`init`](Self::init) binds storage.
    pub const fn empty() -> Self {
        Self {
            storage: ptr::null_mut(),
            size: 0,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            lock: L::INIT,
            _storage: PhantomData,
        }
    }

    /// Create a ring over `storage` with the strategy's default lock.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidArgument`] if `storage` is empty.
    pub fn new(storage: &'a mut [u8]) -> ConfigResult<Self> {
        Self::with_lock(storage, L::INIT)
    }

    /// Create a ring over `storage` guarded by `lock`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidArgument`] if `storage` is empty.
    pub fn with_lock(storage: &'a mut [u8], lock: L) -> ConfigResult<Self> {
        let mut rb = Self::empty();
        rb.lock = lock;
        rb.init(storage)?;
        Ok(rb)
    }

    /// Bind `storage` and reset both cursors.
    ///
    /// On error the ring is left unchanged.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidArgument`] if `storage` is empty.
    pub fn init(&mut self, storage: &'a mut [u8]) -> ConfigResult<()> {
        if storage.is_empty() {
            return Err(ConfigError::InvalidArgument);
        }

        self.size = storage.len();
        self.storage = storage.as_mut_ptr();
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;
        Ok(())
    }

    // =========================================================================
    // Capacity and occupancy
    // =========================================================================

    /// Total storage size in bytes
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Maximum payload the ring can hold (`size - 1`)
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.size.saturating_sub(RESERVED_SLOTS)
    }

    /// Number of unread bytes.
    ///
    /// Lock-free snapshot; may be stale by the time the caller acts on it.
    #[inline]
    pub fn used(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        occupancy(head, tail, self.size)
    }

    /// Number of bytes that can be written right now
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity().saturating_sub(self.used())
    }

    /// True if there is nothing to read
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// True if a write would accept nothing
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Current write cursor (`head`)
    #[inline]
    pub fn write_index(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Current read cursor (`tail`)
    #[inline]
    pub fn read_index(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Unread bytes that sit contiguously from `tail` to the end of storage
    pub fn readable_contiguous(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        self.used().min(self.size - tail)
    }

    /// Free bytes that sit contiguously from `head` to the end of storage
    pub fn writable_contiguous(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        self.free().min(self.size - head)
    }

    /// Whether the side strategy performs any locking
    #[inline(always)]
    pub const fn is_locking(&self) -> bool {
        L::ENABLED
    }

    /// Split into one producer handle and one consumer handle.
    ///
    /// The handles can live in different contexts even when `L` does not
    /// lock: each exists once, and the ring stays borrowed until both are
    /// dropped.
    pub fn split(&mut self) -> (RingWriter<'_, 'a, L>, RingReader<'_, 'a, L>) {
        let ring: &Self = self;
        (RingWriter::new(ring), RingReader::new(ring))
    }

    // =========================================================================
    // Write side
    // =========================================================================

    /// Copy as much of `data` as fits; returns the number of bytes accepted.
    ///
    /// Accepts `min(data.len(), free())` bytes. Bytes beyond that are left
    /// untouched in `data` for the caller to retry or drop.
    pub fn write(&self, data: &[u8]) -> usize {
        self.push_with(data.len(), |head, first, second| {
            // SAFETY: `push_with` only hands out free slots inside the bound
            // storage, and `first + second <= data.len()`.
            unsafe {
                ptr::copy_nonoverlapping(data.as_ptr(), self.storage.add(head), first);
                if second > 0 {
                    ptr::copy_nonoverlapping(data.as_ptr().add(first), self.storage, second);
                }
            }
        })
    }

    /// Advance `head` by up to `len` without copying.
    ///
    /// For bytes already placed at [`peek_write_ptr`](Self::peek_write_ptr)
    /// by a zero-copy producer. Returns the number of bytes committed.
    pub fn commit_write(&self, len: usize) -> usize {
        self.push_with(len, |_, _, _| {})
    }

    /// Pointer to storage at `head`, for a zero-copy producer.
    ///
    /// At most [`writable_contiguous`](Self::writable_contiguous) bytes may
    /// be written there, and only bytes later passed to
    /// [`commit_write`](Self::commit_write) become readable.
    #[inline]
    pub fn peek_write_ptr(&self) -> *mut u8 {
        self.storage.wrapping_add(self.head.load(Ordering::Acquire))
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// Copy up to `out.len()` bytes out; returns the number delivered.
    pub fn read(&self, out: &mut [u8]) -> usize {
        self.pop_with(out.len(), true, |tail, first, second| {
            // SAFETY: `pop_with` only hands out occupied slots inside the
            // bound storage, and `first + second <= out.len()`.
            unsafe { self.copy_out(out, tail, first, second) }
        })
    }

    /// Copy up to `out.len()` bytes out without consuming them.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        self.pop_with(out.len(), false, |tail, first, second| {
            // SAFETY: as in `read`.
            unsafe { self.copy_out(out, tail, first, second) }
        })
    }

    /// Advance `tail` by up to `len` without copying.
    ///
    /// Retires bytes a consumer already took straight from storage through
    /// [`peek_read_ptr`](Self::peek_read_ptr). Returns the number retired.
    pub fn skip(&self, len: usize) -> usize {
        self.pop_with(len, true, |_, _, _| {})
    }

    /// Pointer to storage at `tail`, for a zero-copy consumer.
    ///
    /// At most [`readable_contiguous`](Self::readable_contiguous) bytes are
    /// valid there. They stay valid until retired with [`skip`](Self::skip).
    #[inline]
    pub fn peek_read_ptr(&self) -> *const u8 {
        self.storage.wrapping_add(self.tail.load(Ordering::Acquire))
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Reset both cursors, discarding any unread bytes.
    ///
    /// Holds both sides for the whole reset when locking is configured.
    pub fn clear(&self) {
        self.lock.write_side(|| {
            self.lock.read_side(|| {
                self.head.store(0, Ordering::Release);
                self.tail.store(0, Ordering::Release);
            });
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Reserve up to `len` free bytes, let `copy` fill them, then publish.
    ///
    /// `copy(head, first, second)` receives the span at `head` and the
    /// wrapped span at offset 0.
    fn push_with(&self, len: usize, copy: impl FnOnce(usize, usize, usize)) -> usize {
        self.lock.write_side(|| {
            let head = self.head.load(Ordering::Relaxed);
            let tail = self.tail.load(Ordering::Acquire);
            let free = self
                .capacity()
                .saturating_sub(occupancy(head, tail, self.size));

            let n = len.min(free);
            if n == 0 {
                return 0;
            }

            let first = n.min(self.size - head);
            copy(head, first, n - first);

            self.head.store((head + n) % self.size, Ordering::Release);
            n
        })
    }

    /// Take up to `len` occupied bytes, let `copy` read them, then retire
    /// them if `consume` is set.
    fn pop_with(&self, len: usize, consume: bool, copy: impl FnOnce(usize, usize, usize)) -> usize {
        self.lock.read_side(|| {
            let tail = self.tail.load(Ordering::Relaxed);
            let head = self.head.load(Ordering::Acquire);

            let n = len.min(occupancy(head, tail, self.size));
            if n == 0 {
                return 0;
            }

            let first = n.min(self.size - tail);
            copy(tail, first, n - first);

            if consume {
                self.tail.store((tail + n) % self.size, Ordering::Release);
            }
            n
        })
    }

    /// # Safety
    ///
    /// `[tail, tail + first)` and `[0, second)` must be occupied slots of the
    /// bound storage and `first + second <= out.len()`.
    unsafe fn copy_out(&self, out: &mut [u8], tail: usize, first: usize, second: usize) {
        // SAFETY: guaranteed by the caller.
        unsafe {
            ptr::copy_nonoverlapping(self.storage.add(tail), out.as_mut_ptr(), first);
            if second > 0 {
                ptr::copy_nonoverlapping(self.storage, out.as_mut_ptr().add(first), second);
            }
        }
    }
}

impl<L: BufferLock> core::fmt::Debug for RingBuffer<'_, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("size", &self.size)
            .field("head", &self.write_index())
            .field("tail", &self.read_index())
            .field("used", &self.used())
            .field("locking", &L::ENABLED)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
