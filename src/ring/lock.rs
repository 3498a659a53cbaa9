//! Synchronization strategies for ring buffer sides.
//!
//! A [`RingBuffer`](super::RingBuffer) has two independent sides: the write
//! side moves `head`, the read side moves `tail`. The strategy guarding each
//! side is a type parameter picked per deployment target instead of a pair
//! of callbacks swapped at runtime.
//!
//! | Strategy               | Read side         | Write side        |
//! |------------------------|-------------------|-------------------|
//! | [`NoLock`]             | atomic cursor     | atomic cursor     |
//! | [`CriticalSectionLock`]| interrupts masked | interrupts masked |
//! | [`ReadLocked`]         | interrupts masked | atomic cursor     |
//! | [`WriteLocked`]        | atomic cursor     | interrupts masked |
//!
//! With one producer context and one consumer context, [`NoLock`] is enough:
//! each cursor has a single writer and is published with release/acquire
//! ordering. Lock a side only when it is called from more than one context.
//!
//! Only rings whose strategy is a [`SharedLock`] are `Sync`. Any other ring
//! reaches a second context through
//! [`RingBuffer::split`](super::RingBuffer::split), whose handles make the
//! one producer / one consumer rule an ownership fact.

/// Guards the read side and the write side of a ring buffer.
///
/// Implementations run the closure while holding whatever exclusion the
/// strategy provides. Nested acquisition (write side, then read side) must be
/// supported, since `clear` takes both.
pub trait BufferLock {
    /// Read side is serialized across contexts
    const READ_LOCKED: bool;

    /// Write side is serialized across contexts
    const WRITE_LOCKED: bool;

    /// Whether this strategy performs any locking at all
    const ENABLED: bool = Self::READ_LOCKED || Self::WRITE_LOCKED;

    /// Const initializer, used by [`RingBuffer::empty`](super::RingBuffer::empty)
    const INIT: Self;

    /// Run `f` with the read side held
    fn read_side<R>(&self, f: impl FnOnce() -> R) -> R;

    /// Run `f` with the write side held
    fn write_side<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// No locking; relies on single-writer atomic cursors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoLock;

impl BufferLock for NoLock {
    const READ_LOCKED: bool = false;
    const WRITE_LOCKED: bool = false;
    const INIT: Self = NoLock;

    #[inline(always)]
    fn read_side<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }

    #[inline(always)]
    fn write_side<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Masks interrupts (via `critical-section`) around both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CriticalSectionLock;

impl BufferLock for CriticalSectionLock {
    const READ_LOCKED: bool = true;
    const WRITE_LOCKED: bool = true;
    const INIT: Self = CriticalSectionLock;

    #[inline]
    fn read_side<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }

    #[inline]
    fn write_side<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

/// Independent strategies per side: `R` guards reads, `W` guards writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitLock<R, W> {
    read: R,
    write: W,
}

impl<R: BufferLock, W: BufferLock> SplitLock<R, W> {
    /// Combine a read-side and a write-side strategy
    pub const fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R: BufferLock, W: BufferLock> BufferLock for SplitLock<R, W> {
    const READ_LOCKED: bool = R::READ_LOCKED;
    const WRITE_LOCKED: bool = W::WRITE_LOCKED;
    const INIT: Self = SplitLock {
        read: R::INIT,
        write: W::INIT,
    };

    #[inline]
    fn read_side<T>(&self, f: impl FnOnce() -> T) -> T {
        self.read.read_side(f)
    }

    #[inline]
    fn write_side<T>(&self, f: impl FnOnce() -> T) -> T {
        self.write.write_side(f)
    }
}

/// Strategy that serializes both sides across contexts.
///
/// # Safety
///
/// `read_side` and `write_side` must each exclude every other caller of the
/// same side, in every context that can reach the ring.
pub unsafe trait SharedLock: BufferLock {}

// SAFETY: both sides run with interrupts masked.
unsafe impl SharedLock for CriticalSectionLock {}

// SAFETY: each side delegates to a strategy that serializes it.
unsafe impl<R: SharedLock, W: SharedLock> SharedLock for SplitLock<R, W> {}

/// Several consumers, one producer
pub type ReadLocked = SplitLock<CriticalSectionLock, NoLock>;

/// Several producers, one consumer
pub type WriteLocked = SplitLock<NoLock, CriticalSectionLock>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_lock_is_disabled() {
        assert!(!NoLock::ENABLED);
        assert_eq!(NoLock.read_side(|| 3), 3);
        assert_eq!(NoLock.write_side(|| 4), 4);
    }

    #[test]
    fn critical_section_lock_is_enabled() {
        assert!(CriticalSectionLock::ENABLED);
        assert_eq!(CriticalSectionLock.write_side(|| 7), 7);
    }

    #[test]
    fn critical_section_lock_nests() {
        let lock = CriticalSectionLock;
        let value = lock.write_side(|| lock.read_side(|| 11));
        assert_eq!(value, 11);
    }

    #[test]
    fn split_lock_enabled_if_either_side_locks() {
        assert!(<ReadLocked as BufferLock>::ENABLED);
        assert!(<WriteLocked as BufferLock>::ENABLED);
        assert!(!<SplitLock<NoLock, NoLock> as BufferLock>::ENABLED);
    }

    #[test]
    fn split_lock_reports_each_side() {
        assert!(<ReadLocked as BufferLock>::READ_LOCKED);
        assert!(!<ReadLocked as BufferLock>::WRITE_LOCKED);
        assert!(!<WriteLocked as BufferLock>::READ_LOCKED);
        assert!(<WriteLocked as BufferLock>::WRITE_LOCKED);
    }

    #[test]
    fn shared_lock_covers_fully_locked_strategies() {
        fn shared<L: SharedLock>() -> bool {
            L::READ_LOCKED && L::WRITE_LOCKED
        }
        assert!(shared::<CriticalSectionLock>());
        assert!(shared::<SplitLock<CriticalSectionLock, CriticalSectionLock>>());
    }

    #[test]
    fn split_lock_runs_closures() {
        let lock = WriteLocked::INIT;
        assert_eq!(lock.read_side(|| 1) + lock.write_side(|| 2), 3);
    }
}
