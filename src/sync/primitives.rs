//! Synchronization primitives for ISR-safe access.
//!
//! Used by the driver to serialize access to its engine between the main
//! context and notification handlers, and by [`SharedRegistry`] for `static`
//! placement.
//!
//! [`SharedRegistry`]: super::SharedRegistry

use core::cell::RefCell;
use critical_section::Mutex;

/// Interior-mutable cell whose every access runs inside a critical section.
///
/// Access is not reentrant: calling [`with`](Self::with) on the same cell
/// from inside its own closure panics, [`try_with`](Self::try_with) returns
/// `None` instead.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access, interrupts masked.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`with`](Self::with), but returns `None` if the value is
    /// already borrowed further up the stack.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut value))
        })
    }

    /// Consume the cell and return the value
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

// SAFETY: every access to the inner value happens inside a critical section,
// which excludes all other contexts on the target. `T: Send` because the value
// is reachable from whichever context holds the section.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}
