//! Circular byte buffers.
//!
//! - [`RingBuffer`] - bounded FIFO over caller-owned storage with
//!   data-carrying and position-only operations on both sides
//! - [`BufferLock`] - per-side synchronization strategy, chosen at build time
//! - [`RingWriter`] / [`RingReader`] - single producer and consumer handles
//!   for rings whose strategy does not lock
//!
//! # Example
//!
//! ```ignore
//! use ph_uart_dma::ring::{CriticalSectionLock, RingBuffer};
//!
//! static mut LOG_STORAGE: [u8; 256] = [0; 256];
//!
//! // Several contexts log through the same buffer, one task drains it.
//! let log: &'static RingBuffer<'static, CriticalSectionLock> = LOG.init(
//!     RingBuffer::new(unsafe { &mut *core::ptr::addr_of_mut!(LOG_STORAGE) })?,
//! );
//! ```

mod buffer;
mod lock;
mod split;

pub use buffer::RingBuffer;
pub use lock::{
    BufferLock, CriticalSectionLock, NoLock, ReadLocked, SharedLock, SplitLock, WriteLocked,
};
pub use split::{RingReader, RingWriter};
