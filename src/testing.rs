//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the hardware engine and the delay provider, plus
//! helpers that play the part of the interrupt handlers.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::vec::Vec;

use crate::driver::error::{IoError, IoResult};
use crate::driver::uart::AsyncUart;
use crate::hal::{EngineId, SerialEngine};
use crate::ring::BufferLock;

// =============================================================================
// Mock Engine
// =============================================================================

/// Mock UART/DMA engine
///
/// Bursts are not moved on their own: tests advance them with
/// [`transfer_half`](Self::transfer_half) and
/// [`transfer_rest`](Self::transfer_rest), then raise the matching
/// notification on the driver.
///
/// # Example
///
/// ```ignore
/// uart.enqueue(b"hi")?;
/// uart.with_engine(MockEngine::transfer_rest);
/// uart.on_burst_complete();
/// assert_eq!(uart.with_engine(|e| e.sent().to_vec()), b"hi");
/// ```
#[derive(Debug)]
pub struct MockEngine {
    id: EngineId,
    /// Live burst: (source, length, bytes already moved)
    burst: Option<(*const u8, usize, usize)>,
    /// Every byte moved out of a burst source
    sent: Vec<u8>,
    /// Length of every burst started
    bursts: Vec<usize>,
    /// Armed receive destination
    rx_target: Option<*mut u8>,
    arm_count: usize,
    start_error: Option<IoError>,
    arm_error: Option<IoError>,
}

// SAFETY: the raw pointers are only dereferenced by the test thread that
// drives the mock, while the driver guarantees their validity.
unsafe impl Send for MockEngine {}

impl MockEngine {
    pub fn new(id: usize) -> Self {
        Self {
            id: EngineId(id),
            burst: None,
            sent: Vec::new(),
            bursts: Vec::new(),
            rx_target: None,
            arm_count: 0,
            start_error: None,
            arm_error: None,
        }
    }

    /// Bytes moved so far, across all bursts
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Lengths of the bursts started so far
    pub fn bursts(&self) -> &[usize] {
        &self.bursts
    }

    /// Length of the live burst
    pub fn active_burst_len(&self) -> Option<usize> {
        self.burst.map(|(_, len, _)| len)
    }

    pub fn is_rx_armed(&self) -> bool {
        self.rx_target.is_some()
    }

    /// Number of times reception was armed
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    /// Refuse the next burst start with `error`
    pub fn fail_next_start(&mut self, error: IoError) {
        self.start_error = Some(error);
    }

    /// Refuse the next receive arm with `error`
    pub fn fail_next_arm(&mut self, error: IoError) {
        self.arm_error = Some(error);
    }

    /// Move the first `ceil(len/2)` bytes of the live burst
    pub fn transfer_half(&mut self) {
        if let Some((_, len, moved)) = self.burst {
            self.transfer_to(len.div_ceil(2).max(moved));
        }
    }

    /// Move the rest of the live burst and go idle
    pub fn transfer_rest(&mut self) {
        if let Some((_, len, _)) = self.burst {
            self.transfer_to(len);
            self.burst = None;
        }
    }

    /// Deliver `byte` into the armed destination and disarm.
    ///
    /// Panics if reception is not armed.
    pub fn receive(&mut self, byte: u8) {
        let dst = self.rx_target.take().expect("reception not armed");
        // SAFETY: the driver keeps the armed destination valid until the
        // byte-received notification.
        unsafe { dst.write_volatile(byte) };
    }

    fn transfer_to(&mut self, upto: usize) {
        let Some((src, len, moved)) = self.burst.as_mut() else {
            return;
        };
        let upto = upto.min(*len);
        if upto > *moved {
            // SAFETY: the driver keeps `src..src + len` valid until completion.
            let chunk = unsafe { core::slice::from_raw_parts(src.add(*moved), upto - *moved) };
            self.sent.extend_from_slice(chunk);
            *moved = upto;
        }
    }
}

impl SerialEngine for MockEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn is_tx_idle(&self) -> bool {
        self.burst.is_none()
    }

    unsafe fn start_burst_transfer(&mut self, src: *const u8, len: usize) -> IoResult<()> {
        if let Some(error) = self.start_error.take() {
            return Err(error);
        }
        if self.burst.is_some() {
            return Err(IoError::EngineBusy);
        }
        self.burst = Some((src, len, 0));
        self.bursts.push(len);
        Ok(())
    }

    unsafe fn arm_single_byte_receive(&mut self, dst: *mut u8) -> IoResult<()> {
        if let Some(error) = self.arm_error.take() {
            return Err(error);
        }
        self.rx_target = Some(dst);
        self.arm_count += 1;
        Ok(())
    }
}

// =============================================================================
// Interrupt stand-ins
// =============================================================================

/// Engine passes the midpoint of the live burst, then notifies
pub fn half_burst<RxL, TxL>(uart: &AsyncUart<'_, MockEngine, RxL, TxL>)
where
    RxL: BufferLock,
    TxL: BufferLock,
{
    uart.with_engine(MockEngine::transfer_half);
    uart.on_burst_half_complete();
}

/// Engine finishes the live burst, then notifies
pub fn complete_burst<RxL, TxL>(uart: &AsyncUart<'_, MockEngine, RxL, TxL>)
where
    RxL: BufferLock,
    TxL: BufferLock,
{
    uart.with_engine(MockEngine::transfer_rest);
    uart.on_burst_complete();
}

/// Full burst lifecycle: half notification, then completion
pub fn run_burst<RxL, TxL>(uart: &AsyncUart<'_, MockEngine, RxL, TxL>)
where
    RxL: BufferLock,
    TxL: BufferLock,
{
    half_burst(uart);
    complete_burst(uart);
}

/// A byte arrives on the armed receiver, then notifies
pub fn deliver_byte<RxL, TxL>(uart: &AsyncUart<'_, MockEngine, RxL, TxL>, byte: u8)
where
    RxL: BufferLock,
    TxL: BufferLock,
{
    uart.with_engine(|engine| engine.receive(byte));
    uart.on_byte_received();
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay provider for testing
///
/// Records the total time waited instead of waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_engine_moves_burst_in_halves() {
        let data = [1u8, 2, 3, 4, 5];
        let mut engine = MockEngine::new(1);

        unsafe { engine.start_burst_transfer(data.as_ptr(), data.len()) }.unwrap();
        assert!(!engine.is_tx_idle());
        assert_eq!(
            unsafe { engine.start_burst_transfer(data.as_ptr(), 1) },
            Err(IoError::EngineBusy)
        );

        engine.transfer_half();
        assert_eq!(engine.sent(), [1, 2, 3]);
        engine.transfer_rest();
        assert_eq!(engine.sent(), data);
        assert!(engine.is_tx_idle());
        assert_eq!(engine.bursts(), [5]);
    }

    #[test]
    fn mock_engine_receive_disarms() {
        let mut slot = 0u8;
        let mut engine = MockEngine::new(1);

        unsafe { engine.arm_single_byte_receive(&mut slot) }.unwrap();
        engine.receive(0x5A);
        assert!(!engine.is_rx_armed());
        assert_eq!(slot, 0x5A);
    }

    #[test]
    fn mock_delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_us(15);
        assert_eq!(delay.total_us(), 25);
    }
}
