//! Blocking caller-side helpers.
//!
//! The driver never waits: a short `enqueue` or an empty `dequeue` is
//! reported and the caller decides what to do. These helpers are one such
//! policy, polling every [`POLL_INTERVAL_US`] microseconds until done or
//! until `timeout_us` has elapsed.
//!
//! They must run in the main context, never from a notification handler.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{IoError, IoResult};
use crate::driver::uart::AsyncUart;
use crate::hal::SerialEngine;
use crate::internal::constants::POLL_INTERVAL_US;
use crate::ring::BufferLock;

/// Tracks time spent polling against a budget.
struct Deadline {
    elapsed_us: u32,
    timeout_us: u32,
}

impl Deadline {
    fn new(timeout_us: u32) -> Self {
        Self {
            elapsed_us: 0,
            timeout_us,
        }
    }

    /// Wait one poll interval, or fail if the budget is spent.
    fn wait<D: DelayNs>(&mut self, delay: &mut D) -> IoResult<()> {
        if self.elapsed_us >= self.timeout_us {
            return Err(IoError::Timeout);
        }
        delay.delay_us(POLL_INTERVAL_US);
        self.elapsed_us = self.elapsed_us.saturating_add(POLL_INTERVAL_US);
        Ok(())
    }
}

/// Queue all of `data`, waiting for transmit space as needed.
///
/// # Errors
///
/// - [`IoError::Timeout`] if space did not free up in time; the bytes
///   accepted before that stay queued
/// - any error from [`AsyncUart::enqueue`]
pub fn write_all<E, RxL, TxL, D>(
    uart: &AsyncUart<'_, E, RxL, TxL>,
    data: &[u8],
    delay: &mut D,
    timeout_us: u32,
) -> IoResult<()>
where
    E: SerialEngine,
    RxL: BufferLock,
    TxL: BufferLock,
    D: DelayNs,
{
    let mut deadline = Deadline::new(timeout_us);
    let mut sent = 0;
    while sent < data.len() {
        sent += uart.enqueue(&data[sent..])?;
        if sent < data.len() {
            deadline.wait(delay)?;
        }
    }
    Ok(())
}

/// Wait until every queued byte has been transmitted.
///
/// Kicks the pump on each poll, so it also drains drivers configured without
/// `start_on_enqueue`.
///
/// # Errors
///
/// - [`IoError::Timeout`] if the transmit ring did not drain in time
/// - [`IoError::NotInitialized`] before [`AsyncUart::init`]
pub fn flush<E, RxL, TxL, D>(
    uart: &AsyncUart<'_, E, RxL, TxL>,
    delay: &mut D,
    timeout_us: u32,
) -> IoResult<()>
where
    E: SerialEngine,
    RxL: BufferLock,
    TxL: BufferLock,
    D: DelayNs,
{
    let mut deadline = Deadline::new(timeout_us);
    loop {
        uart.kick()?;
        if uart.tx_pending() == 0 && uart.tx_in_flight() == 0 {
            return Ok(());
        }
        deadline.wait(delay)?;
    }
}

/// Fill `out` completely with received bytes.
///
/// # Errors
///
/// - [`IoError::Timeout`] if not enough bytes arrived in time; the bytes
///   already copied into `out` are consumed
/// - [`IoError::NotInitialized`] before [`AsyncUart::init`]
pub fn read_exact<E, RxL, TxL, D>(
    uart: &AsyncUart<'_, E, RxL, TxL>,
    out: &mut [u8],
    delay: &mut D,
    timeout_us: u32,
) -> IoResult<()>
where
    E: SerialEngine,
    RxL: BufferLock,
    TxL: BufferLock,
    D: DelayNs,
{
    let mut deadline = Deadline::new(timeout_us);
    let mut got = 0;
    while got < out.len() {
        got += uart.dequeue(&mut out[got..])?;
        if got < out.len() {
            deadline.wait(delay)?;
        }
    }
    Ok(())
}
