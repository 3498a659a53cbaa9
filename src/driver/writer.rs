//! `core::fmt::Write` adapter for formatted output.

use core::fmt;

use super::uart::AsyncUart;
use crate::hal::SerialEngine;
use crate::ring::BufferLock;

/// Formatted-output adapter returned by [`AsyncUart::writer`].
///
/// Each `write_str` is one [`enqueue`](AsyncUart::enqueue). Output that does
/// not fit in the transmit ring fails with [`fmt::Error`]; the part that fit
/// stays queued.
///
/// ```ignore
/// use core::fmt::Write;
/// write!(uart.writer(), "rx: {} bytes\r\n", uart.rx_available())?;
/// ```
pub struct UartWriter<'u, 'a, E: SerialEngine, RxL: BufferLock, TxL: BufferLock> {
    uart: &'u AsyncUart<'a, E, RxL, TxL>,
}

impl<'u, 'a, E: SerialEngine, RxL: BufferLock, TxL: BufferLock> UartWriter<'u, 'a, E, RxL, TxL> {
    pub(crate) fn new(uart: &'u AsyncUart<'a, E, RxL, TxL>) -> Self {
        Self { uart }
    }
}

impl<E: SerialEngine, RxL: BufferLock, TxL: BufferLock> fmt::Write
    for UartWriter<'_, '_, E, RxL, TxL>
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.is_empty() {
            return Ok(());
        }
        match self.uart.enqueue(s.as_bytes()) {
            Ok(n) if n == s.len() => Ok(()),
            _ => Err(fmt::Error),
        }
    }
}
