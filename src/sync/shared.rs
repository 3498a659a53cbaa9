//! ISR-safe registry wrapper using critical sections.
//!
//! Provides [`SharedRegistry`] so interrupt handlers can route notifications
//! through a `static` without any `unsafe` at the call site.

use super::primitives::CriticalSectionCell;
use crate::driver::registry::{Notification, UartRegistry};
use crate::hal::EngineId;
use crate::internal::constants::REGISTRY_CAPACITY;

/// ISR-safe instance registry for `static` placement.
///
/// All access goes through `critical_section::with()`, so a dispatch from
/// one interrupt cannot observe a half-finished registration.
///
/// # Example
///
/// ```ignore
/// static REGISTRY: SharedRegistry = SharedRegistry::new();
///
/// REGISTRY.with(|registry| UART1.init(registry))?;
///
/// #[interrupt]
/// fn USART1() {
///     REGISTRY.on_byte_received(EngineId::new(USART1_BASE));
/// }
/// ```
pub struct SharedRegistry<const N: usize = REGISTRY_CAPACITY> {
    inner: CriticalSectionCell<UartRegistry<'static, N>>,
}

impl<const N: usize> SharedRegistry<N> {
    /// Create an empty shared registry (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(UartRegistry::new()),
        }
    }

    /// Execute a closure with exclusive access to the registry.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut UartRegistry<'static, N>) -> R,
    {
        self.inner.with(f)
    }

    /// Deliver `notification` to the driver owning `id`.
    ///
    /// Returns `false` if no driver owns that engine.
    #[inline]
    pub fn dispatch(&self, id: EngineId, notification: Notification) -> bool {
        self.inner.with(|registry| registry.dispatch(id, notification))
    }

    /// Byte-received interrupt entry point
    #[inline]
    pub fn on_byte_received(&self, id: EngineId) -> bool {
        self.dispatch(id, Notification::ByteReceived)
    }

    /// Burst half-complete interrupt entry point
    #[inline]
    pub fn on_burst_half_complete(&self, id: EngineId) -> bool {
        self.dispatch(id, Notification::BurstHalfComplete)
    }

    /// Burst complete interrupt entry point
    #[inline]
    pub fn on_burst_complete(&self, id: EngineId) -> bool {
        self.dispatch(id, Notification::BurstComplete)
    }
}

impl<const N: usize> Default for SharedRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;
    use std::vec::Vec;

    use super::*;
    use crate::driver::config::UartConfig;
    use crate::driver::uart::AsyncUart;
    use crate::ring::RingBuffer;
    use crate::testing::MockEngine;

    /// Leak a driver and its ring storage, as firmware would keep them in statics
    fn leaked_uart(id: usize) -> &'static AsyncUart<'static, MockEngine> {
        let rx = RingBuffer::new(Box::leak(Box::new([0u8; 16]))).unwrap();
        let tx = RingBuffer::new(Box::leak(Box::new([0u8; 16]))).unwrap();
        Box::leak(Box::new(
            AsyncUart::new(MockEngine::new(id), rx, tx, UartConfig::new()).unwrap(),
        ))
    }

    #[test]
    fn empty_registry_drops_notifications() {
        let registry: SharedRegistry = SharedRegistry::new();
        assert!(!registry.on_burst_complete(EngineId(1)));
        assert!(registry.with(|r| r.is_empty()));
    }

    #[test]
    fn static_registry_routes_to_driver() {
        static REGISTRY: SharedRegistry<2> = SharedRegistry::new();
        let uart = leaked_uart(11);

        REGISTRY.with(|registry| uart.init(registry)).unwrap();

        uart.with_engine(|e| e.receive(b'x'));
        assert!(REGISTRY.on_byte_received(EngineId(11)));
        let mut out = [0u8; 1];
        assert_eq!(uart.dequeue(&mut out), Ok(1));
        assert_eq!(out[0], b'x');

        uart.enqueue(b"abcd").unwrap();
        uart.with_engine(MockEngine::transfer_half);
        assert!(REGISTRY.on_burst_half_complete(EngineId(11)));
        assert_eq!(uart.tx_pending(), 2);
        uart.with_engine(MockEngine::transfer_rest);
        assert!(REGISTRY.on_burst_complete(EngineId(11)));
        assert_eq!(uart.tx_pending(), 0);
    }

    #[test]
    fn capacity_is_shared_across_drivers() {
        let registry: SharedRegistry<2> = SharedRegistry::new();
        let uarts: Vec<_> = (0..3).map(leaked_uart).collect();

        assert!(registry.with(|r| uarts[0].init(r)).is_ok());
        assert!(registry.with(|r| uarts[1].init(r)).is_ok());
        assert!(registry.with(|r| uarts[2].init(r)).is_err());
        assert_eq!(registry.with(|r| r.len()), 2);
    }
}
