//! Transfer statistics.

use core::sync::atomic::{AtomicU32, Ordering};

/// Snapshot of a driver's transfer counters.
///
/// Counters wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartStats {
    /// Bursts handed to the engine
    pub tx_bursts: u32,
    /// Bytes handed to the engine
    pub tx_bytes: u32,
    /// Bytes stored in the receive buffer
    pub rx_bytes: u32,
    /// Received bytes dropped because the receive buffer was full
    pub rx_overruns: u32,
    /// Bursts the engine refused to start
    pub start_failures: u32,
}

/// Live counters.
///
/// Each counter has one writer: transmit counters are bumped inside the
/// engine's critical section, receive counters only from the byte-received
/// handler. Load/store is enough and works on cores without atomic RMW.
pub(crate) struct StatCounters {
    tx_bursts: AtomicU32,
    tx_bytes: AtomicU32,
    rx_bytes: AtomicU32,
    rx_overruns: AtomicU32,
    start_failures: AtomicU32,
}

#[inline(always)]
fn bump(counter: &AtomicU32, by: u32) {
    let value = counter.load(Ordering::Relaxed).wrapping_add(by);
    counter.store(value, Ordering::Relaxed);
}

impl StatCounters {
    pub(crate) const fn new() -> Self {
        Self {
            tx_bursts: AtomicU32::new(0),
            tx_bytes: AtomicU32::new(0),
            rx_bytes: AtomicU32::new(0),
            rx_overruns: AtomicU32::new(0),
            start_failures: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_burst(&self, len: usize) {
        bump(&self.tx_bursts, 1);
        bump(&self.tx_bytes, len as u32);
    }

    pub(crate) fn record_start_failure(&self) {
        bump(&self.start_failures, 1);
    }

    pub(crate) fn record_rx(&self, stored: bool) {
        if stored {
            bump(&self.rx_bytes, 1);
        } else {
            bump(&self.rx_overruns, 1);
        }
    }

    pub(crate) fn snapshot(&self) -> UartStats {
        UartStats {
            tx_bursts: self.tx_bursts.load(Ordering::Relaxed),
            tx_bytes: self.tx_bytes.load(Ordering::Relaxed),
            rx_bytes: self.rx_bytes.load(Ordering::Relaxed),
            rx_overruns: self.rx_overruns.load(Ordering::Relaxed),
            start_failures: self.start_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(StatCounters::new().snapshot(), UartStats::default());
    }

    #[test]
    fn record_burst_counts_bursts_and_bytes() {
        let counters = StatCounters::new();
        counters.record_burst(8);
        counters.record_burst(3);

        let stats = counters.snapshot();
        assert_eq!(stats.tx_bursts, 2);
        assert_eq!(stats.tx_bytes, 11);
    }

    #[test]
    fn record_rx_splits_stored_and_dropped() {
        let counters = StatCounters::new();
        counters.record_rx(true);
        counters.record_rx(true);
        counters.record_rx(false);
        counters.record_start_failure();

        let stats = counters.snapshot();
        assert_eq!(stats.rx_bytes, 2);
        assert_eq!(stats.rx_overruns, 1);
        assert_eq!(stats.start_failures, 1);
    }

    #[test]
    fn counters_wrap() {
        let counters = StatCounters::new();
        counters.tx_bytes.store(u32::MAX, Ordering::Relaxed);
        counters.record_burst(2);
        assert_eq!(counters.snapshot().tx_bytes, 1);
    }
}
