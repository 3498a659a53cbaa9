//! Centralized Constants
//!
//! Single source of truth for the compile-time bounds used by the ring
//! buffers, the driver and the instance registry.

// =============================================================================
// Instance Registry
// =============================================================================

/// Number of driver instances the default registry can route notifications to
pub const REGISTRY_CAPACITY: usize = 8;

// =============================================================================
// Default Buffer Sizes
// =============================================================================

/// Default receive ring storage size in bytes (255 usable)
pub const DEFAULT_RX_BUFFER_SIZE: usize = 256;

/// Default transmit ring storage size in bytes (255 usable)
pub const DEFAULT_TX_BUFFER_SIZE: usize = 256;

/// Slots kept free in every ring so that `head == tail` always means empty
pub const RESERVED_SLOTS: usize = 1;

/// Smallest storage that can hold at least one byte of payload
pub const MIN_STORAGE_SIZE: usize = RESERVED_SLOTS + 1;

// =============================================================================
// Caller-side Polling
// =============================================================================

/// Default interval between polls in the blocking helpers (microseconds)
pub const POLL_INTERVAL_US: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffers_leave_payload_room() {
        assert!(DEFAULT_RX_BUFFER_SIZE >= MIN_STORAGE_SIZE);
        assert!(DEFAULT_TX_BUFFER_SIZE >= MIN_STORAGE_SIZE);
    }

    #[test]
    fn registry_capacity_is_bounded() {
        assert_eq!(REGISTRY_CAPACITY, 8);
    }
}
