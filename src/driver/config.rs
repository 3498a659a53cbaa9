//! Configuration types for the async UART driver

/// Driver configuration
///
/// Built with `const` builder methods so it can be assembled in a `static`.
///
/// # Example
///
/// ```
/// use ph_uart_dma::UartConfig;
///
/// // Engine whose midpoint notification is not trustworthy:
/// // retire everything on completion instead.
/// let config = UartConfig::new().with_half_retire(false);
/// assert!(!config.half_retire);
/// assert!(config.start_on_enqueue);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Retire the first `ceil(n/2)` bytes of an `n`-byte burst on the
    /// half-complete notification.
    ///
    /// When disabled the half-complete notification is ignored and the whole
    /// burst is retired on completion.
    pub half_retire: bool,
    /// Start a burst from `enqueue` when the transmit engine is idle.
    ///
    /// When disabled, bursts start only from completion notifications or an
    /// explicit `kick`.
    pub start_on_enqueue: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl UartConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            half_retire: true,
            start_on_enqueue: true,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Enable or disable retirement on the half-complete notification
    #[must_use]
    pub const fn with_half_retire(mut self, enabled: bool) -> Self {
        self.half_retire = enabled;
        self
    }

    /// Enable or disable starting bursts from `enqueue`
    #[must_use]
    pub const fn with_start_on_enqueue(mut self, enabled: bool) -> Self {
        self.start_on_enqueue = enabled;
        self
    }
}

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum State {
    /// Constructed but not registered; reception not armed
    #[default]
    Uninitialized = 0,
    /// Registered and receiving
    Ready = 1,
}

impl State {
    /// Decode from the raw value kept in the driver's atomic
    pub(crate) const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => State::Ready,
            _ => State::Uninitialized,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
