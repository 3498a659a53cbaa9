//! Hardware engine seam.
//!
//! The driver never touches registers. It talks to the UART/DMA peripheral
//! through [`SerialEngine`], implemented once per HAL.

use crate::driver::error::IoResult;

/// Identity of a hardware engine, used as the registry key.
///
/// Typically the peripheral's base address or instance number; anything that
/// is unique per engine works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineId(pub usize);

impl EngineId {
    /// Create an engine id from a raw value
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw value of this id
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// UART peripheral with a burst (DMA) transmitter and a single-byte
/// interrupt receiver.
///
/// Progress is reported back asynchronously. The HAL's interrupt handlers
/// forward these to the driver, usually through a
/// [`UartRegistry`](crate::UartRegistry):
///
/// - burst half-complete: the engine has read the first half of the run
/// - burst complete: the engine has read the whole run and is idle again
/// - byte received: the armed destination holds a new byte
///
/// # Example
///
/// ```ignore
/// struct Usart1Dma { /* HAL handles */ }
///
/// impl SerialEngine for Usart1Dma {
///     fn id(&self) -> EngineId {
///         EngineId::new(0x4001_3800)
///     }
///
///     fn is_tx_idle(&self) -> bool {
///         !self.tx_channel.is_enabled()
///     }
///
///     unsafe fn start_burst_transfer(&mut self, src: *const u8, len: usize) -> IoResult<()> {
///         self.tx_channel.start(src, len).map_err(|_| IoError::EngineBusy)
///     }
///
///     unsafe fn arm_single_byte_receive(&mut self, dst: *mut u8) -> IoResult<()> {
///         self.rx_target = dst;
///         self.usart.listen_rxne();
///         Ok(())
///     }
/// }
/// ```
pub trait SerialEngine {
    /// Identity used to route notifications back to the owning driver
    fn id(&self) -> EngineId;

    /// True when the transmitter has no burst in flight
    fn is_tx_idle(&self) -> bool;

    /// Begin an asynchronous burst of `len` bytes read from `src`.
    ///
    /// # Safety
    ///
    /// `src..src + len` stays valid and unmodified until the engine reports
    /// completion. The caller guarantees that; the engine may read it at any
    /// point until then.
    ///
    /// # Errors
    ///
    /// [`IoError::EngineBusy`](crate::IoError::EngineBusy) or
    /// [`IoError::EngineFault`](crate::IoError::EngineFault) when the
    /// transfer could not be started.
    unsafe fn start_burst_transfer(&mut self, src: *const u8, len: usize) -> IoResult<()>;

    /// Arm reception of exactly one byte into `dst`.
    ///
    /// Must be reissued after every byte-received notification.
    ///
    /// # Safety
    ///
    /// `dst` stays valid for writes until the byte-received notification.
    ///
    /// # Errors
    ///
    /// [`IoError::EngineBusy`](crate::IoError::EngineBusy) or
    /// [`IoError::EngineFault`](crate::IoError::EngineFault) when reception
    /// could not be armed.
    unsafe fn arm_single_byte_receive(&mut self, dst: *mut u8) -> IoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_id_round_trips() {
        let id = EngineId::new(0x4001_3800);
        assert_eq!(id.raw(), 0x4001_3800);
        assert_eq!(id, EngineId(0x4001_3800));
        assert_ne!(id, EngineId::new(0x4000_4400));
    }
}
