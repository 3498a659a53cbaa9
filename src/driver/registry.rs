//! Instance registry routing hardware notifications to their driver.
//!
//! Interrupt handlers only know which engine fired. The registry maps that
//! [`EngineId`] back to the driver that owns the engine.
//!
//! The registry is an explicit context object rather than hidden global
//! state: place it wherever the interrupt handlers can reach it (for example
//! in a [`SharedRegistry`](crate::sync::SharedRegistry) static). Entries are
//! added during driver initialization, before notifications for that engine
//! can fire, and are only read afterwards.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::EngineId;
use crate::internal::constants::REGISTRY_CAPACITY;

/// Hardware notification kinds delivered to a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Armed single-byte reception completed
    ByteReceived,
    /// Burst transfer passed its midpoint
    BurstHalfComplete,
    /// Burst transfer finished
    BurstComplete,
}

/// Notification handlers of a driver instance.
///
/// Handlers run in interrupt context: they must be short and never block.
pub trait UartEvents: Sync {
    /// Engine this instance owns
    fn engine_id(&self) -> EngineId;

    /// The armed receive byte has arrived
    fn on_byte_received(&self);

    /// The live burst passed its midpoint
    fn on_burst_half_complete(&self);

    /// The live burst finished
    fn on_burst_complete(&self);

    /// Route `notification` to the matching handler
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::ByteReceived => self.on_byte_received(),
            Notification::BurstHalfComplete => self.on_burst_half_complete(),
            Notification::BurstComplete => self.on_burst_complete(),
        }
    }
}

/// Fixed-capacity map from engine identity to driver instance.
///
/// No duplicate keys; slot order carries no meaning.
pub struct UartRegistry<'a, const N: usize = REGISTRY_CAPACITY> {
    slots: [Option<&'a dyn UartEvents>; N],
}

impl<'a, const N: usize> UartRegistry<'a, N> {
    /// Create an empty registry (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Number of slots
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Add `uart` in the first free slot; returns the slot index.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateEngine`] if its engine is already registered
    /// - [`ConfigError::RegistryFull`] if every slot is taken
    pub fn register(&mut self, uart: &'a dyn UartEvents) -> ConfigResult<usize> {
        let id = uart.engine_id();
        if self.contains(id) {
            return Err(ConfigError::DuplicateEngine);
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(ConfigError::RegistryFull)?;
        *slot = Some(uart);
        Ok(index)
    }

    /// Remove the instance bound to `id`; returns whether one was removed.
    ///
    /// Only safe once the engine can no longer raise notifications.
    pub fn unregister(&mut self, id: EngineId) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|slot| slot.is_some_and(|uart| uart.engine_id() == id))
        {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Look up the instance bound to `id`
    pub fn find(&self, id: EngineId) -> Option<&'a dyn UartEvents> {
        self.slots
            .iter()
            .flatten()
            .copied()
            .find(|uart| uart.engine_id() == id)
    }

    /// True if an instance is bound to `id`
    pub fn contains(&self, id: EngineId) -> bool {
        self.find(id).is_some()
    }

    /// Deliver `notification` to the instance bound to `id`.
    ///
    /// Returns `false` if no instance owns that engine; the notification is
    /// dropped.
    pub fn dispatch(&self, id: EngineId, notification: Notification) -> bool {
        match self.find(id) {
            Some(uart) => {
                uart.notify(notification);
                true
            }
            None => false,
        }
    }
}

impl<const N: usize> Default for UartRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for UartRegistry<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().flatten().map(|uart| uart.engine_id()))
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
