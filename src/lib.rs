//! Interrupt/DMA-driven UART pipeline
//!
//! A `no_std`, `no_alloc` driver that moves opaque byte streams between an
//! application and UART peripherals through statically allocated ring
//! buffers.
//!
//! # Architecture
//!
//! 1. **Ring Layer** ([`ring`]): Bounded circular byte buffers over
//!    caller-owned storage, with a build-time lock strategy per side
//! 2. **Driver Layer** ([`driver`]): [`AsyncUart`] bursts the transmit ring
//!    out through the engine and fills the receive ring one byte at a time;
//!    [`UartRegistry`] routes hardware notifications back to the right
//!    instance
//! 3. **HAL Layer** ([`hal`]): The [`SerialEngine`] trait a HAL implements,
//!    plus blocking caller-side helpers
//!
//! The driver never blocks, never retries and never drops queued data on its
//! own. A short `enqueue` is the backpressure signal.
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging and formatting for public types
//! - `log`: Enable logging through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! use ph_uart_dma::{AsyncUart, EngineId, RingBuffer, UartConfig};
//!
//! ph_uart_dma::uart_registry_static!(REGISTRY);
//!
//! static mut RX_STORAGE: [u8; 256] = [0; 256];
//! static mut TX_STORAGE: [u8; 256] = [0; 256];
//!
//! let rx = RingBuffer::new(unsafe { &mut *addr_of_mut!(RX_STORAGE) })?;
//! let tx = RingBuffer::new(unsafe { &mut *addr_of_mut!(TX_STORAGE) })?;
//! let uart = UART1.init(AsyncUart::new(usart1_dma, rx, tx, UartConfig::new())?);
//! REGISTRY.with(|registry| uart.init(registry))?;
//!
//! uart.enqueue(b"Hello from UART1!\r\n")?;
//!
//! let mut line = [0u8; 64];
//! let n = uart.dequeue(&mut line)?;
//! ```
//!
//! # Memory Requirements
//!
//! Nothing is allocated. Each driver owns its two ring handles, one scratch
//! byte and a handful of atomics; ring storage is whatever the application
//! hands over (256 bytes per direction by default, see [`constants`]).

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here and in the `[lints]` table of Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod ring;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{State, UartConfig};
pub use driver::error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use driver::registry::{Notification, UartEvents, UartRegistry};
pub use driver::stats::UartStats;
pub use driver::uart::AsyncUart;
pub use driver::writer::UartWriter;
pub use hal::{EngineId, SerialEngine};
pub use ring::{BufferLock, CriticalSectionLock, NoLock, RingBuffer, SharedLock};
pub use sync::SharedRegistry;

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Ring sizes
        DEFAULT_RX_BUFFER_SIZE,
        DEFAULT_TX_BUFFER_SIZE,
        MIN_STORAGE_SIZE,
        // Timing
        POLL_INTERVAL_US,
        // Registry
        REGISTRY_CAPACITY,
        RESERVED_SLOTS,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe instance registry.
///
/// Expands to a [`SharedRegistry`] static that drivers register with during
/// init and interrupt handlers dispatch through.
///
/// # Examples
///
/// ```ignore
/// ph_uart_dma::uart_registry_static!(REGISTRY);
///
/// REGISTRY.with(|registry| uart.init(registry)).unwrap();
///
/// #[interrupt]
/// fn USART1() {
///     REGISTRY.on_byte_received(USART1_ID);
/// }
/// ```
#[macro_export]
macro_rules! uart_registry_static {
    ($name:ident) => {
        $crate::uart_registry_static!($name, $crate::constants::REGISTRY_CAPACITY);
    };
    ($name:ident, $capacity:expr) => {
        static $name: $crate::sync::SharedRegistry<{ $capacity }> =
            $crate::sync::SharedRegistry::new();
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    uart_registry_static!(DEFAULT_REGISTRY);
    uart_registry_static!(SMALL_REGISTRY, 2);

    #[test]
    fn registry_macro_declares_empty_statics() {
        assert_eq!(DEFAULT_REGISTRY.with(|r| r.capacity()), constants::REGISTRY_CAPACITY);
        assert_eq!(SMALL_REGISTRY.with(|r| r.capacity()), 2);
        assert!(!SMALL_REGISTRY.on_burst_complete(EngineId::new(0)));
    }
}
