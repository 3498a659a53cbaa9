//! Core driver components for the interrupt/DMA-driven UART.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`registry`] - Instance registry routing notifications to drivers
//! - [`uart`] - The driver itself
//!
//! # Example
//!
//! ```ignore
//! use ph_uart_dma::driver::{AsyncUart, UartConfig, UartRegistry};
//!
//! let config = UartConfig::new().with_half_retire(false);
//! let uart = AsyncUart::new(engine, rx, tx, config)?;
//! uart.init(&mut registry)?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod registry;
pub mod stats;
pub mod uart;
pub mod writer;

// Re-exports for convenience
pub use config::{State, UartConfig};
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use registry::{Notification, UartEvents, UartRegistry};
pub use stats::UartStats;
pub use uart::AsyncUart;
pub use writer::UartWriter;
