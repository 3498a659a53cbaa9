//! Hardware Abstraction Layer
//!
//! The driver reaches the peripheral only through the traits here.
//!
//! # Modules
//!
//! - [`engine`]: The [`SerialEngine`] seam a HAL implements per UART
//! - [`poll`]: Blocking caller-side helpers with timeouts
//!
//! # Delay Integration
//!
//! The polling helpers use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod engine;
pub mod poll;

// Re-export commonly used types
pub use engine::{EngineId, SerialEngine};
