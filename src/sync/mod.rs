//! Synchronization Support
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], ISR-safe
//!   interior mutability
//! - **Shared Wrappers** (`shared`): [`SharedRegistry`], an instance registry
//!   that interrupt handlers can reach through a `static`
//!
//! # Example
//!
//! ```ignore
//! use ph_uart_dma::sync::SharedRegistry;
//!
//! static REGISTRY: SharedRegistry = SharedRegistry::new();
//!
//! fn main() {
//!     REGISTRY.with(|registry| UART1.init(registry)).unwrap();
//! }
//!
//! #[interrupt]
//! fn DMA1_CHANNEL4() {
//!     REGISTRY.on_burst_complete(USART1_ID);
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedRegistry;
