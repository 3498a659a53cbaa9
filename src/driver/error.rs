//! Error types for the UART DMA pipeline
//!
//! Errors are organized by domain:
//! - [`ConfigError`]: Buffer binding, driver initialization and registry failures
//! - [`IoError`]: Runtime transmit/receive failures
//!
//! The unified [`Error`] enum wraps both and is returned where a call can
//! fail for either reason.
//!
//! A short transfer is not an error. `enqueue`, `dequeue` and the ring buffer
//! operations return the number of bytes actually moved, which may be less
//! than requested under backpressure or when no data is pending.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Initialization and registration errors
///
/// A driver whose `init` fails with one of these is left inert: nothing is
/// registered and reception is not armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage or buffer argument has zero capacity
    InvalidArgument,
    /// Instance registry has no free slot
    RegistryFull,
    /// Another driver is already registered for the same engine
    DuplicateEngine,
    /// Driver already initialized
    AlreadyInitialized,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidArgument => "invalid argument",
            ConfigError::RegistryFull => "instance registry full",
            ConfigError::DuplicateEngine => "engine already registered",
            ConfigError::AlreadyInitialized => "already initialized",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime transmit/receive errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Empty data or output slice
    InvalidArgument,
    /// Driver has not been initialized
    NotInitialized,
    /// A burst transfer is reading from the buffer being cleared
    TransferInFlight,
    /// Hardware engine refused the request because it is busy
    EngineBusy,
    /// Hardware engine reported a fault
    EngineFault,
    /// Caller-side wait exceeded its budget
    Timeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::InvalidArgument => "invalid argument",
            IoError::NotInitialized => "driver not initialized",
            IoError::TransferInFlight => "transfer in flight",
            IoError::EngineBusy => "engine busy",
            IoError::EngineFault => "engine fault",
            IoError::Timeout => "operation timed out",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match uart.init(&mut registry) {
///     Err(Error::Config(ConfigError::RegistryFull)) => { /* ... */ }
///     Err(Error::Io(IoError::EngineBusy)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::InvalidArgument,
            ConfigError::RegistryFull,
            ConfigError::DuplicateEngine,
            ConfigError::AlreadyInitialized,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "ConfigError::{variant:?} has empty string");
        }
    }

    #[test]
    fn config_error_display() {
        assert_eq!(format!("{}", ConfigError::RegistryFull), "instance registry full");
    }

    #[test]
    fn io_error_as_str_non_empty() {
        let variants = [
            IoError::InvalidArgument,
            IoError::NotInitialized,
            IoError::TransferInFlight,
            IoError::EngineBusy,
            IoError::EngineFault,
            IoError::Timeout,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "IoError::{variant:?} has empty string");
        }
    }

    #[test]
    fn io_error_display() {
        assert_eq!(format!("{}", IoError::TransferInFlight), "transfer in flight");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::DuplicateEngine.into();
        assert_eq!(err, Error::Config(ConfigError::DuplicateEngine));
    }

    #[test]
    fn error_from_io_error() {
        let err: Error = IoError::EngineBusy.into();
        assert_eq!(err, Error::Io(IoError::EngineBusy));
    }

    #[test]
    fn error_display_prefixes_domain() {
        let config = format!("{}", Error::Config(ConfigError::RegistryFull));
        assert!(config.starts_with("config:"));
        assert!(config.contains("registry"));

        let io = format!("{}", Error::Io(IoError::Timeout));
        assert!(io.starts_with("io:"));
        assert!(io.contains("timed out"));
    }

    #[test]
    fn question_mark_converts_domain_errors() {
        fn init_like() -> Result<()> {
            Err::<(), _>(ConfigError::AlreadyInitialized)?;
            Ok(())
        }

        fn io_like() -> Result<()> {
            Err::<(), _>(IoError::NotInitialized)?;
            Ok(())
        }

        assert_eq!(init_like(), Err(Error::Config(ConfigError::AlreadyInitialized)));
        assert_eq!(io_like(), Err(Error::Io(IoError::NotInitialized)));
    }
}
