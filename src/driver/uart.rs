//! Interrupt/DMA-driven UART over a pair of ring buffers.
//!
//! # Transmit path
//!
//! ```text
//! enqueue ──► tx ring ──► (engine idle) pump ──► start_burst_transfer(tail, run)
//!                              ▲                          │
//!                              │                  half-complete: skip ceil(run/2)
//!                              └──────────────── complete: skip the rest, pump again
//! ```
//!
//! The engine reads the run straight out of ring storage, so bytes are only
//! retired (the tail advanced) once the engine reports it has moved past
//! them. A run never wraps: it is clamped to the end of storage and the
//! wrapped part goes out as the next run.
//!
//! # Receive path
//!
//! Reception is armed one byte at a time into a scratch byte owned by the
//! driver. Each byte-received notification pushes that byte into the rx ring
//! and re-arms immediately; a missed re-arm would stall reception for good.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use super::config::{State, UartConfig};
use super::error::{ConfigError, ConfigResult, IoError, IoResult, Result};
use super::registry::{UartEvents, UartRegistry};
use super::stats::{StatCounters, UartStats};
use super::writer::UartWriter;
use crate::hal::{EngineId, SerialEngine};
use crate::internal::constants::MIN_STORAGE_SIZE;
use crate::ring::{BufferLock, NoLock, RingBuffer};
use crate::sync::CriticalSectionCell;

/// Non-blocking UART driver moving opaque byte streams.
///
/// # Type Parameters
/// * `E` - Hardware engine
/// * `RxL` - Lock strategy of the receive ring
/// * `TxL` - Lock strategy of the transmit ring
///
/// The application allocates the ring storage (usually in `static`s) and
/// hands both rings over. From then on they are reachable only through the
/// driver. A side whose lock strategy does not lock is serialized with a
/// critical section, so `enqueue` may be called from several contexts even
/// over [`NoLock`] rings.
///
/// # Example
///
/// ```ignore
/// static UART1: StaticCell<AsyncUart<'static, Usart1Dma>> = StaticCell::new();
/// ph_uart_dma::uart_registry_static!(REGISTRY);
///
/// let rx = RingBuffer::new(rx_storage)?;
/// let tx = RingBuffer::new(tx_storage)?;
/// let uart = UART1.init(AsyncUart::new(engine, rx, tx, UartConfig::new())?);
/// REGISTRY.with(|registry| uart.init(registry))?;
///
/// uart.enqueue(b"Hello from UART1!\r\n")?;
///
/// #[interrupt]
/// fn DMA1_CHANNEL4() {
///     REGISTRY.on_burst_complete(EngineId::new(USART1_BASE));
/// }
/// ```
pub struct AsyncUart<'a, E: SerialEngine, RxL: BufferLock = NoLock, TxL: BufferLock = NoLock> {
    /// Identity of the bound engine
    id: EngineId,
    /// Engine, shared between the main context and notification handlers
    engine: CriticalSectionCell<E>,
    /// Receive ring (notification context writes, main context reads)
    rx: RingBuffer<'a, RxL>,
    /// Transmit ring (main context writes, notification context retires)
    tx: RingBuffer<'a, TxL>,
    /// Destination of the armed single-byte reception
    rx_byte: UnsafeCell<u8>,
    /// Length of the run the engine is reading, 0 when idle
    active_len: AtomicUsize,
    /// Bytes of the live run already retired
    retired: AtomicUsize,
    /// Raw [`State`]
    state: AtomicU8,
    config: UartConfig,
    stats: StatCounters,
}

// SAFETY: the rings are owned and never handed out. Every ring side is
// driven either from inside the engine critical section (handlers, pump,
// clears) or from the caller API, which takes a critical section unless the
// side's lock already serializes it. `rx_byte` is written only by the engine
// between arming and the byte-received notification, and read only by that
// handler inside the critical section before it re-arms. The remaining
// state is atomic.
unsafe impl<E, RxL, TxL> Sync for AsyncUart<'_, E, RxL, TxL>
where
    E: SerialEngine + Send,
    RxL: BufferLock + Send + Sync,
    TxL: BufferLock + Send + Sync,
{
}

impl<'a, E: SerialEngine, RxL: BufferLock, TxL: BufferLock> AsyncUart<'a, E, RxL, TxL> {
    /// Bind `engine` to its receive and transmit rings.
    ///
    /// The driver is inert until [`init`](Self::init) registers it and arms
    /// reception.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidArgument`] if either ring has less than
    /// [`MIN_STORAGE_SIZE`](crate::constants::MIN_STORAGE_SIZE) bytes of
    /// storage (unbound, or a single byte).
    pub fn new(
        engine: E,
        rx: RingBuffer<'a, RxL>,
        tx: RingBuffer<'a, TxL>,
        config: UartConfig,
    ) -> ConfigResult<Self> {
        if rx.size() < MIN_STORAGE_SIZE || tx.size() < MIN_STORAGE_SIZE {
            return Err(ConfigError::InvalidArgument);
        }

        Ok(Self {
            id: engine.id(),
            engine: CriticalSectionCell::new(engine),
            rx,
            tx,
            rx_byte: UnsafeCell::new(0),
            active_len: AtomicUsize::new(0),
            retired: AtomicUsize::new(0),
            state: AtomicU8::new(State::Uninitialized as u8),
            config,
            stats: StatCounters::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Identity of the bound engine
    #[inline(always)]
    pub fn engine_id(&self) -> EngineId {
        self.id
    }

    /// Current lifecycle state
    #[inline]
    pub fn state(&self) -> State {
        State::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Configuration in use
    #[inline(always)]
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Bytes queued for transmission, including the unretired part of the
    /// live run
    #[inline]
    pub fn tx_pending(&self) -> usize {
        self.tx.used()
    }

    /// Bytes received and not yet dequeued
    #[inline]
    pub fn rx_available(&self) -> usize {
        self.rx.used()
    }

    /// Length of the run the engine is reading, 0 when idle
    #[inline]
    pub fn tx_in_flight(&self) -> usize {
        self.active_len.load(Ordering::Acquire)
    }

    /// Snapshot of the transfer counters
    pub fn stats(&self) -> UartStats {
        self.stats.snapshot()
    }

    /// Run `f` with exclusive access to the engine, interrupts masked.
    ///
    /// Must not be called from inside a notification handler of this
    /// driver.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        self.engine.with(f)
    }

    /// `core::fmt::Write` adapter over [`enqueue`](Self::enqueue)
    pub fn writer(&self) -> UartWriter<'_, 'a, E, RxL, TxL> {
        UartWriter::new(self)
    }

    // =========================================================================
    // Caller API
    // =========================================================================

    /// Queue `data` for transmission; returns the number of bytes accepted.
    ///
    /// Fewer bytes than `data.len()` are accepted when the transmit ring is
    /// short on space; the caller retries or drops the rest. Starts a burst
    /// right away if the engine is idle and `start_on_enqueue` is set.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidArgument`] if `data` is empty
    /// - [`IoError::NotInitialized`] before [`init`](Self::init)
    pub fn enqueue(&self, data: &[u8]) -> IoResult<usize> {
        if data.is_empty() {
            return Err(IoError::InvalidArgument);
        }
        self.ensure_ready()?;

        let accepted = if TxL::WRITE_LOCKED {
            self.tx.write(data)
        } else {
            critical_section::with(|_| self.tx.write(data))
        };
        if self.config.start_on_enqueue {
            self.kick()?;
        }
        Ok(accepted)
    }

    /// Move received bytes into `out`; returns the number delivered (0 if
    /// nothing is pending).
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidArgument`] if `out` is empty
    /// - [`IoError::NotInitialized`] before [`init`](Self::init)
    pub fn dequeue(&self, out: &mut [u8]) -> IoResult<usize> {
        if out.is_empty() {
            return Err(IoError::InvalidArgument);
        }
        self.ensure_ready()?;

        if RxL::READ_LOCKED {
            Ok(self.rx.read(out))
        } else {
            Ok(critical_section::with(|_| self.rx.read(out)))
        }
    }

    /// Start a burst if the engine is idle and data is pending; returns
    /// whether one was started.
    ///
    /// # Errors
    ///
    /// [`IoError::NotInitialized`] before [`init`](Self::init).
    pub fn kick(&self) -> IoResult<bool> {
        self.ensure_ready()?;

        Ok(self.engine.with(|engine| {
            // A pending completion notification still owns the live run even
            // if the engine already reports idle.
            if engine.is_tx_idle() && self.active_len.load(Ordering::Acquire) == 0 {
                self.pump(engine)
            } else {
                false
            }
        }))
    }

    /// Discard everything queued for transmission.
    ///
    /// # Errors
    ///
    /// [`IoError::TransferInFlight`] while the engine is reading from the
    /// transmit ring.
    pub fn clear_tx(&self) -> IoResult<()> {
        self.engine.with(|_| {
            if self.active_len.load(Ordering::Acquire) != 0 {
                return Err(IoError::TransferInFlight);
            }
            self.tx.clear();
            Ok(())
        })
    }

    /// Discard everything received and not yet dequeued.
    ///
    /// The armed scratch byte is not part of the ring, so reception carries
    /// on undisturbed.
    pub fn clear_rx(&self) {
        self.engine.with(|_| self.rx.clear());
    }

    // =========================================================================
    // Notification handlers
    // =========================================================================

    /// Byte-received handler: store the scratch byte, then re-arm.
    ///
    /// A byte that does not fit in the receive ring is dropped and counted
    /// as an overrun.
    pub fn on_byte_received(&self) {
        self.engine.with(|engine| {
            // SAFETY: the engine wrote the scratch byte before raising this
            // notification and does not touch it again until re-armed below.
            let byte = unsafe { self.rx_byte.get().read_volatile() };
            let stored = self.rx.write(&[byte]) == 1;
            self.stats.record_rx(stored);

            if !stored {
                #[cfg(feature = "defmt")]
                defmt::trace!("uart {}: rx overrun", self.id);

                #[cfg(feature = "log")]
                log::trace!("uart {:?}: rx overrun", self.id);
            }

            if let Err(_e) = self.arm_receive(engine) {
                #[cfg(feature = "defmt")]
                defmt::error!("uart {}: rx re-arm failed: {}", self.id, _e);

                #[cfg(feature = "log")]
                log::error!("uart {:?}: rx re-arm failed: {}", self.id, _e);
            }
        });
    }

    /// Half-complete handler: retire the first `ceil(n/2)` bytes of the live
    /// `n`-byte run.
    ///
    /// Does not touch `active_len` and does not restart the pump; the other
    /// half is still in flight. Ignored when `half_retire` is disabled.
    pub fn on_burst_half_complete(&self) {
        if !self.config.half_retire {
            return;
        }

        self.engine.with(|_| {
            let active = self.active_len.load(Ordering::Acquire);
            if active == 0 || self.retired.load(Ordering::Acquire) != 0 {
                return;
            }
            let retired = self.tx.skip(active.div_ceil(2));
            self.retired.store(retired, Ordering::Release);
        });
    }

    /// Completion handler: retire what is left of the live run, mark the
    /// engine idle and start the next run if data is pending.
    pub fn on_burst_complete(&self) {
        self.engine.with(|engine| {
            let active = self.active_len.load(Ordering::Acquire);
            if active != 0 {
                let retired = self.retired.load(Ordering::Acquire);
                self.tx.skip(active.saturating_sub(retired));
                self.retired.store(0, Ordering::Release);
                self.active_len.store(0, Ordering::Release);
            }
            self.pump(engine);
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[inline]
    fn ensure_ready(&self) -> IoResult<()> {
        match self.state() {
            State::Ready => Ok(()),
            State::Uninitialized => Err(IoError::NotInitialized),
        }
    }

    /// Issue the next contiguous run from the tx tail. Caller holds the
    /// engine and has checked that no run is live.
    fn pump(&self, engine: &mut E) -> bool {
        let len = self.tx.readable_contiguous();
        if len == 0 {
            return false;
        }

        let src = self.tx.peek_read_ptr();
        self.retired.store(0, Ordering::Release);
        self.active_len.store(len, Ordering::Release);

        // SAFETY: `src..src + len` is occupied in the tx ring and stays so
        // until the half/complete handlers retire it. The producer only
        // writes free slots, and `clear_tx` refuses while `active_len != 0`.
        match unsafe { engine.start_burst_transfer(src, len) } {
            Ok(()) => {
                self.stats.record_burst(len);
                true
            }
            Err(_e) => {
                self.active_len.store(0, Ordering::Release);
                self.stats.record_start_failure();

                #[cfg(feature = "defmt")]
                defmt::warn!("uart {}: burst of {} bytes refused: {}", self.id, len, _e);

                #[cfg(feature = "log")]
                log::warn!("uart {:?}: burst of {} bytes refused: {}", self.id, len, _e);

                false
            }
        }
    }

    fn arm_receive(&self, engine: &mut E) -> IoResult<()> {
        // SAFETY: `rx_byte` lives as long as the driver, which stays
        // borrowed by the registry while reception is armed.
        unsafe { engine.arm_single_byte_receive(self.rx_byte.get()) }
    }
}

impl<'a, E, RxL, TxL> AsyncUart<'a, E, RxL, TxL>
where
    E: SerialEngine + Send + 'a,
    RxL: BufferLock + Send + Sync + 'a,
    TxL: BufferLock + Send + Sync + 'a,
{
    /// Register with `registry` and arm the first single-byte reception.
    ///
    /// On any error the driver is left inert: nothing registered, nothing
    /// armed.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AlreadyInitialized`] on a second call
    /// - [`ConfigError::RegistryFull`] / [`ConfigError::DuplicateEngine`]
    ///   from the registry
    /// - [`IoError`] from the engine when reception cannot be armed
    pub fn init<const N: usize>(&'a self, registry: &mut UartRegistry<'a, N>) -> Result<()> {
        if self.state() != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        if let Err(e) = registry.register(self) {
            #[cfg(feature = "defmt")]
            defmt::warn!("uart {}: registration failed: {}", self.id, e);

            #[cfg(feature = "log")]
            log::warn!("uart {:?}: registration failed: {}", self.id, e);

            return Err(e.into());
        }

        self.retired.store(0, Ordering::Release);
        self.active_len.store(0, Ordering::Release);

        if let Err(e) = self.engine.with(|engine| self.arm_receive(engine)) {
            registry.unregister(self.id);
            return Err(e.into());
        }

        self.state.store(State::Ready as u8, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "uart {}: ready (rx {} B, tx {} B)",
            self.id,
            self.rx.capacity(),
            self.tx.capacity()
        );

        #[cfg(feature = "log")]
        log::info!(
            "uart {:?}: ready (rx {} B, tx {} B)",
            self.id,
            self.rx.capacity(),
            self.tx.capacity()
        );

        Ok(())
    }
}

impl<E, RxL, TxL> UartEvents for AsyncUart<'_, E, RxL, TxL>
where
    E: SerialEngine + Send,
    RxL: BufferLock + Send + Sync,
    TxL: BufferLock + Send + Sync,
{
    fn engine_id(&self) -> EngineId {
        self.id
    }

    fn on_byte_received(&self) {
        Self::on_byte_received(self);
    }

    fn on_burst_half_complete(&self) {
        Self::on_burst_half_complete(self);
    }

    fn on_burst_complete(&self) {
        Self::on_burst_complete(self);
    }
}

impl<E: SerialEngine, RxL: BufferLock, TxL: BufferLock> core::fmt::Debug
    for AsyncUart<'_, E, RxL, TxL>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AsyncUart")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("active_len", &self.tx_in_flight())
            .field("tx_pending", &self.tx_pending())
            .field("rx_available", &self.rx_available())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
