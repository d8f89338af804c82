use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::trace;

/// Largest single transfer [`BlockingTransport`] can hold back or receive.
pub const TRANSFER_CAPACITY: usize = 64;

/// Whether a transfer keeps bus ownership for a following transfer in the other direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatedStart {
    /// Finish with a repeated start, the bus stays owned.
    Enable,
    /// Finish with a STOP condition.
    Disable,
}

/// Answer of a transport to a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// The transfer was started. Its outcome arrives as an [`I2cEvent`].
    Accepted,
    /// The transport is still busy with an earlier transfer; retry later.
    Busy,
}

/// Faults a transport reports through its event channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// The target did not acknowledge its address or a data byte.
    AckFailure = 1,
    /// Another master won the bus.
    ArbitrationLoss = 2,
    /// Misplaced START or STOP condition.
    Bus = 3,
    /// Data was lost because it was not serviced in time.
    Overrun = 4,
    /// Anything else.
    Other = 5,
}

impl BusFault {
    pub(crate) const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::AckFailure,
            2 => Self::ArbitrationLoss,
            3 => Self::Bus,
            4 => Self::Overrun,
            _ => Self::Other,
        }
    }
}

impl From<ErrorKind> for BusFault {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::AckFailure,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLoss,
            ErrorKind::Bus => Self::Bus,
            ErrorKind::Overrun => Self::Overrun,
            _ => Self::Other,
        }
    }
}

/// Completion events raised by a transport, usually from its interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cEvent {
    /// A write finished.
    TxComplete,
    /// A read finished; the bytes are ready in [`I2cTransport::take_received`].
    RxComplete,
    /// The running transfer failed.
    Error(BusFault),
}

/// Receiver of [`I2cEvent`]s.
///
/// Called from interrupt context, so implementations must not block.
pub trait I2cEventHandler: Sync {
    /// Handles one event.
    fn on_event(&self, event: I2cEvent);
}

/// An I2C controller that runs transfers in the background and reports completion through a
/// registered [`I2cEventHandler`].
///
/// Pin muxing and clock setup happen before the transport is handed to a driver.
pub trait I2cTransport<'a> {
    /// Enables or disables the peripheral.
    fn peripheral_control(&mut self, enable: bool);

    /// Enables and prioritizes the event and error interrupts.
    fn enable_interrupts(&mut self) {}

    /// Stores the handler invoked for every [`I2cEvent`].
    fn register_handler(&mut self, handler: &'a dyn I2cEventHandler);

    /// Starts writing `bytes` to the 7-bit address `addr`.
    ///
    /// The transport copies `bytes` before returning [`TransferStatus::Accepted`].
    fn send(&mut self, addr: u8, bytes: &[u8], repeated_start: RepeatedStart) -> TransferStatus;

    /// Starts reading `len` bytes from the 7-bit address `addr`.
    fn receive(&mut self, addr: u8, len: usize, repeated_start: RepeatedStart) -> TransferStatus;

    /// Copies out the bytes of the last completed read. Returns the number of bytes copied.
    fn take_received(&mut self, buf: &mut [u8]) -> usize;

    /// Forces a STOP condition, abandoning the running transfer.
    ///
    /// No event for the abandoned transfer may be raised once this returns. The driver calls it
    /// after every fault or timeout, before it starts another transfer.
    fn generate_stop(&mut self);
}

/// [`I2cTransport`] over a blocking [`embedded_hal::i2c::I2c`] bus.
///
/// Transfers run to completion inside [`send`](I2cTransport::send) and
/// [`receive`](I2cTransport::receive), and the completion event is raised before those return. A
/// write with [`RepeatedStart::Enable`] is held back and issued as the write half of the next
/// read to the same address.
pub struct BlockingTransport<'a, I> {
    i2c: I,
    enabled: bool,
    handler: Option<&'a dyn I2cEventHandler>,
    pending: Option<(u8, usize, [u8; TRANSFER_CAPACITY])>,
    rx: [u8; TRANSFER_CAPACITY],
    rx_len: usize,
}

impl<I> BlockingTransport<'_, I> {
    /// Wraps a blocking bus. The transport starts disabled.
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            enabled: false,
            handler: None,
            pending: None,
            rx: [0; TRANSFER_CAPACITY],
            rx_len: 0,
        }
    }

    /// Returns the wrapped bus.
    pub fn release(self) -> I {
        self.i2c
    }

    fn notify(&self, event: I2cEvent) {
        trace!("I2C: {event:?}");
        if let Some(handler) = self.handler {
            handler.on_event(event);
        }
    }
}

impl<I: I2c> BlockingTransport<'_, I> {
    fn flush_pending(&mut self) -> Result<(), BusFault> {
        if let Some((addr, len, buf)) = self.pending.take() {
            self.i2c
                .write(addr, &buf[..len])
                .map_err(|e| BusFault::from(e.kind()))?;
        }
        Ok(())
    }
}

impl<'a, I: I2c> I2cTransport<'a> for BlockingTransport<'a, I> {
    fn peripheral_control(&mut self, enable: bool) {
        self.enabled = enable;
        if !enable {
            self.pending = None;
        }
    }

    fn register_handler(&mut self, handler: &'a dyn I2cEventHandler) {
        self.handler = Some(handler);
    }

    fn send(&mut self, addr: u8, bytes: &[u8], repeated_start: RepeatedStart) -> TransferStatus {
        if !self.enabled {
            return TransferStatus::Busy;
        }
        let outcome = match repeated_start {
            RepeatedStart::Enable if bytes.len() <= TRANSFER_CAPACITY => {
                self.flush_pending().map(|()| {
                    let mut buf = [0; TRANSFER_CAPACITY];
                    buf[..bytes.len()].copy_from_slice(bytes);
                    self.pending = Some((addr, bytes.len(), buf));
                })
            }
            RepeatedStart::Enable => Err(BusFault::Overrun),
            RepeatedStart::Disable => self.flush_pending().and_then(|()| {
                self.i2c
                    .write(addr, bytes)
                    .map_err(|e| BusFault::from(e.kind()))
            }),
        };
        self.notify(match outcome {
            Ok(()) => I2cEvent::TxComplete,
            Err(fault) => I2cEvent::Error(fault),
        });
        TransferStatus::Accepted
    }

    fn receive(&mut self, addr: u8, len: usize, _repeated_start: RepeatedStart) -> TransferStatus {
        if !self.enabled {
            return TransferStatus::Busy;
        }
        self.rx_len = 0;
        let outcome = if len > TRANSFER_CAPACITY {
            Err(BusFault::Overrun)
        } else {
            let rx = &mut self.rx[..len];
            let result = match self.pending.take() {
                Some((to, wlen, wbuf)) if to == addr => self.i2c.write_read(addr, &wbuf[..wlen], rx),
                Some((to, wlen, wbuf)) => self
                    .i2c
                    .write(to, &wbuf[..wlen])
                    .and_then(|()| self.i2c.read(addr, rx)),
                None => self.i2c.read(addr, rx),
            };
            result.map_err(|e| BusFault::from(e.kind()))
        };
        let event = match outcome {
            Ok(()) => {
                self.rx_len = len;
                I2cEvent::RxComplete
            }
            Err(fault) => I2cEvent::Error(fault),
        };
        self.notify(event);
        TransferStatus::Accepted
    }

    fn take_received(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.rx_len);
        buf[..n].copy_from_slice(&self.rx[..n]);
        self.rx_len = 0;
        n
    }

    fn generate_stop(&mut self) {
        // Every blocking transaction already ends with STOP; only the held-back write is left.
        self.pending = None;
    }
}
