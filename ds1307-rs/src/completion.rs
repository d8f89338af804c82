use core::sync::atomic::{AtomicU8, Ordering};

use crate::transport::{BusFault, I2cEvent, I2cEventHandler};

const IDLE: u8 = 0;
const IN_PROGRESS: u8 = 1;
const COMPLETE: u8 = 2;
const FAILED: u8 = 0x80;

/// Lifecycle of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Nothing started yet.
    Idle,
    /// Started by the driver, waiting for the transport.
    InProgress,
    /// Finished successfully.
    Complete,
    /// Finished with a fault.
    Failed(BusFault),
}

/// A one-transfer completion signal shared between the driver and an event handler.
///
/// Only plain atomic loads and stores are used, so it works on cores without compare-and-swap.
/// Events carry no transfer tag: a completion is attributed to whichever transfer is running
/// when it arrives.
#[derive(Debug)]
pub struct Completion(AtomicU8);

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl Completion {
    /// An idle completion.
    pub const fn new() -> Self {
        Self(AtomicU8::new(IDLE))
    }

    /// Current state.
    pub fn state(&self) -> TransferState {
        match self.0.load(Ordering::Acquire) {
            IDLE => TransferState::Idle,
            IN_PROGRESS => TransferState::InProgress,
            COMPLETE => TransferState::Complete,
            code => TransferState::Failed(BusFault::from_code(code & !FAILED)),
        }
    }

    /// Whether a transfer is waiting for its completion.
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire) == IN_PROGRESS
    }

    pub(crate) fn start(&self) {
        self.0.store(IN_PROGRESS, Ordering::Release);
    }

    pub(crate) fn cancel(&self) {
        self.0.store(IDLE, Ordering::Release);
    }

    /// Marks the transfer as finished.
    pub fn complete(&self) {
        self.0.store(COMPLETE, Ordering::Release);
    }

    /// Marks the transfer as failed.
    pub fn fail(&self, fault: BusFault) {
        self.0.store(FAILED | fault as u8, Ordering::Release);
    }
}

/// The write and read completion signals of one RTC handle.
///
/// Register it with the transport through [`I2cTransport::register_handler`](crate::I2cTransport::register_handler);
/// the driver does this in [`Ds1307::init`](crate::Ds1307::init).
///
/// ```ignore
/// static FLAGS: TransferFlags = TransferFlags::new();
/// let mut rtc = Ds1307::new(transport, delay, &FLAGS);
/// ```
#[derive(Debug, Default)]
pub struct TransferFlags {
    /// Write in flight.
    pub tx: Completion,
    /// Read in flight.
    pub rx: Completion,
}

impl TransferFlags {
    /// Both directions idle.
    pub const fn new() -> Self {
        Self {
            tx: Completion::new(),
            rx: Completion::new(),
        }
    }
}

impl I2cEventHandler for TransferFlags {
    fn on_event(&self, event: I2cEvent) {
        match event {
            I2cEvent::TxComplete => self.tx.complete(),
            I2cEvent::RxComplete => self.rx.complete(),
            I2cEvent::Error(fault) => {
                // The error interrupt does not say which direction was running.
                for completion in [&self.tx, &self.rx] {
                    if completion.is_pending() {
                        completion.fail(fault);
                    }
                }
            }
        }
    }
}
