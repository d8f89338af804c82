use crate::transport::BusFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// DS1307 driver errors
pub enum Ds1307Error {
    /// The transport reported a fault through its event channel.
    Bus(BusFault),
    /// The transport did not accept the transfer within the retry budget.
    TransportBusy,
    /// The transfer was accepted but its completion was never signaled.
    Timeout,
    /// Time value outside the ranges the chip can hold.
    InvalidTime,
    /// Date value outside the ranges the chip can hold.
    InvalidDate,
    /// Access outside the battery-backed RAM.
    InvalidAddress,
}

impl From<BusFault> for Ds1307Error {
    fn from(value: BusFault) -> Self {
        Self::Bus(value)
    }
}
