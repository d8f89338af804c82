/// One wire communication error type.
#[derive(Debug, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    Other(E),
    /// No presence pulse was observed inside the presence window after a reset.
    PresenceTimeout,
    /// The line stayed low after the reset cycle ended.
    ShortCircuit,
    /// A bounded busy-poll ran out of attempts before the device signaled completion.
    Timeout,
    /// Computed CRC of a ROM or scratchpad is invalid.
    InvalidCrc,
    /// Indicates that the operation is not implemented, such as switching to overdrive on a master
    /// that only runs at standard speed.
    Unimplemented,
    /// The bus is in overdrive mode, where ROM search is not supported.
    BusInvalidSpeed,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}
