#![allow(async_fn_in_trait)]
use crate::{OneWireError, OneWireResult, OneWireStatus, consts};

/// Asynchronous twin of [`OneWire`](crate::OneWire).
///
/// Same contract and bit order; every time slot awaits its delays instead of blocking.
pub trait OneWireAsync {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// # Errors
    /// [`OneWireError::PresenceTimeout`] if no device answered, [`OneWireError::ShortCircuit`]
    /// if the line is stuck low, or the underlying hardware error.
    async fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a single bit in one write time slot.
    async fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit in one read time slot.
    async fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least-significant bit first.
    async fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for i in 0..8 {
            self.write_bit((byte >> i) & 0x1 == 0x1).await?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, least-significant bit first.
    async fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for i in 0..8 {
            if self.read_bit().await? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Writes `bytes` in buffer order.
    async fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &b in bytes {
            self.write_byte(b).await?;
        }
        Ok(())
    }

    /// Fills `buf` in wire order: `buf[0]` holds the first byte received.
    async fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for b in buf.iter_mut() {
            *b = self.read_byte().await?;
        }
        Ok(())
    }

    /// One ROM search step, see [`OneWire::read_triplet`](crate::OneWire::read_triplet).
    async fn read_triplet(
        &mut self,
        direction: bool,
    ) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        let id_bit = self.read_bit().await?;
        let complement_bit = self.read_bit().await?;
        let taken = match (id_bit, complement_bit) {
            (false, false) => direction,
            (true, true) => true,
            (id, _) => id,
        };
        self.write_bit(taken).await?;
        Ok((id_bit, complement_bit, taken))
    }

    /// Check if the 1-Wire bus is in overdrive mode.
    async fn get_overdrive_mode(&mut self) -> OneWireResult<bool, Self::BusError> {
        Ok(false)
    }

    /// Set the 1-Wire bus to overdrive mode.
    async fn set_overdrive_mode(&mut self, enable: bool) -> OneWireResult<(), Self::BusError> {
        if enable {
            Err(OneWireError::Unimplemented)
        } else {
            Ok(())
        }
    }

    /// Addresses devices on the 1-Wire bus, see [`OneWire::address`](crate::OneWire::address).
    async fn address(&mut self, rom: Option<u64>) -> OneWireResult<(), Self::BusError> {
        let od = self.get_overdrive_mode().await?;
        let cmd = match (rom.is_some(), od) {
            (true, true) => consts::ONEWIRE_MATCH_ROM_CMD_OD,
            (true, false) => consts::ONEWIRE_MATCH_ROM_CMD,
            (false, true) => consts::ONEWIRE_SKIP_ROM_CMD_OD,
            (false, false) => consts::ONEWIRE_SKIP_ROM_CMD,
        };
        self.reset().await?;
        self.write_byte(cmd).await?;
        if let Some(rom) = rom {
            self.write_bytes(&rom.to_le_bytes()).await?;
        }
        Ok(())
    }
}
