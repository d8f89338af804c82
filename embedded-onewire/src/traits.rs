use crate::{OneWireError, OneWireResult, consts};

/// Status of the bus reported by a reset/presence-detect cycle.
pub trait OneWireStatus {
    /// At least one device answered the reset with a presence pulse.
    fn presence(&self) -> bool;
    /// The line was found shorted to ground.
    fn shortcircuit(&self) -> bool;
    /// Logic level of the line sampled at the end of the reset cycle, if the master reports it.
    fn logic_level(&self) -> Option<bool> {
        None
    }
    /// Search direction taken by the last triplet, if the master reports it.
    fn direction(&self) -> Option<bool> {
        None
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes, and writing and reading bits.
///
/// Only [`reset`](OneWire::reset), [`write_bit`](OneWire::write_bit) and [`read_bit`](OneWire::read_bit)
/// are required. The byte-level methods default to eight bit slots, least-significant bit first, which is
/// the order every 1-Wire device expects. Masters with hardware byte support override them.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// # Errors
    /// [`OneWireError::PresenceTimeout`] if no device answered, [`OneWireError::ShortCircuit`]
    /// if the line is stuck low, or the underlying hardware error.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a single bit in one write time slot.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit in one read time slot.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least-significant bit first.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for i in 0..8 {
            self.write_bit((byte >> i) & 0x1 == 0x1)?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, least-significant bit first.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Writes `bytes` in buffer order.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fills `buf` in wire order: `buf[0]` holds the first byte received.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    /// Generates the three time slots of one ROM search step: two read slots (id bit and its
    /// complement) followed by a write slot carrying the chosen branch.
    ///
    /// If the read slots differ, the id bit is written. If both are 0 (a discrepancy), `direction`
    /// is written. If both are 1 no device is participating and a 1 is written.
    ///
    /// # Returns
    /// `(id_bit, complement_bit, direction_taken)`.
    fn read_triplet(&mut self, direction: bool) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        let id_bit = self.read_bit()?;
        let complement_bit = self.read_bit()?;
        let taken = match (id_bit, complement_bit) {
            (false, false) => direction,
            (true, true) => true,
            (id, _) => id,
        };
        self.write_bit(taken)?;
        Ok((id_bit, complement_bit, taken))
    }

    /// Check if the 1-Wire bus is in overdrive mode.
    fn get_overdrive_mode(&mut self) -> OneWireResult<bool, Self::BusError> {
        Ok(false)
    }

    /// Set the 1-Wire bus to overdrive mode.
    ///
    /// Masters that only run at standard speed accept `false` and reject `true` with
    /// [`OneWireError::Unimplemented`].
    fn set_overdrive_mode(&mut self, enable: bool) -> OneWireResult<(), Self::BusError> {
        if enable {
            Err(OneWireError::Unimplemented)
        } else {
            Ok(())
        }
    }

    /// Addresses devices on the 1-Wire bus.
    /// The first [`OneWire::read_byte`], [`OneWire::read_bit`], [`OneWire::write_byte`], [`OneWire::write_bit`] operation should be preceded by this method to address devices on the bus.
    /// Note: A [`OneWire::read_byte`] or [`OneWire::read_bit`] call will return garbage data if this method is called without specifying a ROM address on a bus with multiple devices.
    /// # Arguments
    /// * `rom` - The ROM address of the device to address. Pass [`None`] to skip ROM addressing and address all devices on the bus.
    fn address(&mut self, rom: Option<u64>) -> OneWireResult<(), Self::BusError> {
        let od = self.get_overdrive_mode()?;
        let cmd = match (rom.is_some(), od) {
            (true, true) => consts::ONEWIRE_MATCH_ROM_CMD_OD,
            (true, false) => consts::ONEWIRE_MATCH_ROM_CMD,
            (false, true) => consts::ONEWIRE_SKIP_ROM_CMD_OD,
            (false, false) => consts::ONEWIRE_SKIP_ROM_CMD,
        };
        self.reset()?;
        self.write_byte(cmd)?;
        if let Some(rom) = rom {
            self.write_bytes(&rom.to_le_bytes())?;
        }
        Ok(())
    }
}
