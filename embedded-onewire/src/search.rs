use crate::{
    ONEWIRE_ALARM_SEARCH_CMD, ONEWIRE_SEARCH_CMD, OneWire, OneWireStatus, error::OneWireError,
    utils::OneWireCrc,
};

/// ROM search state over a borrowed bus.
///
/// Each call to [`next`](OneWireSearch::next) walks the 64-bit ROM tree once, following the branch
/// recorded by the previous pass, and yields the next device in ascending bit order.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cmd: u8,
    family: u8,
    rom: [u8; 8],
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    exhausted: bool,
}

/// Type of search performed using [`OneWireSearch`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with an alarm condition
    Alarmed = ONEWIRE_ALARM_SEARCH_CMD,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] over every device on the bus.
    pub fn new(onewire: &'a mut T, kind: OneWireSearchKind) -> Self {
        Self::with_family(onewire, kind, 0)
    }

    /// Creates a new [`OneWireSearch`] limited to one family code. A family of `0` means any.
    pub fn with_family(onewire: &'a mut T, kind: OneWireSearchKind, family: u8) -> Self {
        let mut search = Self {
            onewire,
            cmd: kind as _,
            family,
            rom: [0; 8],
            last_discrepancy: 0,
            last_family_discrepancy: 0,
            exhausted: false,
        };
        search.restart();
        search
    }

    /// Position of the last branch point inside the family code byte, `0` if there was none.
    pub fn last_family_discrepancy(&self) -> u8 {
        self.last_family_discrepancy
    }

    /// Rewinds the search to its first device.
    pub fn restart(&mut self) {
        self.rom = [self.family, 0, 0, 0, 0, 0, 0, 0];
        // Starting at the last bit makes the first pass follow the family code already in `rom`.
        self.last_discrepancy = if self.family != 0 { 64 } else { 0 };
        self.last_family_discrepancy = 0;
        self.exhausted = false;
    }

    fn rom_bit(&self, bit: u8) -> bool {
        self.rom[(bit / 8) as usize] & (1 << (bit % 8)) != 0
    }

    fn set_rom_bit(&mut self, bit: u8, value: bool) {
        let mask = 1 << (bit % 8);
        if value {
            self.rom[(bit / 8) as usize] |= mask;
        } else {
            self.rom[(bit / 8) as usize] &= !mask;
        }
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Searches for the next device on the 1-Wire bus.
    /// This implements the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
    /// Once every device has been reported the method keeps returning `None` until
    /// [`restart`](OneWireSearch::restart) or [`verify`](OneWireSearch::verify) is called.
    ///
    /// # Returns
    /// The ROM code of the found device as a `u64` value, the family code in the low byte.
    ///
    /// | Bit | Description |
    /// |-----|-------------|
    /// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
    /// | 8-55 | 48-bit serial number |
    /// | 56-63 | CRC-8 of the first seven bytes |
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<u64>, OneWireError<T::BusError>> {
        if self.onewire.get_overdrive_mode()? {
            return Err(OneWireError::BusInvalidSpeed);
        }
        if self.exhausted {
            return Ok(None);
        }
        let status = self.onewire.reset()?;
        if status.shortcircuit() {
            return Err(OneWireError::ShortCircuit);
        }
        if !status.presence() {
            return Err(OneWireError::PresenceTimeout);
        }
        self.onewire.write_byte(self.cmd)?;

        let mut last_zero = 0u8;
        for bit in 0..64u8 {
            let position = bit + 1;
            let direction = if position < self.last_discrepancy {
                self.rom_bit(bit)
            } else {
                position == self.last_discrepancy
            };
            let (id_bit, complement_bit, taken) = self.onewire.read_triplet(direction)?;
            if id_bit && complement_bit {
                // Nobody answered this slot: the devices left the bus mid-search.
                self.restart();
                self.exhausted = true;
                return Ok(None);
            }
            if !id_bit && !complement_bit && !taken {
                last_zero = position;
                if last_zero < 9 {
                    self.last_family_discrepancy = last_zero;
                }
            }
            self.set_rom_bit(bit, taken);
        }
        self.last_discrepancy = last_zero;
        self.exhausted = last_zero == 0;

        if !OneWireCrc::validate(&self.rom) {
            return Err(OneWireError::InvalidCrc);
        }
        if self.family != 0 && self.rom[0] != self.family {
            self.exhausted = true;
            return Ok(None);
        }
        Ok(Some(u64::from_le_bytes(self.rom)))
    }

    /// Checks whether the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// The search state is rewound afterwards, so the next call to [next](OneWireSearch::next)
    /// starts a new search.
    pub fn verify(&mut self, rom: u64) -> Result<bool, OneWireError<T::BusError>> {
        self.restart();
        self.rom = rom.to_le_bytes();
        self.last_discrepancy = 64;
        let found = self.next();
        self.restart();
        Ok(found? == Some(rom))
    }
}
