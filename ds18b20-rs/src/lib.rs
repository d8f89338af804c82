#![no_std]
#![deny(missing_docs)]
//! # DS18B20
//!
//! Command sequencing for the DS18B20 digital thermometer over any [`OneWire`] master.
//!
//! A driver value only holds addressing and timing configuration; the bus is borrowed for each
//! call so several sensors can share one master.
//!
//! ```ignore
//! let sensor = Ds18b20::new();
//! let sample = sensor.read_temperature(&mut bus, &mut delay)?;
//! log::info!("{}", sample.celsius());
//! ```

use embedded_hal::delay::DelayNs;
use embedded_onewire::{
    ONEWIRE_READ_ROM_CMD, OneWire, OneWireCrc, OneWireError, OneWireResult, OneWireSearch,
    OneWireSearchKind,
};
use log::{debug, warn};

mod temperature;

pub use temperature::{Temperature, TemperatureSample};

const DS18B20_CONVERT_T: u8 = 0x44;
const DS18B20_WRITE_SCRATCH: u8 = 0x4e;
const DS18B20_READ_SCRATCH: u8 = 0xbe;
const DS18B20_COPY_SCRATCH: u8 = 0x48;
const DS18B20_RECALL_EEPROM: u8 = 0xb8;
const DS18B20_READ_POWER_SUPPLY: u8 = 0xb4;

/// EEPROM write time after Copy Scratchpad (tWR).
const EEPROM_WRITE_MS: u32 = 10;

/// A DS18B20 on a 1-Wire bus.
#[derive(Debug, Clone)]
pub struct Ds18b20 {
    rom: Option<u64>,
    conversion_polls: u32,
    poll_interval_us: u32,
}

impl Default for Ds18b20 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ds18b20 {
    /// Family code shared by every DS18B20 ROM.
    #[inline]
    pub const fn family() -> u8 {
        0x28
    }

    /// The only device on a single-drop bus, addressed with Skip ROM.
    pub fn new() -> Self {
        Self {
            rom: None,
            conversion_polls: 1000,
            poll_interval_us: 1000,
        }
    }

    /// A device addressed with Match ROM.
    pub fn with_rom(rom: u64) -> Self {
        Self {
            rom: Some(rom),
            ..Self::new()
        }
    }

    /// Maximum number of read slots spent waiting for a conversion or recall to finish.
    pub fn with_conversion_polls(mut self, polls: u32) -> Self {
        self.conversion_polls = polls;
        self
    }

    /// Pause between two completion polls.
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }

    /// ROM used to address the device, `None` for Skip ROM.
    pub fn rom(&self) -> Option<u64> {
        self.rom
    }

    /// Reads the ROM of the only device on the bus.
    ///
    /// # Errors
    /// [`OneWireError::InvalidCrc`] if the ROM does not check out, which also happens when more
    /// than one device answers.
    pub fn read_rom<O: OneWire>(bus: &mut O) -> OneWireResult<u64, O::BusError> {
        bus.reset()?;
        bus.write_byte(ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0; 8];
        bus.read_bytes(&mut rom)?;
        if !OneWireCrc::validate(&rom) {
            warn!("DS18B20: ROM {rom:02x?} failed CRC");
            return Err(OneWireError::InvalidCrc);
        }
        Ok(u64::from_le_bytes(rom))
    }

    /// Searches the bus for DS18B20 devices and stores their ROMs in `roms`.
    ///
    /// Stops when `roms` is full. Returns the number of ROMs stored.
    pub fn find_all<O: OneWire>(bus: &mut O, roms: &mut [u64]) -> OneWireResult<usize, O::BusError> {
        let mut search = OneWireSearch::with_family(bus, OneWireSearchKind::Normal, Self::family());
        let mut found = 0;
        for slot in roms.iter_mut() {
            match search.next()? {
                Some(rom) => {
                    debug!("DS18B20: found {rom:016x}");
                    *slot = rom;
                    found += 1;
                }
                None => break,
            }
        }
        Ok(found)
    }

    fn select<O: OneWire>(&self, bus: &mut O) -> OneWireResult<(), O::BusError> {
        bus.address(self.rom)
    }

    /// Starts a temperature conversion and returns immediately.
    pub fn start_conversion<O: OneWire>(&self, bus: &mut O) -> OneWireResult<(), O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_CONVERT_T)
    }

    /// Polls read slots until the device reports that the running operation finished.
    ///
    /// The device answers 0 while busy and 1 once done.
    fn wait_done<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
        polls: u32,
    ) -> OneWireResult<(), O::BusError> {
        for poll in 0..polls {
            if bus.read_bit()? {
                debug!("DS18B20: done after {} polls", poll + 1);
                return Ok(());
            }
            delay.delay_us(self.poll_interval_us);
        }
        warn!("DS18B20: still busy after {polls} polls");
        Err(OneWireError::Timeout)
    }

    /// Starts a conversion and waits for it with the configured poll budget.
    pub fn convert<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> OneWireResult<(), O::BusError> {
        self.convert_with_timeout(bus, delay, self.conversion_polls)
    }

    /// Starts a conversion and waits for at most `polls` read slots.
    ///
    /// A parasite-powered device cannot answer read slots while converting; use
    /// [`start_conversion`](Ds18b20::start_conversion) and
    /// [`Resolution::conversion_time_us`] for those instead.
    ///
    /// # Errors
    /// [`OneWireError::Timeout`] if the device never reports completion.
    pub fn convert_with_timeout<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
        polls: u32,
    ) -> OneWireResult<(), O::BusError> {
        self.start_conversion(bus)?;
        self.wait_done(bus, delay, polls)
    }

    /// Runs a full measurement: convert, wait, then read the two temperature bytes.
    ///
    /// The scratchpad read is cut short with a reset pulse once the temperature word is in,
    /// so the remaining seven bytes (and the CRC) are never clocked out.
    pub fn read_temperature<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> OneWireResult<TemperatureSample, O::BusError> {
        self.convert(bus, delay)?;
        self.select(bus)?;
        bus.write_byte(DS18B20_READ_SCRATCH)?;
        let mut word = [0; 2];
        bus.read_bytes(&mut word)?;
        bus.reset()?;
        let sample = TemperatureSample::from_scratchpad(word);
        debug!("DS18B20: raw word {:#06x}", sample.raw());
        Ok(sample)
    }

    /// Reads the whole scratchpad and checks its CRC.
    pub fn read_scratchpad<O: OneWire>(&self, bus: &mut O) -> OneWireResult<Scratchpad, O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_READ_SCRATCH)?;
        let mut bytes = [0; 9];
        bus.read_bytes(&mut bytes)?;
        if !OneWireCrc::validate(&bytes) {
            warn!("DS18B20: scratchpad {bytes:02x?} failed CRC");
            return Err(OneWireError::InvalidCrc);
        }
        Ok(Scratchpad { bytes })
    }

    /// Writes the alarm thresholds and the resolution to the scratchpad.
    ///
    /// The values are volatile until [`copy_scratchpad`](Ds18b20::copy_scratchpad).
    pub fn write_scratchpad<O: OneWire>(
        &self,
        bus: &mut O,
        alarm_high: i8,
        alarm_low: i8,
        resolution: Resolution,
    ) -> OneWireResult<(), O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_WRITE_SCRATCH)?;
        bus.write_bytes(&[alarm_high as u8, alarm_low as u8, resolution as u8])
    }

    /// Stores the alarm thresholds and the resolution in EEPROM.
    pub fn copy_scratchpad<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> OneWireResult<(), O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_COPY_SCRATCH)?;
        delay.delay_ms(EEPROM_WRITE_MS);
        Ok(())
    }

    /// Reloads the alarm thresholds and the resolution from EEPROM.
    pub fn recall_eeprom<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> OneWireResult<(), O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_RECALL_EEPROM)?;
        self.wait_done(bus, delay, self.conversion_polls)
    }

    /// Whether the addressed device draws power from the data line.
    ///
    /// With Skip ROM this is `true` if any device on the bus is parasite powered.
    pub fn parasite_powered<O: OneWire>(&self, bus: &mut O) -> OneWireResult<bool, O::BusError> {
        self.select(bus)?;
        bus.write_byte(DS18B20_READ_POWER_SUPPLY)?;
        Ok(!bus.read_bit()?)
    }
}

/// The nine scratchpad bytes, CRC already checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad {
    bytes: [u8; 9],
}

impl Scratchpad {
    /// Temperature word of the last conversion.
    pub fn temperature(&self) -> TemperatureSample {
        TemperatureSample::from_scratchpad([self.bytes[0], self.bytes[1]])
    }

    /// High alarm threshold (TH).
    pub fn alarm_high(&self) -> i8 {
        self.bytes[2] as i8
    }

    /// Low alarm threshold (TL).
    pub fn alarm_low(&self) -> i8 {
        self.bytes[3] as i8
    }

    /// Conversion resolution, `None` if the configuration byte is not one of the four patterns.
    pub fn resolution(&self) -> Option<Resolution> {
        Resolution::try_from(self.bytes[4]).ok()
    }

    /// Raw bytes in wire order, CRC last.
    pub fn bytes(&self) -> &[u8; 9] {
        &self.bytes
    }
}

/// Conversion resolution, encoded as the configuration register value.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Resolution {
    /// 0.5 °C steps.
    Bits9 = 0x1f,
    /// 0.25 °C steps.
    Bits10 = 0x3f,
    /// 0.125 °C steps.
    Bits11 = 0x5f,
    /// 0.0625 °C steps.
    #[default]
    Bits12 = 0x7f,
}

impl Resolution {
    /// Worst-case conversion time (tCONV).
    pub fn conversion_time_us(&self) -> u32 {
        use Resolution::*;
        match self {
            Bits9 => 93750,
            Bits10 => 187500,
            Bits11 => 375000,
            Bits12 => 750000,
        }
    }
}

impl TryFrom<u8> for Resolution {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Resolution::*;
        match value {
            0x1f => Ok(Bits9),
            0x3f => Ok(Bits10),
            0x5f => Ok(Bits11),
            0x7f => Ok(Bits12),
            _ => Err("Invalid readout resolution"),
        }
    }
}
