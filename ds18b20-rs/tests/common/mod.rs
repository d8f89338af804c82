//! Simulated open-drain 1-Wire line with DS18B20 slaves.
//!
//! Time only advances through [`SimDelay`]. Slaves decode write slots from how long the master
//! held the line low and answer read slots by holding it low for 30 µs after the falling edge.
#![allow(dead_code)]

use core::convert::Infallible;
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin},
};
use embedded_onewire::OneWireCrc;
use onewire_gpio::OneWireGpio;

const SLAVE_HOLD_US: u64 = 30;

#[derive(Debug)]
enum Phase {
    /// Waiting for the next reset pulse.
    Idle,
    /// Receiving a ROM command.
    Rom,
    /// Receiving the 8 ROM bytes after Match ROM.
    MatchRom(Vec<u8>),
    /// Receiving a function command.
    Function,
    /// Receiving TH, TL and configuration after Write Scratchpad.
    WriteScratch(Vec<u8>),
    /// Sending queued bits in read slots.
    Transmit(VecDeque<bool>),
    /// Answering read slots with 0 until the deadline, 1 afterwards.
    Busy(u64),
    /// ROM search: `bit` of 64, `step` 0 = id, 1 = complement, 2-3 = master's write slot.
    Search { bit: u32, step: u8 },
}

pub struct Ds18b20Sim {
    pub rom: u64,
    pub scratchpad: [u8; 9],
    pub eeprom: [u8; 3],
    pub temperature: i16,
    pub conversion_us: u64,
    pub parasite: bool,
    pub corrupt_crc: bool,
    pub commands: Vec<u8>,
    phase: Phase,
    rx: u8,
    rx_bits: u8,
}

impl Ds18b20Sim {
    pub fn new(serial: u64, temperature: i16) -> Self {
        let mut rom = (serial << 8 | 0x28).to_le_bytes();
        rom[7] = OneWireCrc::compute(&rom[..7]);
        let mut sim = Self {
            rom: u64::from_le_bytes(rom),
            scratchpad: [0x50, 0x05, 0x4b, 0x46, 0x7f, 0xff, 0x0c, 0x10, 0],
            eeprom: [0x4b, 0x46, 0x7f],
            temperature,
            conversion_us: 2_000,
            parasite: false,
            corrupt_crc: false,
            commands: Vec::new(),
            phase: Phase::Idle,
            rx: 0,
            rx_bits: 0,
        };
        sim.seal();
        sim
    }

    fn seal(&mut self) {
        self.scratchpad[8] = OneWireCrc::compute(&self.scratchpad[..8]);
        if self.corrupt_crc {
            self.scratchpad[8] ^= 0xff;
        }
    }

    fn rom_bit(&self, bit: u32) -> bool {
        (self.rom >> bit) & 1 == 1
    }

    fn on_reset(&mut self) {
        self.phase = Phase::Rom;
        self.rx = 0;
        self.rx_bits = 0;
    }

    /// Master pulled the line low. Returns true if this slave holds it low for the read slot.
    fn on_fall(&mut self, now: u64) -> bool {
        match &mut self.phase {
            Phase::Transmit(bits) => bits.pop_front() == Some(false),
            Phase::Busy(until) => now < *until,
            Phase::Search { bit, step } if *step < 2 => {
                // Step 0 sends the ROM bit, step 1 its complement.
                let sent = ((self.rom >> *bit) & 1 == 1) != (*step == 1);
                *step += 1;
                !sent
            }
            Phase::Search { step, .. } => {
                // Start of the master's write slot.
                *step = 3;
                false
            }
            _ => false,
        }
    }

    /// Master released the line after `low` µs.
    fn on_rise(&mut self, now: u64, low: u64) {
        let bit = low < 15;
        if let Phase::Search { bit: index, step: 3 } = self.phase {
            self.phase = if bit != self.rom_bit(index) {
                Phase::Idle
            } else if index == 63 {
                Phase::Function
            } else {
                Phase::Search {
                    bit: index + 1,
                    step: 0,
                }
            };
            return;
        }
        if matches!(
            self.phase,
            Phase::Rom | Phase::MatchRom(_) | Phase::Function | Phase::WriteScratch(_)
        ) {
            if bit {
                self.rx |= 1 << self.rx_bits;
            }
            self.rx_bits += 1;
            if self.rx_bits == 8 {
                let byte = self.rx;
                self.rx = 0;
                self.rx_bits = 0;
                self.on_byte(now, byte);
            }
        }
    }

    fn on_byte(&mut self, now: u64, byte: u8) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.phase = match phase {
            Phase::Rom => {
                self.commands.push(byte);
                match byte {
                    0xcc => Phase::Function,
                    0x55 => Phase::MatchRom(Vec::new()),
                    0x33 => Phase::Transmit(bits_of(&self.rom.to_le_bytes())),
                    0xf0 => Phase::Search { bit: 0, step: 0 },
                    _ => Phase::Idle,
                }
            }
            Phase::MatchRom(mut bytes) => {
                bytes.push(byte);
                if bytes.len() < 8 {
                    Phase::MatchRom(bytes)
                } else if bytes == self.rom.to_le_bytes() {
                    Phase::Function
                } else {
                    Phase::Idle
                }
            }
            Phase::Function => {
                self.commands.push(byte);
                match byte {
                    0x44 => {
                        let [lsb, msb] = self.temperature.to_le_bytes();
                        self.scratchpad[0] = lsb;
                        self.scratchpad[1] = msb;
                        self.seal();
                        Phase::Busy(now + self.conversion_us)
                    }
                    0xbe => Phase::Transmit(bits_of(&self.scratchpad)),
                    0x4e => Phase::WriteScratch(Vec::new()),
                    0x48 => {
                        self.eeprom.copy_from_slice(&self.scratchpad[2..5]);
                        Phase::Idle
                    }
                    0xb8 => {
                        self.scratchpad[2..5].copy_from_slice(&self.eeprom);
                        self.seal();
                        Phase::Busy(now + 100)
                    }
                    0xb4 => Phase::Transmit(VecDeque::from([!self.parasite])),
                    _ => Phase::Idle,
                }
            }
            Phase::WriteScratch(mut bytes) => {
                bytes.push(byte);
                if bytes.len() < 3 {
                    Phase::WriteScratch(bytes)
                } else {
                    self.scratchpad[2] = bytes[0];
                    self.scratchpad[3] = bytes[1];
                    self.scratchpad[4] = bytes[2] & 0x60 | 0x1f;
                    self.seal();
                    Phase::Idle
                }
            }
            other => other,
        };
    }
}

fn bits_of(bytes: &[u8]) -> VecDeque<bool> {
    bytes
        .iter()
        .flat_map(|b| (0..8).map(move |i| (b >> i) & 1 == 1))
        .collect()
}

#[derive(Default)]
pub struct Line {
    pub now: u64,
    pub devices: Vec<Ds18b20Sim>,
    pub resets: usize,
    master_low_since: Option<u64>,
    slave_low_until: u64,
    presence: Option<(u64, u64)>,
}

impl Line {
    fn is_low(&self) -> bool {
        self.master_low_since.is_some()
            || self.now < self.slave_low_until
            || self
                .presence
                .is_some_and(|(from, to)| (from..to).contains(&self.now))
    }
}

pub type SharedLine = Rc<RefCell<Line>>;

#[derive(Clone)]
pub struct SimPin(SharedLine);

pub struct SimDelay(SharedLine);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut line = self.0.borrow_mut();
        if line.master_low_since.is_some() {
            return Ok(());
        }
        let now = line.now;
        line.master_low_since = Some(now);
        let mut hold = false;
        for dev in line.devices.iter_mut() {
            hold |= dev.on_fall(now);
        }
        if hold {
            line.slave_low_until = now + SLAVE_HOLD_US;
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut line = self.0.borrow_mut();
        let now = line.now;
        let Some(since) = line.master_low_since.take() else {
            return Ok(());
        };
        let low = now - since;
        if low >= 480 {
            line.resets += 1;
            line.presence = if line.devices.is_empty() {
                None
            } else {
                Some((now + 30, now + 150))
            };
            line.devices.iter_mut().for_each(Ds18b20Sim::on_reset);
        } else {
            for dev in line.devices.iter_mut() {
                dev.on_rise(now, low);
            }
        }
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow().is_low())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow().is_low())
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().now += u64::from(ns).div_ceil(1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().now += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().now += u64::from(ms) * 1000;
    }
}

/// A master on a simulated line holding `devices`, plus a delay for the driver's own waits.
pub fn sim_bus(devices: Vec<Ds18b20Sim>) -> (OneWireGpio<SimPin, SimDelay>, SimDelay, SharedLine) {
    let line = Rc::new(RefCell::new(Line {
        devices,
        ..Default::default()
    }));
    let bus = OneWireGpio::new(SimPin(line.clone()), SimDelay(line.clone()));
    (bus, SimDelay(line.clone()), line)
}
