use bitfield_struct::bitfield;

use crate::{
    bcd::{bcd_to_binary, binary_to_bcd},
    time::TimeFormat,
};

pub(crate) const SECONDS: u8 = 0x00;
pub(crate) const MINUTES: u8 = 0x01;
pub(crate) const HOURS: u8 = 0x02;
pub(crate) const DAY: u8 = 0x03;
pub(crate) const DATE: u8 = 0x04;
pub(crate) const MONTH: u8 = 0x05;
pub(crate) const YEAR: u8 = 0x06;
pub(crate) const CONTROL: u8 = 0x07;

/// First byte of the battery-backed RAM.
pub const RAM_START: u8 = 0x08;
/// Size of the battery-backed RAM (0x08-0x3F).
pub const RAM_SIZE: usize = 56;

pub(crate) const MINUTES_MASK: u8 = 0x7f;
pub(crate) const DAY_MASK: u8 = 0x07;
pub(crate) const DATE_MASK: u8 = 0x3f;
pub(crate) const MONTH_MASK: u8 = 0x1f;

/// Seconds register (0x00).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct SecondsRegister {
    /// Seconds, BCD.
    #[bits(7)]
    pub seconds_bcd: u8,
    /// Clock halt. While set the oscillator is stopped.
    pub clock_halt: bool,
}

impl SecondsRegister {
    /// Seconds in binary.
    pub fn seconds(&self) -> u8 {
        bcd_to_binary(self.seconds_bcd())
    }
}

/// Hours register (0x02).
///
/// In 12-hour mode bit 5 is AM/PM and the hour takes five bits; in 24-hour mode bit 5 is the
/// second tens bit of the hour.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct HoursRegister {
    /// Hour, BCD, low ones and the first tens bit.
    #[bits(5)]
    pub hour_bcd: u8,
    /// PM in 12-hour mode, 20-hours bit in 24-hour mode.
    pub pm_or_twenty: bool,
    /// 12-hour mode select.
    pub twelve_hour: bool,
    #[bits(1)]
    reserved: u8,
}

impl HoursRegister {
    /// Encodes an hour for the given format.
    pub fn encode(hour: u8, format: TimeFormat) -> Self {
        let bcd = binary_to_bcd(hour);
        match format {
            TimeFormat::Am => Self::from_bits(bcd & 0x1f)
                .with_twelve_hour(true)
                .with_pm_or_twenty(false),
            TimeFormat::Pm => Self::from_bits(bcd & 0x1f)
                .with_twelve_hour(true)
                .with_pm_or_twenty(true),
            TimeFormat::H24 => Self::from_bits(bcd & 0x3f).with_twelve_hour(false),
        }
    }

    /// Recovers the hour and its format. The format bits are read before the hour is masked.
    pub fn decode(&self) -> (u8, TimeFormat) {
        if self.twelve_hour() {
            let format = if self.pm_or_twenty() {
                TimeFormat::Pm
            } else {
                TimeFormat::Am
            };
            (bcd_to_binary(self.hour_bcd()), format)
        } else {
            (bcd_to_binary(self.into_bits() & 0x3f), TimeFormat::H24)
        }
    }
}

/// Control register (0x07).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct ControlRegister {
    /// RS1:RS0 square-wave rate select.
    #[bits(2)]
    pub rate_select: u8,
    #[bits(2)]
    reserved_low: u8,
    /// Square-wave output enable.
    pub square_wave_enable: bool,
    #[bits(2)]
    reserved_high: u8,
    /// Output level of the SQW/OUT pin while the square wave is disabled.
    pub out: bool,
}

/// What the SQW/OUT pin does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SquareWave {
    /// Static low.
    #[default]
    Low,
    /// Static high.
    High,
    /// 1 Hz.
    Hz1,
    /// 4.096 kHz.
    Hz4096,
    /// 8.192 kHz.
    Hz8192,
    /// 32.768 kHz.
    Hz32768,
}

impl From<SquareWave> for ControlRegister {
    fn from(value: SquareWave) -> Self {
        let running = |rate| {
            ControlRegister::new()
                .with_square_wave_enable(true)
                .with_rate_select(rate)
        };
        match value {
            SquareWave::Low => ControlRegister::new(),
            SquareWave::High => ControlRegister::new().with_out(true),
            SquareWave::Hz1 => running(0),
            SquareWave::Hz4096 => running(1),
            SquareWave::Hz8192 => running(2),
            SquareWave::Hz32768 => running(3),
        }
    }
}

impl From<ControlRegister> for SquareWave {
    fn from(value: ControlRegister) -> Self {
        if !value.square_wave_enable() {
            return if value.out() { Self::High } else { Self::Low };
        }
        match value.rate_select() {
            0 => Self::Hz1,
            1 => Self::Hz4096,
            2 => Self::Hz8192,
            _ => Self::Hz32768,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_bits() {
        assert_eq!(HoursRegister::encode(7, TimeFormat::Pm).into_bits(), 0x67);
        assert_eq!(HoursRegister::encode(12, TimeFormat::Am).into_bits(), 0x52);
        assert_eq!(HoursRegister::encode(23, TimeFormat::H24).into_bits(), 0x23);
        assert_eq!(HoursRegister::encode(0, TimeFormat::H24).into_bits(), 0x00);
    }

    #[test]
    fn hour_round_trip() {
        for hour in 1..=12 {
            for format in [TimeFormat::Am, TimeFormat::Pm] {
                assert_eq!(HoursRegister::encode(hour, format).decode(), (hour, format));
            }
        }
        for hour in 0..=23 {
            assert_eq!(
                HoursRegister::encode(hour, TimeFormat::H24).decode(),
                (hour, TimeFormat::H24)
            );
        }
    }

    #[test]
    fn reserved_hour_bit_is_ignored() {
        assert_eq!(
            HoursRegister::from_bits(0x80 | 0x67).decode(),
            (7, TimeFormat::Pm)
        );
        assert_eq!(
            HoursRegister::from_bits(0x80 | 0x21).decode(),
            (21, TimeFormat::H24)
        );
    }

    #[test]
    fn clock_halt_is_bit_seven() {
        let reg = SecondsRegister::from_bits(0x80 | 0x42);
        assert!(reg.clock_halt());
        assert_eq!(reg.seconds(), 42);
        assert_eq!(reg.with_clock_halt(false).into_bits(), 0x42);
    }

    #[test]
    fn square_wave_control_bits() {
        let cases = [
            (SquareWave::Low, 0x00),
            (SquareWave::High, 0x80),
            (SquareWave::Hz1, 0x10),
            (SquareWave::Hz4096, 0x11),
            (SquareWave::Hz8192, 0x12),
            (SquareWave::Hz32768, 0x13),
        ];
        for (wave, bits) in cases {
            let reg = ControlRegister::from(wave);
            assert_eq!(reg.into_bits(), bits);
            assert_eq!(SquareWave::from(reg), wave);
        }
    }
}
