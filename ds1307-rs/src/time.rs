use core::fmt;

use crate::{
    Ds1307Error,
    bcd::{bcd_to_binary, binary_to_bcd},
    registers::{DATE_MASK, DAY_MASK, HoursRegister, MINUTES_MASK, MONTH_MASK, SecondsRegister},
};

/// How the hour of an [`RtcTime`] is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// 12-hour clock, before noon.
    Am,
    /// 12-hour clock, after noon.
    Pm,
    /// 24-hour clock.
    H24,
}

/// Time of day as held by the clock registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcTime {
    /// 1-12 in 12-hour formats, 0-23 otherwise.
    pub hour: u8,
    /// 0-59.
    pub minute: u8,
    /// 0-59.
    pub second: u8,
    /// Hour format.
    pub format: TimeFormat,
}

impl RtcTime {
    /// Collects a time. Nothing is checked until the value is written.
    pub const fn new(hour: u8, minute: u8, second: u8, format: TimeFormat) -> Self {
        Self {
            hour,
            minute,
            second,
            format,
        }
    }

    /// Whether every field fits the chip's registers.
    pub fn is_valid(&self) -> bool {
        let hour_ok = match self.format {
            TimeFormat::Am | TimeFormat::Pm => (1..=12).contains(&self.hour),
            TimeFormat::H24 => self.hour <= 23,
        };
        hour_ok && self.minute <= 59 && self.second <= 59
    }

    /// Seconds, minutes and hours registers, clock halt cleared.
    pub(crate) fn to_registers(self) -> Result<[u8; 3], Ds1307Error> {
        if !self.is_valid() {
            return Err(Ds1307Error::InvalidTime);
        }
        let seconds = SecondsRegister::from_bits(binary_to_bcd(self.second)).with_clock_halt(false);
        Ok([
            seconds.into_bits(),
            binary_to_bcd(self.minute),
            HoursRegister::encode(self.hour, self.format).into_bits(),
        ])
    }

    pub(crate) fn from_registers([seconds, minutes, hours]: [u8; 3]) -> Self {
        let (hour, format) = HoursRegister::from_bits(hours).decode();
        Self {
            hour,
            minute: bcd_to_binary(minutes & MINUTES_MASK),
            second: SecondsRegister::from_bits(seconds).seconds(),
            format,
        }
    }
}

impl fmt::Display for RtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        match self.format {
            TimeFormat::Am => f.write_str(" AM"),
            TimeFormat::Pm => f.write_str(" PM"),
            TimeFormat::H24 => Ok(()),
        }
    }
}

/// Day of the week, numbered the way the day register is by convention.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weekday {
    /// 1
    #[default]
    Sunday = 1,
    /// 2
    Monday = 2,
    /// 3
    Tuesday = 3,
    /// 4
    Wednesday = 4,
    /// 5
    Thursday = 5,
    /// 6
    Friday = 6,
    /// 7
    Saturday = 7,
}

impl TryFrom<u8> for Weekday {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Weekday::*;
        match value {
            1 => Ok(Sunday),
            2 => Ok(Monday),
            3 => Ok(Tuesday),
            4 => Ok(Wednesday),
            5 => Ok(Thursday),
            6 => Ok(Friday),
            7 => Ok(Saturday),
            _ => Err("Invalid day of week"),
        }
    }
}

/// Calendar date as held by the clock registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcDate {
    /// Day of the week.
    pub day: Weekday,
    /// Day of the month, 1-31.
    pub date: u8,
    /// 1-12.
    pub month: u8,
    /// Two-digit year, 0-99.
    pub year: u8,
}

impl RtcDate {
    /// Collects a date. Nothing is checked until the value is written.
    pub const fn new(day: Weekday, date: u8, month: u8, year: u8) -> Self {
        Self {
            day,
            date,
            month,
            year,
        }
    }

    /// Whether every field fits the chip's registers.
    pub fn is_valid(&self) -> bool {
        (1..=31).contains(&self.date) && (1..=12).contains(&self.month) && self.year <= 99
    }

    /// Day, date, month and year registers.
    pub(crate) fn to_registers(self) -> Result<[u8; 4], Ds1307Error> {
        if !self.is_valid() {
            return Err(Ds1307Error::InvalidDate);
        }
        Ok([
            binary_to_bcd(self.day as u8),
            binary_to_bcd(self.date),
            binary_to_bcd(self.month),
            binary_to_bcd(self.year),
        ])
    }

    pub(crate) fn from_registers([day, date, month, year]: [u8; 4]) -> Result<Self, Ds1307Error> {
        let day = Weekday::try_from(bcd_to_binary(day & DAY_MASK))
            .map_err(|_| Ds1307Error::InvalidDate)?;
        Ok(Self {
            day,
            date: bcd_to_binary(date & DATE_MASK),
            month: bcd_to_binary(month & MONTH_MASK),
            year: bcd_to_binary(year),
        })
    }
}

impl fmt::Display for RtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:02}/{:02}/{:02}",
            self.day, self.date, self.month, self.year
        )
    }
}
