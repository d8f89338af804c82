#![no_std]
#![deny(missing_docs)]
//! # DS1307
//!
//! Driver for the DS1307 serial real-time clock over an I2C controller that completes its
//! transfers from interrupt context.
//!
//! Every call looks blocking to the caller: the driver starts a transfer, retries while the
//! transport is busy, then polls the [`TransferFlags`] that the transport's event handler
//! updates. Both waits are bounded (see [`Ds1307Builder`]).
//!
//! ```ignore
//! static FLAGS: TransferFlags = TransferFlags::new();
//!
//! let mut rtc = Ds1307Builder::default()
//!     .with_retries(500)
//!     .build(BlockingTransport::new(i2c), delay, &FLAGS);
//! let halted = rtc.init()?;
//! rtc.set_time(&RtcTime::new(7, 50, 35, TimeFormat::Pm))?;
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

mod bcd;
mod completion;
mod error;
mod registers;
mod time;
mod transport;

pub use bcd::{bcd_to_binary, binary_to_bcd};
pub use completion::{Completion, TransferFlags, TransferState};
pub use error::Ds1307Error;
pub use registers::{
    ControlRegister, HoursRegister, RAM_SIZE, RAM_START, SecondsRegister, SquareWave,
};
pub use time::{RtcDate, RtcTime, TimeFormat, Weekday};
pub use transport::{
    BlockingTransport, BusFault, I2cEvent, I2cEventHandler, I2cTransport, RepeatedStart,
    TRANSFER_CAPACITY, TransferStatus,
};

use registers::{CONTROL, DATE, DAY, HOURS, MINUTES, MONTH, SECONDS, YEAR};

/// Results of DS1307 calls.
pub type Ds1307Result<T> = Result<T, Ds1307Error>;

/// 7-bit bus address of every DS1307.
pub const DS1307_ADDR: u8 = 0x68;

#[derive(Debug, Clone, Copy)]
enum Direction {
    Tx,
    Rx,
}

/// A DS1307 behind an interrupt-driven [`I2cTransport`].
///
/// Takes ownership of the transport and a [`DelayNs`] used between polls, and borrows the
/// [`TransferFlags`] the transport's event handler signals.
pub struct Ds1307<'a, T, D> {
    transport: T,
    delay: D,
    flags: &'a TransferFlags,
    retries: u32,
    poll_interval_us: u32,
}

/// Builder for creating a [`Ds1307`] instance with custom wait limits.
#[derive(Debug, Clone, Copy)]
pub struct Ds1307Builder {
    retries: u32,
    poll_interval_us: u32,
}

impl Default for Ds1307Builder {
    fn default() -> Self {
        Ds1307Builder {
            retries: 1000,
            poll_interval_us: 10,
        }
    }
}

impl Ds1307Builder {
    /// Sets the retry count.
    ///
    /// Bounds both the number of attempts to get a transfer accepted and the number of polls
    /// spent waiting for its completion.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the pause between two attempts or polls.
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }

    /// Builds the driver. No bus traffic happens until [`Ds1307::init`].
    pub fn build<'a, T, D>(self, transport: T, delay: D, flags: &'a TransferFlags) -> Ds1307<'a, T, D> {
        Ds1307 {
            transport,
            delay,
            flags,
            retries: self.retries,
            poll_interval_us: self.poll_interval_us,
        }
    }
}

impl<'a, T, D> Ds1307<'a, T, D> {
    /// Creates a driver with the default wait limits.
    pub fn new(transport: T, delay: D, flags: &'a TransferFlags) -> Self {
        Ds1307Builder::default().build(transport, delay, flags)
    }

    /// Set the retry count.
    pub fn set_retries(&mut self, retries: u32) {
        self.retries = retries;
    }

    /// Returns the transport and the delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }
}

impl<'a, T: I2cTransport<'a>, D: DelayNs> Ds1307<'a, T, D> {
    /// Enables the transport, hooks up the completion flags and starts the oscillator.
    ///
    /// Writing 0 to the seconds register clears the clock-halt bit (and the seconds). Returns
    /// whether the clock is still halted when read back, which means the chip did not start.
    pub fn init(&mut self) -> Ds1307Result<bool> {
        self.transport.peripheral_control(true);
        self.transport.enable_interrupts();
        self.transport.register_handler(self.flags);
        self.write(SECONDS, &[0x00])?;
        let seconds = SecondsRegister::from_bits(self.read_byte(SECONDS)?);
        if seconds.clock_halt() {
            warn!("DS1307: oscillator still halted after init");
        } else {
            debug!("DS1307: oscillator running");
        }
        Ok(seconds.clock_halt())
    }

    /// Sets the time of day.
    ///
    /// Seconds, minutes and hours go out in one burst starting at the seconds register; the
    /// chip's register pointer advances after each byte.
    pub fn set_time(&mut self, time: &RtcTime) -> Ds1307Result<()> {
        let regs = time.to_registers()?;
        debug!("DS1307: set time {time}");
        self.write(SECONDS, &regs)
    }

    /// Sets the calendar date in one burst starting at the day register.
    pub fn set_date(&mut self, date: &RtcDate) -> Ds1307Result<()> {
        let regs = date.to_registers()?;
        debug!("DS1307: set date {date}");
        self.write(DAY, &regs)
    }

    /// Reads the time of day, one register per transfer.
    pub fn time(&mut self) -> Ds1307Result<RtcTime> {
        let seconds = self.read_byte(SECONDS)?;
        let minutes = self.read_byte(MINUTES)?;
        let hours = self.read_byte(HOURS)?;
        Ok(RtcTime::from_registers([seconds, minutes, hours]))
    }

    /// Reads the calendar date, one register per transfer.
    ///
    /// # Errors
    /// [`Ds1307Error::InvalidDate`] if the day register holds no weekday.
    pub fn date(&mut self) -> Ds1307Result<RtcDate> {
        let mut regs = [0; 4];
        for (value, reg) in regs.iter_mut().zip([DAY, DATE, MONTH, YEAR]) {
            *value = self.read_byte(reg)?;
        }
        RtcDate::from_registers(regs)
    }

    /// Reads time and date from one burst over registers 0x00-0x06, so both belong to the same
    /// second.
    pub fn date_time(&mut self) -> Ds1307Result<(RtcTime, RtcDate)> {
        let mut regs = [0; 7];
        self.read_registers(SECONDS, &mut regs)?;
        let time = RtcTime::from_registers([regs[0], regs[1], regs[2]]);
        let date = RtcDate::from_registers([regs[3], regs[4], regs[5], regs[6]])?;
        Ok((time, date))
    }

    /// Whether the oscillator is stopped.
    pub fn is_halted(&mut self) -> Ds1307Result<bool> {
        Ok(SecondsRegister::from_bits(self.read_byte(SECONDS)?).clock_halt())
    }

    /// Stops or restarts the oscillator, keeping the current seconds.
    pub fn halt(&mut self, halt: bool) -> Ds1307Result<()> {
        let seconds = SecondsRegister::from_bits(self.read_byte(SECONDS)?).with_clock_halt(halt);
        self.write(SECONDS, &[seconds.into_bits()])
    }

    /// Reads the control register.
    pub fn control(&mut self) -> Ds1307Result<ControlRegister> {
        Ok(ControlRegister::from_bits(self.read_byte(CONTROL)?))
    }

    /// Writes the control register.
    pub fn set_control(&mut self, control: ControlRegister) -> Ds1307Result<()> {
        self.write(CONTROL, &[control.into_bits()])
    }

    /// Configures the SQW/OUT pin.
    pub fn set_square_wave(&mut self, wave: SquareWave) -> Ds1307Result<()> {
        self.set_control(wave.into())
    }

    /// Reads from the battery-backed RAM, `offset` counted from its first byte.
    pub fn read_ram(&mut self, offset: u8, buf: &mut [u8]) -> Ds1307Result<()> {
        check_ram(offset, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        self.read_registers(RAM_START + offset, buf)
    }

    /// Writes to the battery-backed RAM, `offset` counted from its first byte.
    pub fn write_ram(&mut self, offset: u8, bytes: &[u8]) -> Ds1307Result<()> {
        check_ram(offset, bytes.len())?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.write(RAM_START + offset, bytes)
    }

    /// Reads consecutive registers starting at `start`.
    ///
    /// The register pointer is set with a repeated-start write, then `buf.len()` bytes are read;
    /// the chip advances its pointer after each byte and wraps from 0x3F to 0x00.
    pub fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Ds1307Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        self.transfer(Direction::Tx, |t| {
            t.send(DS1307_ADDR, &[start], RepeatedStart::Enable)
        })?;
        let len = buf.len();
        self.transfer(Direction::Rx, |t| {
            t.receive(DS1307_ADDR, len, RepeatedStart::Disable)
        })?;
        let got = self.transport.take_received(buf);
        if got < len {
            warn!("DS1307: short read, {got} of {len} bytes");
            return Err(Ds1307Error::Bus(BusFault::Other));
        }
        trace!("DS1307: read {start:#04x}: {buf:02x?}");
        Ok(())
    }

    fn read_byte(&mut self, reg: u8) -> Ds1307Result<u8> {
        let mut value = [0];
        self.read_registers(reg, &mut value)?;
        Ok(value[0])
    }

    /// Writes `bytes` to consecutive registers starting at `reg`, in one transfer.
    fn write(&mut self, reg: u8, bytes: &[u8]) -> Ds1307Result<()> {
        let mut frame = [0; 1 + RAM_SIZE];
        let frame = frame
            .get_mut(..=bytes.len())
            .ok_or(Ds1307Error::InvalidAddress)?;
        frame[0] = reg;
        frame[1..].copy_from_slice(bytes);
        trace!("DS1307: write {frame:02x?}");
        let frame = &*frame;
        self.transfer(Direction::Tx, |t| {
            t.send(DS1307_ADDR, frame, RepeatedStart::Disable)
        })
    }

    /// Starts a transfer and blocks until its completion flag is signaled.
    fn transfer(
        &mut self,
        direction: Direction,
        mut start: impl FnMut(&mut T) -> TransferStatus,
    ) -> Ds1307Result<()> {
        let flags = self.flags;
        let completion = match direction {
            Direction::Tx => &flags.tx,
            Direction::Rx => &flags.rx,
        };
        completion.start();
        let mut tries = 0;
        while start(&mut self.transport) == TransferStatus::Busy {
            if tries >= self.retries {
                completion.cancel();
                warn!("DS1307: transport busy after {tries} attempts");
                return Err(Ds1307Error::TransportBusy);
            }
            tries += 1;
            self.delay.delay_us(self.poll_interval_us);
        }
        let mut polls = 0;
        loop {
            match completion.state() {
                TransferState::Complete => return Ok(()),
                TransferState::Failed(fault) => {
                    warn!("DS1307: {direction:?} failed: {fault:?}");
                    self.transport.generate_stop();
                    return Err(Ds1307Error::Bus(fault));
                }
                TransferState::Idle | TransferState::InProgress => {}
            }
            if polls >= self.retries {
                warn!("DS1307: {direction:?} never completed");
                completion.cancel();
                self.transport.generate_stop();
                return Err(Ds1307Error::Timeout);
            }
            polls += 1;
            self.delay.delay_us(self.poll_interval_us);
        }
    }
}

fn check_ram(offset: u8, len: usize) -> Ds1307Result<()> {
    if offset as usize + len > RAM_SIZE {
        warn!("DS1307: RAM access {offset}+{len} out of range");
        return Err(Ds1307Error::InvalidAddress);
    }
    Ok(())
}
