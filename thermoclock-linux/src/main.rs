use std::{thread, time::Duration};

use clap::Parser;
use ds1307::{BlockingTransport, Ds1307Builder, RtcDate, RtcTime, TimeFormat, TransferFlags, Weekday};
use ds18b20::{Ds18b20, Temperature};
use linux_embedded_hal::{
    CdevPin, Delay, I2cdev,
    gpio_cdev::{Chip, LineRequestFlags},
};
use onewire_gpio::OneWireGpio;

static RTC_FLAGS: TransferFlags = TransferFlags::new();

/// Logs the DS18B20 temperature together with the DS1307 time
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(long, default_value = "/dev/i2c-1")]
    i2c: String,
    /// GPIO character device holding the 1-Wire line
    #[arg(long, default_value = "/dev/gpiochip0")]
    gpio_chip: String,
    /// Line offset of the 1-Wire data pin
    #[arg(short, long)]
    line: u32,
    /// Set the clock to this 24-hour time (HH:MM:SS)
    #[arg(long, value_parser = parse_time)]
    set_time: Option<RtcTime>,
    /// Set the calendar to this date (YY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    set_date: Option<RtcDate>,
    /// Number of readings, 0 to run forever
    #[arg(short, long, default_value_t = 0)]
    count: u32,
    /// Pause between readings in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    /// Warn when the temperature rises above this value (°C)
    #[arg(long, value_parser = parse_celsius)]
    alarm_above: Option<Temperature>,
}

fn parse_time(s: &str) -> Result<RtcTime, String> {
    let [hour, minute, second] = parse_fields(s, ':')?;
    let time = RtcTime::new(hour, minute, second, TimeFormat::H24);
    if time.is_valid() {
        Ok(time)
    } else {
        Err(format!("{s} is not a valid time"))
    }
}

fn parse_date(s: &str) -> Result<RtcDate, String> {
    let [year, month, date] = parse_fields(s, '-')?;
    let day = weekday(year, month, date);
    let date = RtcDate::new(day, date, month, year);
    if date.is_valid() {
        Ok(date)
    } else {
        Err(format!("{s} is not a valid date"))
    }
}

fn parse_celsius(s: &str) -> Result<Temperature, String> {
    s.parse::<Temperature>().map_err(|e| format!("{s}: {e}"))
}

fn parse_fields(s: &str, sep: char) -> Result<[u8; 3], String> {
    let fields = s
        .split(sep)
        .map(|f| f.parse::<u8>().map_err(|e| format!("{f}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    fields
        .try_into()
        .map_err(|_| format!("{s}: expected three fields separated by '{sep}'"))
}

/// Day of the week of a date in 2000-2099 (Sakamoto's method).
fn weekday(year: u8, month: u8, date: u8) -> Weekday {
    const OFFSETS: [u32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let mut y = 2000 + u32::from(year);
    if month < 3 {
        y -= 1;
    }
    let m = usize::from(month.clamp(1, 12) - 1);
    let d = (y + y / 4 - y / 100 + y / 400 + OFFSETS[m] + u32::from(date)) % 7;
    Weekday::try_from(d as u8 + 1).unwrap_or_default()
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();

    // Claim the 1-Wire line as open-drain, released (high) by default
    let mut chip = Chip::new(&args.gpio_chip).expect("Failed to open GPIO chip");
    let handle = chip
        .get_line(args.line)
        .and_then(|line| {
            line.request(
                LineRequestFlags::OUTPUT | LineRequestFlags::OPEN_DRAIN,
                1,
                "thermoclock-onewire",
            )
        })
        .expect("Failed to request 1-Wire line");
    let pin = CdevPin::new(handle).expect("Failed to create GPIO pin");
    let mut onewire = OneWireGpio::new(pin, Delay);
    let mut delay = Delay;

    // Open the I2C bus and start the clock
    let i2c = I2cdev::new(&args.i2c).expect("Failed to open I2C device");
    let mut rtc = Ds1307Builder::default()
        .with_poll_interval_us(50)
        .build(BlockingTransport::new(i2c), Delay, &RTC_FLAGS);
    if rtc.init().expect("Failed to initialize DS1307") {
        log::warn!("DS1307 oscillator did not start");
    }
    if let Some(time) = args.set_time {
        rtc.set_time(&time).expect("Failed to set time");
        log::info!("Time set to {time}");
    }
    if let Some(date) = args.set_date {
        rtc.set_date(&date).expect("Failed to set date");
        log::info!("Date set to {date}");
    }

    let sensor = Ds18b20::new();
    match Ds18b20::read_rom(&mut onewire) {
        Ok(rom) => log::info!("DS18B20 ROM: {rom:016x}"),
        Err(e) => log::warn!("Could not read ROM: {e:?}"),
    }

    let mut taken = 0;
    while args.count == 0 || taken < args.count {
        taken += 1;
        let (time, date) = match rtc.date_time() {
            Ok(now) => now,
            Err(e) => {
                log::error!("Failed to read clock: {e:?}");
                thread::sleep(Duration::from_millis(args.interval_ms));
                continue;
            }
        };
        match sensor.read_temperature(&mut onewire, &mut delay) {
            Ok(sample) => {
                let temp = sample.to_fixed();
                log::info!("{date} {time}: {sample}");
                if args.alarm_above.is_some_and(|limit| temp > limit) {
                    log::warn!("{date} {time}: temperature {temp} above limit");
                }
            }
            Err(e) => log::error!("{date} {time}: failed to read temperature: {e:?}"),
        }
        thread::sleep(Duration::from_millis(args.interval_ms));
    }
}
