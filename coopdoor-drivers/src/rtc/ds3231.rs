//! DS3231 real-time clock over I2C
//!
//! Timekeeping registers are BCD encoded. The driver always writes the
//! hours register in 24-hour mode but decodes either mode, since a chip
//! set by other firmware may be running in 12-hour mode.
//!
//! Register map (subset):
//!
//! | Addr | Content                    |
//! |------|----------------------------|
//! | 0x00 | seconds                    |
//! | 0x01 | minutes                    |
//! | 0x02 | hours (bit 6: 12h mode)    |
//! | 0x03 | day of week (1-7)          |
//! | 0x04 | day of month               |
//! | 0x05 | month (bit 7: century)     |
//! | 0x06 | year (00-99)               |
//! | 0x0F | status (bit 7: OSF)        |
//! | 0x11 | temperature MSB (signed)   |
//! | 0x12 | temperature LSB (bits 7:6) |

use coopdoor_core::traits::{DateTime, TimeSource};
use embedded_hal::i2c::I2c;

/// Fixed I2C address of the DS3231
pub const DS3231_ADDRESS: u8 = 0x68;

mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const HOURS: u8 = 0x02;
    pub const DAY_OF_WEEK: u8 = 0x03;
    pub const STATUS: u8 = 0x0F;
    pub const TEMP_MSB: u8 = 0x11;
}

const HOURS_12H: u8 = 0x40;
const HOURS_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;
const STATUS_OSF: u8 = 0x80;

/// RTC errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// I2C transfer failed
    Bus,
    /// Registers held a value outside its range
    InvalidData,
    /// Requested date cannot be stored (years 2000-2199 only)
    OutOfRange,
}

fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decode the hours register in either 12h or 24h mode
fn decode_hours(value: u8) -> u8 {
    if value & HOURS_12H != 0 {
        let hour = bcd_to_bin(value & 0x1F) % 12;
        if value & HOURS_PM != 0 {
            hour + 12
        } else {
            hour
        }
    } else {
        bcd_to_bin(value & 0x3F)
    }
}

/// Day of week, 1 = Monday .. 7 = Sunday
fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let m = (month.clamp(1, 12) - 1) as usize;
    // 0 = Sunday
    let dow = (y + y / 4 - y / 100 + y / 400 + OFFSETS[m] + day as u16) % 7;
    if dow == 0 {
        7
    } else {
        dow as u8
    }
}

/// DS3231 driver
///
/// The [`TimeSource`] implementation keeps the last good reading and
/// returns it when a transfer fails, so a glitch on the bus never
/// moves the clock.
pub struct Ds3231<I> {
    i2c: I,
    last: DateTime,
    last_error: Option<RtcError>,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            last: DateTime::default(),
            last_error: None,
        }
    }

    /// Error from the most recent failed trait call, cleared on success
    pub fn last_error(&self) -> Option<RtcError> {
        self.last_error
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn read_regs(&mut self, start: u8, buf: &mut [u8]) -> Result<(), RtcError> {
        self.i2c
            .write_read(DS3231_ADDRESS, &[start], buf)
            .map_err(|_| RtcError::Bus)
    }

    fn write_regs(&mut self, data: &[u8]) -> Result<(), RtcError> {
        self.i2c
            .write(DS3231_ADDRESS, data)
            .map_err(|_| RtcError::Bus)
    }

    /// Read date and time
    pub fn read_datetime(&mut self) -> Result<DateTime, RtcError> {
        let mut regs = [0u8; 7];
        self.read_regs(reg::SECONDS, &mut regs)?;

        let minute = bcd_to_bin(regs[1] & 0x7F);
        let hour = decode_hours(regs[2]);
        let day = bcd_to_bin(regs[4] & 0x3F);
        let month = bcd_to_bin(regs[5] & 0x1F);
        let century = if regs[5] & MONTH_CENTURY != 0 { 100 } else { 0 };
        let year = 2000 + century + bcd_to_bin(regs[6]) as u16;

        if minute > 59 || hour > 23 || !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(RtcError::InvalidData);
        }

        Ok(DateTime::new(year, month, day, hour, minute))
    }

    /// Set hours and minutes, keeping the running seconds
    pub fn write_time(&mut self, hour: u8, minute: u8) -> Result<(), RtcError> {
        if hour > 23 || minute > 59 {
            return Err(RtcError::OutOfRange);
        }
        let mut seconds = [0u8; 1];
        self.read_regs(reg::SECONDS, &mut seconds)?;

        self.write_regs(&[
            reg::SECONDS,
            seconds[0] & 0x7F,
            bin_to_bcd(minute),
            bin_to_bcd(hour),
        ])
    }

    /// Set the calendar date and the matching day of week
    pub fn write_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), RtcError> {
        if !(2000..2200).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return Err(RtcError::OutOfRange);
        }
        let offset = year - 2000;
        let century = if offset >= 100 { MONTH_CENTURY } else { 0 };

        self.write_regs(&[
            reg::DAY_OF_WEEK,
            day_of_week(year, month, day),
            bin_to_bcd(day),
            bin_to_bcd(month) | century,
            bin_to_bcd((offset % 100) as u8),
        ])?;
        self.clear_oscillator_stop()
    }

    /// Die temperature in 0.1°C units (0.25°C resolution)
    pub fn read_temperature_x10(&mut self) -> Result<i16, RtcError> {
        let mut regs = [0u8; 2];
        self.read_regs(reg::TEMP_MSB, &mut regs)?;
        // 10-bit two's complement in quarter degrees
        let quarters = ((regs[0] as i8 as i16) << 2) | (regs[1] >> 6) as i16;
        Ok(quarters * 10 / 4)
    }

    /// Check whether the oscillator stopped since the date was last set
    ///
    /// True after the backup battery ran flat; the time is then invalid.
    pub fn lost_power(&mut self) -> Result<bool, RtcError> {
        let mut status = [0u8; 1];
        self.read_regs(reg::STATUS, &mut status)?;
        Ok(status[0] & STATUS_OSF != 0)
    }

    fn clear_oscillator_stop(&mut self) -> Result<(), RtcError> {
        let mut status = [0u8; 1];
        self.read_regs(reg::STATUS, &mut status)?;
        self.write_regs(&[reg::STATUS, status[0] & !STATUS_OSF])
    }

    fn record<T>(&mut self, result: Result<T, RtcError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }
}

impl<I: I2c> TimeSource for Ds3231<I> {
    fn now(&mut self) -> DateTime {
        let result = self.read_datetime();
        if let Some(now) = self.record(result) {
            self.last = now;
        }
        self.last
    }

    fn set_time(&mut self, hour: u8, minute: u8) {
        let result = self.write_time(hour, minute);
        if self.record(result).is_some() {
            self.last.hour = hour;
            self.last.minute = minute;
        }
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) {
        let result = self.write_date(year, month, day);
        if self.record(result).is_some() {
            self.last.year = year;
            self.last.month = month;
            self.last.day = day;
        }
    }

    fn temperature_x10(&mut self) -> Option<i16> {
        let result = self.read_temperature_x10();
        self.record(result)
    }
}
