//! Time-of-day arithmetic

use core::fmt;

/// Minutes in one day
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Cumulative days before each month in a non-leap year
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Hour and minute within a day
///
/// Ordering compares the hour first, then the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const MIDNIGHT: Self = Self::new(0, 0);

    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Minutes elapsed since 00:00
    pub const fn minutes_since_midnight(self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }

    /// Build a time from minutes since midnight, wrapping into one day
    pub const fn from_minutes(minutes: i32) -> Self {
        let m = minutes.rem_euclid(MINUTES_PER_DAY);
        Self::new((m / 60) as u8, (m % 60) as u8)
    }

    /// Shift by a signed number of minutes
    ///
    /// Minute overflow carries into the hour and the result wraps around
    /// midnight in both directions, so 23:30 + 90 is 01:00. The date is
    /// not tracked.
    pub const fn add_minutes(self, delta: i32) -> Self {
        Self::from_minutes(self.minutes_since_midnight() + delta)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Day of the year (1-based) for a calendar date
///
/// Uses a fixed non-leap month table, so from March onwards a leap year
/// is one day behind. An invalid month yields day 1.
pub fn day_of_year(month: u8, day: u8) -> u16 {
    match month {
        1..=12 => DAYS_BEFORE_MONTH[month as usize - 1] + day as u16,
        _ => 1,
    }
}
