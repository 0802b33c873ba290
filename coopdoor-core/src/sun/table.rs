//! Per-day sunrise/sunset lookup

use super::time::ClockTime;

/// Source of raw sunrise/sunset times, indexed by day of year (1-based)
pub trait SunTable {
    fn sunrise(&self, day_of_year: u16) -> ClockTime;
    fn sunset(&self, day_of_year: u16) -> ClockTime;
}

impl<T: SunTable + ?Sized> SunTable for &T {
    fn sunrise(&self, day_of_year: u16) -> ClockTime {
        (**self).sunrise(day_of_year)
    }

    fn sunset(&self, day_of_year: u16) -> ClockTime {
        (**self).sunset(day_of_year)
    }
}

/// Table backed by two static arrays (entry 0 is January 1st)
///
/// Out-of-range days are clamped to the first or last entry, so a
/// 365-entry table also answers day 366.
#[derive(Debug, Clone, Copy)]
pub struct DailyTable {
    sunrise: &'static [ClockTime],
    sunset: &'static [ClockTime],
}

impl DailyTable {
    pub const fn new(sunrise: &'static [ClockTime], sunset: &'static [ClockTime]) -> Self {
        Self { sunrise, sunset }
    }

    /// Number of days covered
    pub fn len(&self) -> usize {
        self.sunrise.len().min(self.sunset.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lookup(table: &[ClockTime], day_of_year: u16) -> ClockTime {
    let Some(last) = table.len().checked_sub(1) else {
        return ClockTime::MIDNIGHT;
    };
    let index = (day_of_year.max(1) as usize - 1).min(last);
    table[index]
}

impl SunTable for DailyTable {
    fn sunrise(&self, day_of_year: u16) -> ClockTime {
        lookup(self.sunrise, day_of_year)
    }

    fn sunset(&self, day_of_year: u16) -> ClockTime {
        lookup(self.sunset, day_of_year)
    }
}
