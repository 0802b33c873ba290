//! Day/night oracle over an RTC and a sun table

use super::table::SunTable;
use super::time::{day_of_year, ClockTime};
use crate::traits::{DateTime, TimeSource};

/// User-adjustable offsets applied to the raw sun table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Local time minus the sun table's reference time
    pub timezone_offset_minutes: i16,
    /// Minutes added to sunrise before opening
    pub open_delay_minutes: i16,
    /// Minutes added to sunset before closing
    pub close_delay_minutes: i16,
}

impl ClockConfig {
    fn open_offset(&self) -> i32 {
        self.timezone_offset_minutes as i32 + self.open_delay_minutes as i32
    }

    fn close_offset(&self) -> i32 {
        self.timezone_offset_minutes as i32 + self.close_delay_minutes as i32
    }
}

/// Check whether `now` falls in the half-open window `[open, close)`
///
/// A window whose close time is earlier than its open time spans
/// midnight. Equal bounds give an empty window.
pub fn in_window(now: ClockTime, open: ClockTime, close: ClockTime) -> bool {
    if open <= close {
        now >= open && now < close
    } else {
        now >= open || now < close
    }
}

/// Wall clock with sunrise/sunset edge detection
///
/// The two edge detectors keep separate memories. Both must be polled
/// once per control-loop tick, otherwise an edge seen by one is still
/// pending for the other.
pub struct Clock<T, S> {
    time: T,
    table: S,
    config: ClockConfig,
    last_rise_reading: bool,
    last_set_reading: bool,
}

impl<T: TimeSource, S: SunTable> Clock<T, S> {
    /// Create a clock, seeding both edge detectors with the current reading
    pub fn new(time: T, table: S, config: ClockConfig) -> Self {
        let mut clock = Self {
            time,
            table,
            config,
            last_rise_reading: false,
            last_set_reading: false,
        };

        let day = clock.is_day();
        clock.last_rise_reading = day;
        clock.last_set_reading = day;
        info!("Clock started, is_day={}", day);
        clock
    }

    /// Current date and time from the RTC
    pub fn now(&mut self) -> DateTime {
        self.time.now()
    }

    /// RTC die temperature in 0.1°C units
    pub fn temperature_x10(&mut self) -> Option<i16> {
        self.time.temperature_x10()
    }

    fn open_time_on(&self, now: &DateTime) -> ClockTime {
        let day = day_of_year(now.month, now.day);
        self.table.sunrise(day).add_minutes(self.config.open_offset())
    }

    fn close_time_on(&self, now: &DateTime) -> ClockTime {
        let day = day_of_year(now.month, now.day);
        self.table.sunset(day).add_minutes(self.config.close_offset())
    }

    /// Today's sunrise shifted by timezone and open delay
    pub fn open_time(&mut self) -> ClockTime {
        let now = self.time.now();
        self.open_time_on(&now)
    }

    /// Today's sunset shifted by timezone and close delay
    pub fn close_time(&mut self) -> ClockTime {
        let now = self.time.now();
        self.close_time_on(&now)
    }

    /// Check if the current time is inside today's open window
    ///
    /// The open minute counts as day and the close minute as night.
    pub fn is_day(&mut self) -> bool {
        let now = self.time.now();
        let open = self.open_time_on(&now);
        let close = self.close_time_on(&now);
        in_window(ClockTime::new(now.hour, now.minute), open, close)
    }

    /// True exactly when the last call saw night and this one sees day
    pub fn sunrise_edge(&mut self) -> bool {
        let current = self.is_day();
        let last = core::mem::replace(&mut self.last_rise_reading, current);
        if !last && current {
            info!("Sunrise edge");
        }
        !last && current
    }

    /// True exactly when the last call saw day and this one sees night
    pub fn sunset_edge(&mut self) -> bool {
        let current = self.is_day();
        let last = core::mem::replace(&mut self.last_set_reading, current);
        if last && !current {
            info!("Sunset edge");
        }
        last && !current
    }

    /// Set the RTC time, keeping the date
    pub fn set_time(&mut self, hour: u8, minute: u8) {
        self.time.set_time(hour, minute);
    }

    /// Set the RTC date, keeping the time
    pub fn set_date(&mut self, year: u16, month: u8, day: u8) {
        self.time.set_date(year, month, day);
    }

    pub fn set_timezone(&mut self, minutes: i16) {
        self.config.timezone_offset_minutes = minutes;
    }

    pub fn set_open_delay(&mut self, minutes: i16) {
        self.config.open_delay_minutes = minutes;
    }

    pub fn set_close_delay(&mut self, minutes: i16) {
        self.config.close_delay_minutes = minutes;
    }

    pub fn timezone(&self) -> i16 {
        self.config.timezone_offset_minutes
    }

    pub fn open_delay(&self) -> i16 {
        self.config.open_delay_minutes
    }

    pub fn close_delay(&self) -> i16 {
        self.config.close_delay_minutes
    }

    pub fn config(&self) -> ClockConfig {
        self.config
    }

    /// Access the underlying time source
    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedSun, SimClock};

    fn clock_at(hour: u8, minute: u8) -> Clock<SimClock, FixedSun> {
        Clock::new(
            SimClock::new(DateTime::new(2024, 6, 1, hour, minute)),
            FixedSun::new(ClockTime::new(6, 0), ClockTime::new(20, 0)),
            ClockConfig::default(),
        )
    }

    fn set_now(clock: &mut Clock<SimClock, FixedSun>, hour: u8, minute: u8) {
        clock.time_source_mut().set_time(hour, minute);
    }

    #[test]
    fn test_is_day_boundaries() {
        let mut clock = clock_at(5, 59);
        assert!(!clock.is_day());
        set_now(&mut clock, 6, 0);
        assert!(clock.is_day());
        set_now(&mut clock, 19, 59);
        assert!(clock.is_day());
        set_now(&mut clock, 20, 0);
        assert!(!clock.is_day());
    }

    #[test]
    fn test_is_day_same_hour_as_open() {
        let mut clock = Clock::new(
            SimClock::new(DateTime::new(2024, 6, 1, 6, 20)),
            FixedSun::new(ClockTime::new(6, 30), ClockTime::new(20, 15)),
            ClockConfig::default(),
        );
        assert!(!clock.is_day());
        set_now(&mut clock, 20, 10);
        assert!(clock.is_day());
        set_now(&mut clock, 20, 15);
        assert!(!clock.is_day());
    }

    #[test]
    fn test_offsets_shift_window() {
        let mut clock = clock_at(6, 30);
        clock.set_timezone(60);
        assert_eq!(clock.open_time(), ClockTime::new(7, 0));
        assert!(!clock.is_day());

        clock.set_open_delay(-45);
        assert_eq!(clock.open_time(), ClockTime::new(6, 15));
        assert!(clock.is_day());

        clock.set_close_delay(30);
        assert_eq!(clock.close_time(), ClockTime::new(21, 30));
    }

    #[test]
    fn test_window_across_midnight() {
        let mut clock = clock_at(23, 0);
        // Sunset pushed past midnight
        clock.set_close_delay(5 * 60);
        assert_eq!(clock.close_time(), ClockTime::new(1, 0));
        assert!(clock.is_day());
        set_now(&mut clock, 0, 59);
        assert!(clock.is_day());
        set_now(&mut clock, 1, 0);
        assert!(!clock.is_day());
        set_now(&mut clock, 5, 0);
        assert!(!clock.is_day());
    }

    #[test]
    fn test_sunrise_edge_fires_once() {
        let mut clock = clock_at(5, 59);
        assert!(!clock.sunrise_edge());

        set_now(&mut clock, 6, 0);
        assert!(clock.sunrise_edge());
        assert!(!clock.sunrise_edge());
    }

    #[test]
    fn test_edges_are_independent() {
        let mut clock = clock_at(19, 59);
        set_now(&mut clock, 20, 0);

        // The rise detector consuming a reading must not hide the sunset
        assert!(!clock.sunrise_edge());
        assert!(clock.sunset_edge());
        assert!(!clock.sunset_edge());
    }

    #[test]
    fn test_edges_never_both_true() {
        let mut clock = clock_at(5, 0);
        for (h, m) in [(6, 0), (12, 0), (20, 0), (23, 59), (6, 0), (20, 0)] {
            set_now(&mut clock, h, m);
            let rise = clock.sunrise_edge();
            let set = clock.sunset_edge();
            assert!(!(rise && set));
        }
    }

    #[test]
    fn test_no_edge_at_startup() {
        let mut clock = clock_at(12, 0);
        assert!(!clock.sunrise_edge());
        assert!(!clock.sunset_edge());
    }

    #[test]
    fn test_set_time_writes_through() {
        let mut clock = clock_at(12, 0);
        clock.set_time(8, 15);
        clock.set_date(2025, 2, 3);
        assert_eq!(clock.now(), DateTime::new(2025, 2, 3, 8, 15));
    }
}
