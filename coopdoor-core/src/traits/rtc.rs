//! Real-time clock trait

/// Calendar date and wall-clock time as kept by the RTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }
}

/// Time source backed by a battery-buffered RTC
///
/// Reads are infallible from the caller's point of view: drivers are
/// expected to return their last good reading when the bus fails.
pub trait TimeSource {
    /// Current date and time
    fn now(&mut self) -> DateTime;

    /// Set the wall-clock time, keeping the current seconds
    fn set_time(&mut self, hour: u8, minute: u8);

    /// Set the calendar date
    fn set_date(&mut self, year: u16, month: u8, day: u8);

    /// Die temperature in 0.1°C units, if the chip provides one
    fn temperature_x10(&mut self) -> Option<i16>;
}
