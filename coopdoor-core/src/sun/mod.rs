//! Sunrise/sunset clock and day/night classification
//!
//! Sunrise and sunset come from a precomputed per-day table. The clock
//! shifts them by the timezone offset and the user's open/close delays,
//! then classifies the current wall-clock time as day or night.

pub mod clock;
pub mod table;
pub mod time;

pub use clock::{Clock, ClockConfig};
pub use table::{DailyTable, SunTable};
pub use time::{day_of_year, ClockTime};
