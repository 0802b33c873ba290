//! Build-time configuration
//!
//! `build.rs` turns door.toml into the constants and the daily sun
//! table below. Edit door.toml and rebuild to customize.

use coopdoor_core::config::{DoorConfig, MenuConfig};
use coopdoor_core::sun::{ClockTime, DailyTable};
use coopdoor_core::traits::Direction;

include!(concat!(env!("OUT_DIR"), "/door_config.rs"));

/// Sunrise/sunset lookup over the generated table
pub fn sun_table() -> DailyTable {
    DailyTable::new(&SUNRISE, &SUNSET)
}
