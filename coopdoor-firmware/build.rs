//! Build script for coopdoor-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates door.toml at compile time
//! - Generates the daily sunrise/sunset table and door constants

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Timelike};
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Non-leap reference year; the firmware indexes the table by day of year
const TABLE_YEAR: i32 = 2025;
const TABLE_DAYS: u32 = 365;

fn main() {
    setup_linker();
    let config = load_config();
    generate(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Settings read from door.toml
struct DoorToml {
    latitude: f64,
    longitude: f64,
    utc_offset_minutes: i64,
    max_steps: i64,
    max_jog_steps: i64,
    open_direction: String,
    inactivity_timeout_s: i64,
    result_screen_ms: i64,
}

fn fail(lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: invalid door.toml                                        ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Read and validate door.toml
fn load_config() -> DoorToml {
    println!("cargo:rerun-if-changed=door.toml");

    let path = Path::new("door.toml");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&[format!("cannot read door.toml: {}", e)]),
    };
    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(&e.to_string().lines().map(str::to_string).collect::<Vec<_>>()),
    };

    let mut errors = Vec::new();

    let float = |section: &str, key: &str, errors: &mut Vec<String>| -> f64 {
        match value.get(section).and_then(|s| s.get(key)) {
            Some(toml::Value::Float(f)) => *f,
            Some(toml::Value::Integer(i)) => *i as f64,
            _ => {
                errors.push(format!("[{}] missing number '{}'", section, key));
                0.0
            }
        }
    };
    let int = |section: &str, key: &str, default: i64, errors: &mut Vec<String>| -> i64 {
        match value.get(section).and_then(|s| s.get(key)) {
            Some(toml::Value::Integer(i)) => *i,
            None => default,
            Some(_) => {
                errors.push(format!("[{}] '{}' must be an integer", section, key));
                default
            }
        }
    };

    let config = DoorToml {
        latitude: float("location", "latitude", &mut errors),
        longitude: float("location", "longitude", &mut errors),
        utc_offset_minutes: int("location", "utc_offset_minutes", 0, &mut errors),
        max_steps: int("door", "max_steps", 65_534, &mut errors),
        max_jog_steps: int("door", "max_jog_steps", 4_096, &mut errors),
        open_direction: value
            .get("door")
            .and_then(|d| d.get("open_direction"))
            .and_then(|d| d.as_str())
            .unwrap_or("ccw")
            .to_string(),
        inactivity_timeout_s: int("menu", "inactivity_timeout_s", 30, &mut errors),
        result_screen_ms: int("menu", "result_screen_ms", 2_000, &mut errors),
    };

    if !(-90.0..=90.0).contains(&config.latitude) {
        errors.push("[location] latitude must be -90..90".to_string());
    }
    if !(-180.0..=180.0).contains(&config.longitude) {
        errors.push("[location] longitude must be -180..180".to_string());
    }
    if !(-720..=840).contains(&config.utc_offset_minutes) {
        errors.push("[location] utc_offset_minutes must be -720..840".to_string());
    }
    if !(1..=u32::MAX as i64).contains(&config.max_steps) {
        errors.push("[door] max_steps must be a positive u32".to_string());
    }
    if !(1..=config.max_steps).contains(&config.max_jog_steps) {
        errors.push("[door] max_jog_steps must be 1..=max_steps".to_string());
    }
    if !["cw", "ccw"].contains(&config.open_direction.as_str()) {
        errors.push("[door] open_direction must be 'cw' or 'ccw'".to_string());
    }
    if config.inactivity_timeout_s <= 0 {
        errors.push("[menu] inactivity_timeout_s must be positive".to_string());
    }
    if !(0..=u32::MAX as i64).contains(&config.result_screen_ms) {
        errors.push("[menu] result_screen_ms must fit in u32".to_string());
    }

    if !errors.is_empty() {
        fail(&errors);
    }
    println!("cargo:warning=door.toml validated successfully");
    config
}

/// Sunrise and sunset for one day as local standard time (hour, minute)
fn sun_times(coord: Coordinates, date: NaiveDate, offset_minutes: i64) -> [(u32, u32); 2] {
    let day = SolarDay::new(coord, date);
    [SolarEvent::Sunrise, SolarEvent::Sunset].map(|event| {
        let utc = day.event_time(event);
        let minutes = (utc.hour() as i64 * 60 + utc.minute() as i64 + offset_minutes)
            .rem_euclid(24 * 60);
        ((minutes / 60) as u32, (minutes % 60) as u32)
    })
}

/// Write door constants and the sun table to OUT_DIR/door_config.rs
fn generate(config: &DoorToml) {
    let coord = match Coordinates::new(config.latitude, config.longitude) {
        Some(coord) => coord,
        None => fail(&["[location] coordinates rejected".to_string()]),
    };

    let mut sunrise = String::new();
    let mut sunset = String::new();
    for day in 1..=TABLE_DAYS {
        let date = NaiveDate::from_yo_opt(TABLE_YEAR, day).unwrap();
        let [(rh, rm), (sh, sm)] = sun_times(coord, date, config.utc_offset_minutes);
        writeln!(sunrise, "    ClockTime::new({}, {}), // {:02}/{:02}", rh, rm, date.month(), date.day()).unwrap();
        writeln!(sunset, "    ClockTime::new({}, {}), // {:02}/{:02}", sh, sm, date.month(), date.day()).unwrap();
    }

    let direction = if config.open_direction == "cw" {
        "Direction::Clockwise"
    } else {
        "Direction::CounterClockwise"
    };

    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from door.toml").unwrap();
    writeln!(
        out,
        "// Location {:.4}, {:.4}; UTC offset {} min",
        config.latitude, config.longitude, config.utc_offset_minutes
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub const DOOR_CONFIG: DoorConfig = DoorConfig {{").unwrap();
    writeln!(out, "    max_steps: {},", config.max_steps).unwrap();
    writeln!(out, "    max_jog_steps: {},", config.max_jog_steps).unwrap();
    writeln!(out, "    open_direction: {},", direction).unwrap();
    writeln!(out, "}};").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub const MENU_CONFIG: MenuConfig = MenuConfig {{").unwrap();
    writeln!(out, "    inactivity_timeout_ms: {},", config.inactivity_timeout_s * 1000).unwrap();
    writeln!(out, "    result_screen_ms: {},", config.result_screen_ms).unwrap();
    writeln!(out, "}};").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub static SUNRISE: [ClockTime; {}] = [", TABLE_DAYS).unwrap();
    out.push_str(&sunrise);
    writeln!(out, "];").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub static SUNSET: [ClockTime; {}] = [", TABLE_DAYS).unwrap();
    out.push_str(&sunset);
    writeln!(out, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("door_config.rs"), out).unwrap();
}
