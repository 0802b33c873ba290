//! Simulated collaborators for host tests
//!
//! Enabled for this crate's own tests and, through the `testing-support`
//! feature, for integration tests and downstream crates.

use coopdoor_hal::{KeyValueStore, StorageError, StorageKey};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use heapless::{String, Vec};

use crate::config::DoorConfig;
use crate::controller::{Devices, Platform};
use crate::door::Door;
use crate::sun::{Clock, ClockConfig, ClockTime, SunTable};
use crate::traits::{
    Actuator, Button, ButtonPad, CharDisplay, DateTime, DisplayError, TimeSource, DEGREE_GLYPH,
};

/// Actuator that tracks a signed position
#[derive(Debug, Default)]
pub struct SimActuator {
    enabled: bool,
    position: i64,
    total_steps: u64,
    enable_cycles: u32,
    stepped_while_disabled: bool,
}

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net position; opening runs negative with the default config
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Steps driven in either direction
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Number of times the driver was energised
    pub fn enable_cycles(&self) -> u32 {
        self.enable_cycles
    }

    /// Whether `step` was ever called without the driver energised
    pub fn stepped_while_disabled(&self) -> bool {
        self.stepped_while_disabled
    }
}

impl Actuator for SimActuator {
    fn enable(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.enable_cycles += 1;
        }
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn step(&mut self, steps: i32) {
        if !self.enabled {
            self.stepped_while_disabled = true;
        }
        self.position += steps as i64;
        self.total_steps += steps.unsigned_abs() as u64;
    }
}

/// Limit switch that trips after a number of reads
///
/// The door reads the switch once before every step, so a switch built
/// with `trips_after(n)` stops an open run after exactly `n` steps.
#[derive(Debug, Clone)]
pub struct SimLimitSwitch {
    reads: u32,
    trip_after: Option<u32>,
    faulty: bool,
}

impl SimLimitSwitch {
    pub fn trips_after(reads: u32) -> Self {
        Self {
            reads: 0,
            trip_after: Some(reads),
            faulty: false,
        }
    }

    /// A switch that never trips
    pub fn never() -> Self {
        Self {
            reads: 0,
            trip_after: None,
            faulty: false,
        }
    }

    /// A switch whose every read fails
    pub fn faulty() -> Self {
        Self {
            reads: 0,
            trip_after: None,
            faulty: true,
        }
    }
}

impl ErrorType for SimLimitSwitch {
    type Error = ErrorKind;
}

impl InputPin for SimLimitSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.faulty {
            return Err(ErrorKind::Other);
        }
        self.reads += 1;
        Ok(self.trip_after.is_some_and(|n| self.reads > n))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// RTC stand-in holding a settable date and time
#[derive(Debug, Clone)]
pub struct SimClock {
    now: DateTime,
    temperature_x10: Option<i16>,
}

impl SimClock {
    pub fn new(now: DateTime) -> Self {
        Self {
            now,
            temperature_x10: Some(200),
        }
    }

    pub fn set_now(&mut self, now: DateTime) {
        self.now = now;
    }
}

impl TimeSource for SimClock {
    fn now(&mut self) -> DateTime {
        self.now
    }

    fn set_time(&mut self, hour: u8, minute: u8) {
        self.now.hour = hour;
        self.now.minute = minute;
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) {
        self.now.year = year;
        self.now.month = month;
        self.now.day = day;
    }

    fn temperature_x10(&mut self) -> Option<i16> {
        self.temperature_x10
    }
}

/// Same sunrise and sunset every day
#[derive(Debug, Clone, Copy)]
pub struct FixedSun {
    pub sunrise: ClockTime,
    pub sunset: ClockTime,
}

impl FixedSun {
    pub const fn new(sunrise: ClockTime, sunset: ClockTime) -> Self {
        Self { sunrise, sunset }
    }
}

impl SunTable for FixedSun {
    fn sunrise(&self, _day_of_year: u16) -> ClockTime {
        self.sunrise
    }

    fn sunset(&self, _day_of_year: u16) -> ClockTime {
        self.sunset
    }
}

const MAX_VALUE_LEN: usize = 16;
const KEY_COUNT: usize = 5;

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: [Option<Vec<u8, MAX_VALUE_LEN>>; KEY_COUNT],
    writes: u32,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with [`StorageError::Flash`]
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Successful writes so far
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let value = self.values[key.as_u8() as usize]
            .as_ref()
            .ok_or(StorageError::NotFound)?;
        if buffer.len() < value.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        let value = Vec::from_slice(data).map_err(|_| StorageError::Full)?;
        self.values[key.as_u8() as usize] = Some(value);
        self.writes += 1;
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        self.values = Default::default();
        Ok(())
    }
}

/// HD44780 DDRAM row width
const DDRAM_COLS: usize = 40;

/// Display that keeps the character grid in memory
#[derive(Debug)]
pub struct RecordingDisplay {
    cells: [[u8; DDRAM_COLS]; 2],
    col: usize,
    row: usize,
    powered: bool,
    clears: u32,
    fail: bool,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            cells: [[b' '; DDRAM_COLS]; 2],
            col: 0,
            row: 0,
            powered: true,
            clears: 0,
            fail: false,
        }
    }

    /// Text of a row with trailing blanks removed; the degree glyph
    /// reads back as `°`
    pub fn row(&self, row: usize) -> String<64> {
        let mut text = String::new();
        let cells = &self.cells[row];
        let used = cells.iter().rposition(|&c| c != b' ').map_or(0, |i| i + 1);
        for &c in &cells[..used] {
            let ch = match c {
                DEGREE_GLYPH => '°',
                0x20..=0x7E => c as char,
                _ => '?',
            };
            let _ = text.push(ch);
        }
        text
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Number of full redraws so far
    pub fn clear_count(&self) -> u32 {
        self.clears
    }

    /// Make every following call fail with [`DisplayError::Bus`]
    pub fn fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    fn check(&self) -> Result<(), DisplayError> {
        if self.fail {
            Err(DisplayError::Bus)
        } else {
            Ok(())
        }
    }
}

impl CharDisplay for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.check()?;
        self.cells = [[b' '; DDRAM_COLS]; 2];
        self.col = 0;
        self.row = 0;
        self.clears += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.check()?;
        if row as usize >= self.cells.len() || col as usize >= DDRAM_COLS {
            return Err(DisplayError::OutOfBounds);
        }
        self.col = col as usize;
        self.row = row as usize;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        text.bytes().try_for_each(|b| self.write_byte(b))
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.check()?;
        // Text past the end of the row is lost, as on the controller
        if self.col < DDRAM_COLS {
            self.cells[self.row][self.col] = byte;
            self.col += 1;
        }
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.check()?;
        self.powered = on;
        Ok(())
    }
}

/// Button levels driven by the test
///
/// A held button reads pressed for a fixed number of polls, then releases.
#[derive(Debug, Default)]
pub struct SimButtons {
    left_reads: u32,
    right_reads: u32,
}

impl SimButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `button` pressed for the next `reads` polls
    pub fn hold(&mut self, button: Button, reads: u32) {
        match button {
            Button::Left => self.left_reads = reads,
            Button::Right => self.right_reads = reads,
        }
    }
}

impl ButtonPad for SimButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        let remaining = match button {
            Button::Left => &mut self.left_reads,
            Button::Right => &mut self.right_reads,
        };
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        true
    }
}

/// Delay that returns immediately and records the requested time
#[derive(Debug, Default)]
pub struct NoDelay {
    total_ns: u64,
}

impl NoDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Platform built from the simulated collaborators
pub struct SimPlatform;

impl Platform for SimPlatform {
    type Actuator = SimActuator;
    type LimitSwitch = SimLimitSwitch;
    type Time = SimClock;
    type Sun = FixedSun;
    type Store = MemoryStore;
    type Display = RecordingDisplay;
    type Buttons = SimButtons;
    type Delay = NoDelay;
}

/// Sunrise used by [`sim_devices`]
pub const SIM_SUNRISE: ClockTime = ClockTime::new(6, 0);
/// Sunset used by [`sim_devices`]
pub const SIM_SUNSET: ClockTime = ClockTime::new(20, 0);

/// Simulated devices with sunrise at 06:00, sunset at 20:00, no offsets,
/// and a closed uncalibrated door
pub fn sim_devices(now: DateTime, limit: SimLimitSwitch) -> Devices<SimPlatform> {
    Devices {
        door: Door::new(SimActuator::new(), limit, DoorConfig::default()),
        clock: Clock::new(
            SimClock::new(now),
            FixedSun::new(SIM_SUNRISE, SIM_SUNSET),
            ClockConfig::default(),
        ),
        store: MemoryStore::new(),
        display: RecordingDisplay::new(),
        buttons: SimButtons::new(),
        delay: NoDelay::new(),
    }
}
