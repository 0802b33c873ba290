//! Screen content for each menu state
//!
//! Rendering reads from a [`Snapshot`] taken just before drawing, so the
//! text for a state depends only on that snapshot.

use core::fmt::{self, Write};

use heapless::String;

use super::state::MenuState;
use crate::sun::{ClockConfig, ClockTime};
use crate::traits::{CharDisplay, CharDisplayExt, DateTime, DisplayError, DEGREE_GLYPH};

/// One formatted row; wider than the panel so long values are clipped
/// by the display rather than dropped here
pub type Line = String<32>;

pub const OPENING_MSG: &str = "Opening door... ";
pub const CLOSING_MSG: &str = "Closing door... ";
const HOLD_R_TO: &str = "Hold R to";
const HOLD_R_TO_CHANGE: &str = "Hold R to change";
const HOLD_R_TO_SAVE: &str = " Hold R to save ";

/// Values shown by the menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub door_open: bool,
    pub now: DateTime,
    pub open_time: ClockTime,
    pub close_time: ClockTime,
    pub config: ClockConfig,
    pub temperature_x10: Option<i16>,
}

/// Format into a fresh line, clipping on overflow
pub fn line(args: fmt::Arguments<'_>) -> Line {
    let mut s = Line::new();
    // Overflow only loses the tail
    let _ = s.write_fmt(args);
    s
}

/// Signed offset in minutes, shown in hours when whole
struct Offset(i16);

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0 as i32;
        if minutes % 60 == 0 {
            write!(f, "{}", minutes / 60)
        } else {
            let sign = if minutes < 0 { "-" } else { "" };
            let abs = minutes.unsigned_abs();
            write!(f, "{}{}:{:02}", sign, abs / 60, abs % 60)
        }
    }
}

/// Temperature in 0.1°C units
struct Tenths(Option<i16>);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => {
                let sign = if t < 0 { "-" } else { "" };
                let abs = t.unsigned_abs();
                write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
            }
            None => f.write_str("--.-"),
        }
    }
}

/// YYYY/MM/DD
struct Date<'a>(&'a DateTime);

impl fmt::Display for Date<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.0.year, self.0.month, self.0.day)
    }
}

fn counter(value: impl fmt::Display) -> Line {
    line(format_args!("     < {} >    ", value))
}

/// Draw the screen for `state`
///
/// `Off` only clears; powering the panel down is up to the caller.
pub fn render<D: CharDisplay>(
    display: &mut D,
    state: MenuState,
    view: &Snapshot,
) -> Result<(), DisplayError> {
    use MenuState::*;

    let now_time = ClockTime::new(view.now.hour, view.now.minute);

    match state {
        Off => display.clear(),
        DoorStatus => {
            if view.door_open {
                display.show("Door: Open", &line(format_args!("Closes at {}", view.close_time)))
            } else {
                display.show("Door: Closed", &line(format_args!("Opens at {}", view.open_time)))
            }
        }
        TempAndDate => {
            display.show(
                &line(format_args!("   {}", Date(&view.now))),
                &line(format_args!("{}   {} ", now_time, Tenths(view.temperature_x10))),
            )?;
            display.write_byte(DEGREE_GLYPH)?;
            display.write_str("C")
        }
        DoorModify => {
            let action = if view.door_open { "close door." } else { "open door." };
            display.show(HOLD_R_TO, action)
        }
        DoorManualModify => display.show("Hold R/L for ma-", "nual open/close."),
        DoorCalibrate => display.show(HOLD_R_TO, "calibrate door."),
        CalibrationWait => display.show("Close door. Hold", "R to continue."),
        OpenDelayModify => display.show(
            HOLD_R_TO_CHANGE,
            &line(format_args!("open delay ({})", view.config.open_delay_minutes)),
        ),
        CloseDelayModify => display.show(
            HOLD_R_TO_CHANGE,
            &line(format_args!("close delay({})", view.config.close_delay_minutes)),
        ),
        TimezoneModify => display.show(
            HOLD_R_TO_CHANGE,
            &line(format_args!("timezone ({})", Offset(view.config.timezone_offset_minutes))),
        ),
        TimeModify => display.show(HOLD_R_TO_CHANGE, &line(format_args!("time ({})", now_time))),
        DateModify => display.show(
            HOLD_R_TO_CHANGE,
            &line(format_args!("date({})", Date(&view.now))),
        ),
        OpenDelayCounter => display.show(
            &line(format_args!(
                "  <{}>  {}",
                view.config.open_delay_minutes, view.open_time
            )),
            HOLD_R_TO_SAVE,
        ),
        CloseDelayCounter => display.show(
            &line(format_args!(
                "  <{}>  {}",
                view.config.close_delay_minutes, view.close_time
            )),
            HOLD_R_TO_SAVE,
        ),
        TimezoneCounter => display.show(
            &counter(Offset(view.config.timezone_offset_minutes)),
            HOLD_R_TO_SAVE,
        ),
        HoursCounter => display.show(&counter(view.now.hour), HOLD_R_TO_SAVE),
        MinutesCounter => display.show(&counter(view.now.minute), HOLD_R_TO_SAVE),
        YearCounter => display.show(&counter(view.now.year), HOLD_R_TO_SAVE),
        MonthCounter => display.show(&counter(view.now.month), HOLD_R_TO_SAVE),
        DayCounter => display.show(&counter(view.now.day), HOLD_R_TO_SAVE),
    }
}

/// Screen shown while calibration runs
pub fn calibrating<D: CharDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.show("Calibrating", "door...")
}

/// First calibration result screen
pub fn calibration_complete<D: CharDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.show("Calibration", "complete.")
}

/// Second calibration result screen
pub fn calibration_steps<D: CharDisplay>(display: &mut D, steps: u32) -> Result<(), DisplayError> {
    display.show("Steps to open:", &line(format_args!("{}", steps)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDisplay;

    fn snapshot() -> Snapshot {
        Snapshot {
            door_open: true,
            now: DateTime::new(2024, 3, 9, 7, 5),
            open_time: ClockTime::new(6, 30),
            close_time: ClockTime::new(19, 45),
            config: ClockConfig {
                timezone_offset_minutes: 60,
                open_delay_minutes: 15,
                close_delay_minutes: -10,
            },
            temperature_x10: Some(215),
        }
    }

    fn rendered(state: MenuState, view: &Snapshot) -> RecordingDisplay {
        let mut display = RecordingDisplay::new();
        render(&mut display, state, view).unwrap();
        display
    }

    #[test]
    fn test_door_status_shows_next_move() {
        let view = snapshot();
        let d = rendered(MenuState::DoorStatus, &view);
        assert_eq!(d.row(0).as_str(), "Door: Open");
        assert_eq!(d.row(1).as_str(), "Closes at 19:45");

        let closed = Snapshot {
            door_open: false,
            ..view
        };
        let d = rendered(MenuState::DoorStatus, &closed);
        assert_eq!(d.row(0).as_str(), "Door: Closed");
        assert_eq!(d.row(1).as_str(), "Opens at 06:30");
    }

    #[test]
    fn test_temp_and_date() {
        let d = rendered(MenuState::TempAndDate, &snapshot());
        assert_eq!(d.row(0).as_str(), "   2024/03/09");
        assert_eq!(d.row(1).as_str(), "07:05   21.5 °C");
    }

    #[test]
    fn test_negative_and_missing_temperature() {
        let mut view = snapshot();
        view.temperature_x10 = Some(-5);
        let d = rendered(MenuState::TempAndDate, &view);
        assert_eq!(d.row(1).as_str(), "07:05   -0.5 °C");

        view.temperature_x10 = None;
        let d = rendered(MenuState::TempAndDate, &view);
        assert_eq!(d.row(1).as_str(), "07:05   --.- °C");
    }

    #[test]
    fn test_door_modify_offers_opposite_move() {
        let d = rendered(MenuState::DoorModify, &snapshot());
        assert_eq!(d.row(0).as_str(), "Hold R to");
        assert_eq!(d.row(1).as_str(), "close door.");
    }

    #[test]
    fn test_delay_screens() {
        let view = snapshot();
        assert_eq!(
            rendered(MenuState::OpenDelayModify, &view).row(1).as_str(),
            "open delay (15)"
        );
        assert_eq!(
            rendered(MenuState::CloseDelayModify, &view).row(1).as_str(),
            "close delay(-10)"
        );

        let d = rendered(MenuState::OpenDelayCounter, &view);
        assert_eq!(d.row(0).as_str(), "  <15>  06:30");
        assert_eq!(d.row(1).as_str(), " Hold R to save");
    }

    #[test]
    fn test_timezone_in_hours() {
        let mut view = snapshot();
        assert_eq!(
            rendered(MenuState::TimezoneModify, &view).row(1).as_str(),
            "timezone (1)"
        );
        view.config.timezone_offset_minutes = -330;
        assert_eq!(
            rendered(MenuState::TimezoneCounter, &view).row(0).as_str(),
            "     < -5:30 >"
        );
    }

    #[test]
    fn test_time_and_date_counters() {
        let view = snapshot();
        assert_eq!(
            rendered(MenuState::TimeModify, &view).row(1).as_str(),
            "time (07:05)"
        );
        assert_eq!(
            rendered(MenuState::DateModify, &view).row(1).as_str(),
            "date(2024/03/09)"
        );
        assert_eq!(
            rendered(MenuState::YearCounter, &view).row(0).as_str(),
            "     < 2024 >"
        );
        assert_eq!(
            rendered(MenuState::MinutesCounter, &view).row(0).as_str(),
            "     < 5 >"
        );
    }

    #[test]
    fn test_calibration_screens() {
        let mut d = RecordingDisplay::new();
        calibration_steps(&mut d, 1234).unwrap();
        assert_eq!(d.row(0).as_str(), "Steps to open:");
        assert_eq!(d.row(1).as_str(), "1234");
    }
}
