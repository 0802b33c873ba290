//! Menu state machine definition
//!
//! Transitions are a pure function of the current state and a button
//! input. Side effects are named by the returned [`Action`] and carried
//! out by the menu controller.

use crate::traits::ButtonInput;

/// Menu states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Display blanked and powered down
    Off,
    /// Door position and next scheduled move
    DoorStatus,
    /// RTC date, time and temperature
    TempAndDate,
    /// Toggle the door by hand
    DoorModify,
    /// Jog the door while a button is held
    DoorManualModify,
    /// Entry point of the calibration flow
    DoorCalibrate,
    /// Door blocked, waiting for the operator to close it
    CalibrationWait,
    OpenDelayModify,
    OpenDelayCounter,
    CloseDelayModify,
    CloseDelayCounter,
    TimezoneModify,
    TimezoneCounter,
    TimeModify,
    HoursCounter,
    MinutesCounter,
    DateModify,
    YearCounter,
    MonthCounter,
    DayCounter,
}

/// A value edited by one of the counter states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    OpenDelay,
    CloseDelay,
    Timezone,
    Hour,
    Minute,
    Year,
    Month,
    Day,
}

/// Side effect attached to a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    None,
    /// Power the display back up
    Wake,
    /// Close an open door, open a closed one
    ToggleDoor,
    /// Raise the door while the right button stays down
    JogOpen,
    /// Lower the door while the left button stays down
    JogClose,
    /// Block the door ahead of calibration
    BeginCalibration,
    /// Run calibration and release the block
    Calibrate,
    /// Release the block without calibrating
    CancelCalibration,
    /// Step a field by one unit up or down
    Adjust(Field, i8),
    /// Persist a field to storage
    Commit(Field),
}

/// Result of applying an input to a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub next: MenuState,
    pub action: Action,
}

impl Transition {
    const fn to(next: MenuState) -> Self {
        Self {
            next,
            action: Action::None,
        }
    }

    const fn with(next: MenuState, action: Action) -> Self {
        Self { next, action }
    }
}

impl MenuState {
    /// Top-level settings pages, in right-press order
    pub const SETTINGS_RING: [MenuState; 8] = [
        MenuState::DoorModify,
        MenuState::DoorManualModify,
        MenuState::DoorCalibrate,
        MenuState::OpenDelayModify,
        MenuState::CloseDelayModify,
        MenuState::TimezoneModify,
        MenuState::TimeModify,
        MenuState::DateModify,
    ];

    /// Check if this is a live-adjust counter state
    pub fn is_counter(self) -> bool {
        self.counter_field().is_some()
    }

    /// Field edited by this counter state
    pub fn counter_field(self) -> Option<Field> {
        use MenuState::*;

        match self {
            OpenDelayCounter => Some(Field::OpenDelay),
            CloseDelayCounter => Some(Field::CloseDelay),
            TimezoneCounter => Some(Field::Timezone),
            HoursCounter => Some(Field::Hour),
            MinutesCounter => Some(Field::Minute),
            YearCounter => Some(Field::Year),
            MonthCounter => Some(Field::Month),
            DayCounter => Some(Field::Day),
            _ => None,
        }
    }

    /// Settings page a counter state belongs to
    pub fn parent(self) -> Option<MenuState> {
        use MenuState::*;

        match self {
            OpenDelayCounter => Some(OpenDelayModify),
            CloseDelayCounter => Some(CloseDelayModify),
            TimezoneCounter => Some(TimezoneModify),
            HoursCounter | MinutesCounter => Some(TimeModify),
            YearCounter | MonthCounter | DayCounter => Some(DateModify),
            CalibrationWait => Some(DoorCalibrate),
            _ => None,
        }
    }

    fn ring_step(self, forward: bool) -> Self {
        let ring = Self::SETTINGS_RING;
        match ring.iter().position(|s| *s == self) {
            Some(i) => {
                let len = ring.len();
                let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
                ring[next]
            }
            None => self,
        }
    }

    /// Process an input and return the next state with its side effect
    pub fn transition(self, input: ButtonInput) -> Transition {
        use ButtonInput::*;
        use MenuState::*;

        match (self, input) {
            // Any press wakes the display
            (Off, _) => Transition::with(DoorStatus, Action::Wake),

            // Status views
            (DoorStatus, LeftShort | RightShort) => Transition::to(TempAndDate),
            (DoorStatus, RightDouble) => Transition::to(OpenDelayModify),
            (DoorStatus, RightLong) => Transition::with(DoorStatus, Action::ToggleDoor),
            (TempAndDate, LeftShort | RightShort) => Transition::to(DoorStatus),
            (DoorStatus | TempAndDate, LeftDouble) => Transition::to(Off),

            // Settings ring navigation
            (
                DoorModify | DoorManualModify | DoorCalibrate | OpenDelayModify
                | CloseDelayModify | TimezoneModify | TimeModify | DateModify,
                RightShort,
            ) => Transition::to(self.ring_step(true)),
            (
                DoorModify | DoorManualModify | DoorCalibrate | OpenDelayModify
                | CloseDelayModify | TimezoneModify | TimeModify | DateModify,
                LeftShort,
            ) => Transition::to(self.ring_step(false)),
            (
                DoorModify | DoorManualModify | DoorCalibrate | OpenDelayModify
                | CloseDelayModify | TimezoneModify | TimeModify | DateModify,
                LeftDouble,
            ) => Transition::to(DoorStatus),

            // Door pages
            (DoorModify, RightLong) => Transition::with(DoorModify, Action::ToggleDoor),
            (DoorManualModify, RightLong) => Transition::with(DoorManualModify, Action::JogOpen),
            (DoorManualModify, LeftLong) => Transition::with(DoorManualModify, Action::JogClose),
            (DoorCalibrate, RightLong) => {
                Transition::with(CalibrationWait, Action::BeginCalibration)
            }
            (CalibrationWait, RightLong) => Transition::with(DoorStatus, Action::Calibrate),
            (CalibrationWait, LeftLong) => Transition::with(CalibrationWait, Action::JogClose),
            (CalibrationWait, LeftDouble) => {
                Transition::with(DoorCalibrate, Action::CancelCalibration)
            }

            // Enter counters
            (OpenDelayModify, RightLong) => Transition::to(OpenDelayCounter),
            (CloseDelayModify, RightLong) => Transition::to(CloseDelayCounter),
            (TimezoneModify, RightLong) => Transition::to(TimezoneCounter),
            (TimeModify, RightLong) => Transition::to(HoursCounter),
            (DateModify, RightLong) => Transition::to(YearCounter),

            // Counter adjustment
            (
                OpenDelayCounter | CloseDelayCounter | TimezoneCounter | HoursCounter
                | MinutesCounter | YearCounter | MonthCounter | DayCounter,
                RightShort | LeftShort,
            ) => {
                let delta = if input == RightShort { 1 } else { -1 };
                match self.counter_field() {
                    Some(field) => Transition::with(self, Action::Adjust(field, delta)),
                    None => Transition::to(self),
                }
            }

            // Counter exit without saving returns to the owning page
            (
                OpenDelayCounter | CloseDelayCounter | TimezoneCounter | HoursCounter
                | MinutesCounter | YearCounter | MonthCounter | DayCounter,
                LeftDouble,
            ) => Transition::to(self.parent().unwrap_or(DoorStatus)),

            // Counter confirm: persisted offsets save, time and date step
            // through their fields (already written to the RTC)
            (OpenDelayCounter, RightLong) => {
                Transition::with(OpenDelayModify, Action::Commit(Field::OpenDelay))
            }
            (CloseDelayCounter, RightLong) => {
                Transition::with(CloseDelayModify, Action::Commit(Field::CloseDelay))
            }
            (TimezoneCounter, RightLong) => {
                Transition::with(TimezoneModify, Action::Commit(Field::Timezone))
            }
            (HoursCounter, RightLong) => Transition::to(MinutesCounter),
            (MinutesCounter, RightLong) => Transition::to(TimeModify),
            (YearCounter, RightLong) => Transition::to(MonthCounter),
            (MonthCounter, RightLong) => Transition::to(DayCounter),
            (DayCounter, RightLong) => Transition::to(DateModify),

            // Default: stay in current state
            _ => Transition::to(self),
        }
    }
}
