//! Control loop
//!
//! Ties the event handler, the door, the clock and the menu together.
//! The firmware calls [`Controller::tick`] on a fixed period and
//! [`Controller::handle_input`] for each finished button gesture; both
//! run to completion, motor moves included.

use coopdoor_hal::KeyValueStore;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::config::MenuConfig;
use crate::door::{Door, DoorError, Motion, Travel};
use crate::event::{EventHandler, EventId, HandlerError};
use crate::menu::{render, Menu, MenuState};
use crate::sun::{Clock, SunTable};
use crate::traits::{Actuator, Button, ButtonInput, ButtonPad, CharDisplay, CharDisplayExt, TimeSource};

/// Board-specific collaborator types
pub trait Platform {
    type Actuator: Actuator;
    type LimitSwitch: InputPin;
    type Time: TimeSource;
    type Sun: SunTable;
    type Store: KeyValueStore;
    type Display: CharDisplay;
    type Buttons: ButtonPad;
    type Delay: DelayNs;
}

/// Everything the listeners and the menu act on
pub struct Devices<P: Platform> {
    pub door: Door<P::Actuator, P::LimitSwitch>,
    pub clock: Clock<P::Time, P::Sun>,
    pub store: P::Store,
    pub display: P::Display,
    pub buttons: P::Buttons,
    pub delay: P::Delay,
}

impl<P: Platform> Devices<P> {
    /// Open the door with a busy message on the display
    pub fn open_door(&mut self, override_open: bool) -> Result<Motion, DoorError> {
        self.door.check_open(override_open)?;
        self.busy(render::OPENING_MSG);
        self.door.open(override_open, &mut self.store)
    }

    /// Close the door with a busy message on the display
    pub fn close_door(&mut self) -> Result<Motion, DoorError> {
        self.door.check_close()?;
        self.busy(render::CLOSING_MSG);
        self.door.close(&mut self.store)
    }

    /// Calibrate, show the result screens, then lift the block
    pub fn calibrate_door(&mut self, result_screen_ms: u32) {
        if let Err(e) = render::calibrating(&mut self.display) {
            warn!("Display update failed: {}", e);
        }
        let motion = self.door.calibrate(&mut self.store);

        if let Err(e) = render::calibration_complete(&mut self.display) {
            warn!("Display update failed: {}", e);
        }
        self.delay.delay_ms(result_screen_ms);
        if let Err(e) = render::calibration_steps(&mut self.display, motion.steps) {
            warn!("Display update failed: {}", e);
        }
        self.delay.delay_ms(result_screen_ms);

        self.door.unblock();
    }

    /// Move the door while `button` stays held
    pub fn jog(&mut self, travel: Travel, button: Button) -> Motion {
        let buttons = &mut self.buttons;
        self.door.jog(travel, || buttons.is_pressed(button))
    }

    fn busy(&mut self, message: &str) {
        if let Err(e) = self.display.show(message, "") {
            warn!("Display update failed: {}", e);
        }
    }
}

/// Sunrise/sunset automation plus the menu
pub struct Controller<P: Platform> {
    devices: Devices<P>,
    events: EventHandler<Devices<P>>,
    menu: Menu,
    sunrise_event: EventId,
    sunset_event: EventId,
}

impl<P: Platform> Controller<P> {
    /// Register the sunrise and sunset listeners
    pub fn new(devices: Devices<P>, menu_config: MenuConfig) -> Result<Self, HandlerError> {
        let mut events: EventHandler<Devices<P>> = EventHandler::new();

        let sunrise_event = events.add_listener(
            |d: &mut Devices<P>| d.clock.sunrise_edge(),
            |d: &mut Devices<P>| {
                if let Err(e) = d.open_door(false) {
                    info!("Sunrise open skipped: {}", e);
                }
            },
        )?;
        let sunset_event = events.add_listener(
            |d: &mut Devices<P>| d.clock.sunset_edge(),
            |d: &mut Devices<P>| {
                if let Err(e) = d.close_door() {
                    info!("Sunset close skipped: {}", e);
                }
            },
        )?;

        info!("Controller ready");
        Ok(Self {
            devices,
            events,
            menu: Menu::new(menu_config),
            sunrise_event,
            sunset_event,
        })
    }

    /// Run one control-loop iteration
    ///
    /// Polls every listener once, handles at most one queued event, then
    /// checks the menu timeout.
    ///
    /// # Panics
    ///
    /// Panics if a queued event has no listener, which means the registry
    /// and queue disagree.
    pub fn tick(&mut self, now_ms: u64) {
        self.events.poll(&mut self.devices);

        match self.events.dispatch_one(&mut self.devices) {
            Ok(Some(id)) => {
                debug!("Handled event {}", id);
                // Replace any busy message with the current screen
                if self.menu.state() != MenuState::Off {
                    self.menu.refresh(&mut self.devices);
                }
            }
            Ok(None) => {}
            Err(e) => panic!("event dispatch failed: {:?}", e),
        }

        self.menu.tick(&mut self.devices, now_ms);
    }

    /// Forward a button gesture to the menu
    pub fn handle_input(&mut self, input: ButtonInput, now_ms: u64) {
        self.menu.handle_input(input, &mut self.devices, now_ms);
    }

    pub fn devices(&self) -> &Devices<P> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<P> {
        &mut self.devices
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Queued events not yet dispatched
    pub fn pending_events(&self) -> usize {
        self.events.pending()
    }

    pub fn sunrise_event(&self) -> EventId {
        self.sunrise_event
    }

    pub fn sunset_event(&self) -> EventId {
        self.sunset_event
    }
}
