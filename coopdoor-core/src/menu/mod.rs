//! Two-button menu on the character display
//!
//! ```text
//!            any press
//!   Off ─────────────────► DoorStatus ◄──short──► TempAndDate
//!    ▲                        │  dbl-R
//!    │ timeout / dbl-L        ▼
//!    └──────────────  settings ring (short R/L) ──long R──► counter
//!                             ▲                               │
//!                             └──────── long R / dbl-L ───────┘
//! ```

pub mod controller;
pub mod render;
pub mod state;

pub use crate::traits::ButtonInput;
pub use controller::Menu;
pub use render::Snapshot;
pub use state::{Action, Field, MenuState, Transition};
