//! Stepper driver implementations

pub mod uln2003;

pub use uln2003::{StepMode, Uln2003, Uln2003Config};
