//! Event queue and listener registry
//!
//! Detecting a condition and reacting to it happen in separate steps:
//! [`EventHandler::poll`] evaluates every listener condition and queues
//! the ids that fired, [`EventHandler::dispatch_one`] later runs one
//! callback. Slow reactions (driving the door motor) therefore never
//! run inside the polling pass.

pub mod handler;
pub mod queue;

pub use handler::{EventHandler, HandlerError, Listener, MAX_LISTENERS};
pub use queue::{EventQueue, EVENT_QUEUE_SIZE};

/// Identifies one registered listener and its pending occurrences
pub type EventId = u8;
