//! Listener registry with poll/dispatch split

use heapless::Vec;

use super::queue::{EventQueue, EVENT_QUEUE_SIZE};
use super::EventId;

/// Default listener registry capacity
pub const MAX_LISTENERS: usize = 16;

/// Errors from the event handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerError {
    /// Listener registry is at capacity; the listener was not added
    RegistryFull,
    /// A queued id has no listener (internal consistency failure)
    UnknownEvent(EventId),
}

/// A (condition, callback) pair
///
/// Both functions receive the shared context explicitly, so listeners
/// can reach the door and clock without any global state.
/// Non-capturing closures coerce to these function pointers.
pub struct Listener<C> {
    id: EventId,
    condition: fn(&mut C) -> bool,
    callback: fn(&mut C),
}

/// Event handler owning the listener registry and the pending queue
///
/// The registry is append-only, so a listener's id is also its index.
pub struct EventHandler<C, const L: usize = MAX_LISTENERS, const Q: usize = EVENT_QUEUE_SIZE> {
    listeners: Vec<Listener<C>, L>,
    queue: EventQueue<Q>,
}

impl<C, const L: usize, const Q: usize> Default for EventHandler<C, L, Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, const L: usize, const Q: usize> EventHandler<C, L, Q> {
    /// Create a handler with no listeners
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
            queue: EventQueue::new(),
        }
    }

    /// Register a listener and return its id
    ///
    /// Fails with [`HandlerError::RegistryFull`] once `L` listeners exist.
    pub fn add_listener(
        &mut self,
        condition: fn(&mut C) -> bool,
        callback: fn(&mut C),
    ) -> Result<EventId, HandlerError> {
        let id = self.listeners.len() as EventId;
        self.listeners
            .push(Listener {
                id,
                condition,
                callback,
            })
            .map_err(|_| {
                warn!("Listener registry full ({} entries)", L);
                HandlerError::RegistryFull
            })?;

        debug!("Registered listener {}", id);
        Ok(id)
    }

    /// Evaluate every condition once and queue the ids that fired
    ///
    /// Conditions run in registration order. A condition that stays true
    /// queues one event per poll. Returns how many events were dropped
    /// because the queue was full.
    pub fn poll(&mut self, ctx: &mut C) -> usize {
        let mut dropped = 0;

        for listener in self.listeners.iter() {
            if (listener.condition)(ctx) {
                trace!("Listener {} fired", listener.id);
                if self.queue.enqueue(listener.id).is_err() {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!("Event queue full, dropped {} event(s)", dropped);
        }
        dropped
    }

    /// Queue an event directly, bypassing its condition
    pub fn enqueue_event(&mut self, id: EventId) -> Result<(), EventId> {
        self.queue.enqueue(id)
    }

    /// Pop one event and run its callback
    ///
    /// Returns `Ok(None)` when nothing is pending, or the id that was
    /// handled.
    pub fn dispatch_one(&mut self, ctx: &mut C) -> Result<Option<EventId>, HandlerError> {
        let Some(id) = self.queue.dequeue() else {
            return Ok(None);
        };

        let listener = self
            .listeners
            .get(id as usize)
            .filter(|l| l.id == id)
            .ok_or(HandlerError::UnknownEvent(id))?;

        trace!("Dispatching event {}", id);
        (listener.callback)(ctx);
        Ok(Some(id))
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
