//! Bounded FIFO of pending event ids
//!
//! The queue is an intrusive doubly-linked list threaded through a
//! fixed slot array. Enqueue finds the first free slot with a linear
//! scan, which is fine at the small capacities used here; a free-index
//! stack would make it O(1) if the capacity ever grows.

use super::EventId;

/// Default queue capacity
pub const EVENT_QUEUE_SIZE: usize = 16;

/// One slot of the backing array
///
/// `prev` points towards the front, `next` towards the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    value: Option<EventId>,
    prev: Option<u8>,
    next: Option<u8>,
}

impl Slot {
    const EMPTY: Self = Self {
        value: None,
        prev: None,
        next: None,
    };
}

/// Fixed-capacity FIFO event queue
///
/// Slot links are stored as `u8`, so `N` must not exceed 255; a larger
/// capacity fails to build.
#[derive(Debug, Clone)]
pub struct EventQueue<const N: usize> {
    slots: [Slot; N],
    len: usize,
    front: Option<u8>,
    back: Option<u8>,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    const LINKS_FIT: () = assert!(N <= u8::MAX as usize, "queue capacity must fit u8 links");

    /// Create an empty queue
    pub const fn new() -> Self {
        let () = Self::LINKS_FIT;
        Self {
            slots: [Slot::EMPTY; N],
            len: 0,
            front: None,
            back: None,
        }
    }

    /// Append an event at the back
    ///
    /// When the queue is full the event is dropped and handed back in
    /// `Err`; nothing else changes.
    pub fn enqueue(&mut self, id: EventId) -> Result<(), EventId> {
        if self.len == N {
            return Err(id);
        }

        // A free slot must exist because len < N
        let free = match self.slots.iter().position(|s| s.value.is_none()) {
            Some(i) => i as u8,
            None => return Err(id),
        };

        self.slots[free as usize] = Slot {
            value: Some(id),
            prev: self.back,
            next: None,
        };

        match self.back {
            Some(back) => self.slots[back as usize].next = Some(free),
            None => self.front = Some(free),
        }
        self.back = Some(free);
        self.len += 1;

        Ok(())
    }

    /// Remove and return the event at the front
    ///
    /// Returns `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<EventId> {
        let front = self.front?;
        let slot = core::mem::replace(&mut self.slots[front as usize], Slot::EMPTY);
        debug_assert!(slot.prev.is_none(), "front slot must not have a predecessor");

        match slot.next {
            Some(next) => {
                self.slots[next as usize].prev = None;
                self.front = Some(next);
            }
            None => {
                // Last element
                self.front = None;
                self.back = None;
            }
        }
        self.len -= 1;

        slot.value
    }

    /// Peek at the front event without removing it
    pub fn peek(&self) -> Option<EventId> {
        self.front.and_then(|f| self.slots[f as usize].value)
    }

    /// Check if the queue has no pending events
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if another enqueue would be dropped
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of pending events
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.slots = [Slot::EMPTY; N];
        self.len = 0;
        self.front = None;
        self.back = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q: EventQueue<4> = EventQueue::new();
        q.enqueue(3).unwrap();
        q.enqueue(1).unwrap();
        q.enqueue(2).unwrap();

        assert_eq!(q.len(), 3);
        assert_eq!(q.dequeue(), Some(3));
        assert_eq!(q.dequeue(), Some(1));
        assert_eq!(q.dequeue(), Some(2));
        assert!(q.is_empty());
    }

    #[test]
    fn test_dequeue_empty() {
        let mut q: EventQueue<4> = EventQueue::new();
        assert_eq!(q.dequeue(), None);
        assert_eq!(q.len(), 0);
        assert_eq!(q.peek(), None);

        // Still usable afterwards
        q.enqueue(7).unwrap();
        assert_eq!(q.dequeue(), Some(7));
    }

    #[test]
    fn test_enqueue_when_full_is_dropped() {
        let mut q: EventQueue<2> = EventQueue::new();
        q.enqueue(0).unwrap();
        q.enqueue(1).unwrap();
        assert!(q.is_full());

        assert_eq!(q.enqueue(2), Err(2));
        assert_eq!(q.len(), 2);

        assert_eq!(q.dequeue(), Some(0));
        assert_eq!(q.dequeue(), Some(1));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn test_slot_reuse_keeps_order() {
        // Freed slots at the start of the array get reused while the
        // chain order still follows insertion order.
        let mut q: EventQueue<3> = EventQueue::new();
        q.enqueue(10).unwrap();
        q.enqueue(11).unwrap();
        q.enqueue(12).unwrap();

        assert_eq!(q.dequeue(), Some(10));
        q.enqueue(13).unwrap(); // lands in slot 0
        assert_eq!(q.dequeue(), Some(11));
        q.enqueue(14).unwrap(); // lands in slot 1

        assert_eq!(q.peek(), Some(12));
        assert_eq!(q.dequeue(), Some(12));
        assert_eq!(q.dequeue(), Some(13));
        assert_eq!(q.dequeue(), Some(14));
        assert!(q.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut q: EventQueue<4> = EventQueue::new();
        q.enqueue(1).unwrap();
        q.enqueue(2).unwrap();
        q.clear();

        assert!(q.is_empty());
        assert_eq!(q.dequeue(), None);
        q.enqueue(5).unwrap();
        assert_eq!(q.dequeue(), Some(5));
    }

    #[test]
    fn test_largest_capacity_keeps_order() {
        let mut q: EventQueue<255> = EventQueue::new();
        for i in 0..255 {
            q.enqueue(i as EventId).unwrap();
        }
        assert!(q.is_full());
        assert_eq!(q.enqueue(0), Err(0));

        // Free the low slots and refill so the tail links cross slot 254
        for i in 0..10 {
            assert_eq!(q.dequeue(), Some(i as EventId));
        }
        for i in 0..10 {
            q.enqueue(i as EventId).unwrap();
        }
        for i in 10..255 {
            assert_eq!(q.dequeue(), Some(i as EventId));
        }
        for i in 0..10 {
            assert_eq!(q.dequeue(), Some(i as EventId));
        }
        assert!(q.is_empty());
    }
}
