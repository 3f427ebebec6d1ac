//! Event records exchanged between processes.
//!
//! An event is `{ id, data, to, from? }`. `to`/`from` are process identities;
//! this crate has no notion of "process" (that lives in `thecore-runtime`), so
//! they are expressed here as a generic `Id` the runtime instantiates with its
//! own process-index type. `to = None` means broadcast.

/// Width of the event id integer (default 8-bit).
pub type EventId = u8;

/// Event id reserved for the synchronous delivery a process receives the
/// instant it is started.
pub const EVENT_ID_START: EventId = 0;
/// Event id synthesized by the dispatcher for a process with a pending poll
/// request.
pub const EVENT_ID_POLL: EventId = 1;
/// Event id used by `suspend!`/`PROCESS_SLEEP` to wake a process that posted
/// to itself.
pub const EVENT_ID_CONTINUE: EventId = 2;
/// Event id reserved for timeout notifications.
pub const EVENT_ID_TIMEOUT: EventId = 3;

/// First id an application is free to assign to its own events.
pub const EVENT_ID_APPLICATION_BASE: EventId = 4;

/// An event record, generic over the process identity type `Id` and the
/// payload type `T`.
///
/// `T` must be `Copy`: events pass through a fixed-capacity ring buffer
/// whose element type must be trivially copyable.
#[derive(Debug, Clone, Copy)]
pub struct Event<Id, T> {
    pub id: EventId,
    pub data: T,
    pub to: Option<Id>,
    pub from: Option<Id>,
}

impl<Id: Default, T: Default> Default for Event<Id, T> {
    /// The all-zero event: `id = start`, default payload, undelivered
    /// (`to = from = None`). Exists only so `Event` can sit in a
    /// [`crate::ringbuf::RingBuffer`], whose backing array needs a fill
    /// value — a real `Event` is always constructed through
    /// [`Event::new`].
    fn default() -> Self {
        Event {
            id: EVENT_ID_START,
            data: T::default(),
            to: None,
            from: None,
        }
    }
}

impl<Id, T> Event<Id, T> {
    pub fn new(id: EventId, data: T, to: Option<Id>, from: Option<Id>) -> Self {
        Event { id, data, to, from }
    }

    /// `true` if this event should be delivered to every running process.
    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids_distinct() {
        let ids = [
            EVENT_ID_START,
            EVENT_ID_POLL,
            EVENT_ID_CONTINUE,
            EVENT_ID_TIMEOUT,
        ];
        for (i, a) in ids.iter().enumerate() {
            for (j, b) in ids.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
        assert!(EVENT_ID_APPLICATION_BASE > *ids.iter().max().unwrap());
    }

    #[test]
    fn test_is_broadcast() {
        let e: Event<u8, u32> = Event::new(EVENT_ID_START, 0, None, None);
        assert!(e.is_broadcast());
        let e2: Event<u8, u32> = Event::new(EVENT_ID_START, 0, Some(3), None);
        assert!(!e2.is_broadcast());
    }
}
