//! Event timer and callback timer: ptimer compositions.
//!
//! Both are thin wrappers over the ptimer poll mechanism in `ptimer.rs`
//! that synthesize a dispatcher action on expiry instead of requiring the
//! caller to poll a raw ptimer by hand. An event timer posts an event to a
//! process; a callback timer invokes a plain function. They share the same
//! `PtimerId`-indexed arena layout as the ptimer itself — the slot at index
//! `id` in `event_timers`/`callback_timers` describes what `id`'s ptimer
//! handler should do, so the ptimer handler function just looks the slot up
//! by its own id.

use thecore_core::tick::Duration;

use crate::dispatcher::{Dispatcher, ProcessId};
use crate::ptimer::PtimerId;

#[derive(Clone, Copy)]
pub(crate) struct EventTimerSlot<T> {
    to: ProcessId,
    event_id: thecore_core::event::EventId,
    data: T,
}

/// A callback invoked by a callback timer on expiry: `(dispatcher, context
/// process, data)`.
pub type CallbackTimerCallback<T, const N: usize, const Q: usize, const M: usize> =
    fn(&mut Dispatcher<T, N, Q, M>, ProcessId, T);

#[derive(Clone, Copy)]
pub(crate) struct CallbackTimerSlot<T, const N: usize, const Q: usize, const M: usize> {
    context: ProcessId,
    callback: CallbackTimerCallback<T, N, Q, M>,
    data: T,
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> Dispatcher<T, N, Q, M> {
    /// Allocates (or reuses, if `id` is `Some`) a ptimer slot whose handler
    /// is [`event_timer_ptimer_handler`], and records what to post on
    /// expiry. Returns `None` if the ptimer arena is exhausted.
    pub fn event_timer_start(
        &mut self,
        to: ProcessId,
        event_id: thecore_core::event::EventId,
        data: T,
        span: Duration,
    ) -> Option<PtimerId> {
        let id = self.ptimer_create()?;
        self.event_timers[id as usize] = Some(EventTimerSlot { to, event_id, data });
        self.ptimer_start(id, span, event_timer_ptimer_handler);
        Some(id)
    }

    /// Re-arm an existing event timer driftlessly, same semantics as
    /// [`Dispatcher::ptimer_reset`].
    pub fn event_timer_reset(&mut self, id: PtimerId) {
        self.ptimer_reset(id);
    }

    /// Like [`Dispatcher::event_timer_start`] but invokes a plain function
    /// instead of posting an event.
    pub fn callback_timer_start(
        &mut self,
        context: ProcessId,
        callback: CallbackTimerCallback<T, N, Q, M>,
        data: T,
        span: Duration,
    ) -> Option<PtimerId> {
        let id = self.ptimer_create()?;
        self.callback_timers[id as usize] = Some(CallbackTimerSlot {
            context,
            callback,
            data,
        });
        self.ptimer_start(id, span, callback_timer_ptimer_handler);
        Some(id)
    }

    pub fn callback_timer_reset(&mut self, id: PtimerId) {
        self.ptimer_reset(id);
    }
}

/// Ptimer handler installed by [`Dispatcher::event_timer_start`]: looks up
/// the event-timer slot at `id` and posts synchronously to its target
/// process (`post_sync`, not the queued `post` — an expired timer's event
/// is delivered before the ptimer process's poll pass returns).
fn event_timer_ptimer_handler<T: Copy + Default, const N: usize, const Q: usize, const M: usize>(
    d: &mut Dispatcher<T, N, Q, M>,
    id: PtimerId,
) {
    if let Some(slot) = d.event_timers[id as usize] {
        d.post_sync(slot.to, slot.event_id, slot.data);
    }
}

/// Ptimer handler installed by [`Dispatcher::callback_timer_start`]:
/// invokes the stored callback directly, no event involved.
fn callback_timer_ptimer_handler<T: Copy + Default, const N: usize, const Q: usize, const M: usize>(
    d: &mut Dispatcher<T, N, Q, M>,
    id: PtimerId,
) {
    if let Some(slot) = d.callback_timers[id as usize] {
        (slot.callback)(d, slot.context, slot.data);
    }
}
