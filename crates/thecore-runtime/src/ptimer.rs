//! Process timer: poll-driven software timer.
//!
//! A dedicated process owns the running-timer list, is woken only by
//! `poll`, and rebuilds a `next_to_expire` hint on every pass so an ISR can
//! decide in O(1) whether a poll is worth raising at all.
//!
//! The "dedicated process" is not a separate concurrency primitive — it is
//! an ordinary [`crate::dispatcher::Dispatcher`] process, registered and
//! started like any other, whose thread function is
//! [`ptimer_process_thread_fn`] in this module. This reuses the dispatcher
//! rather than inventing a second scheduling mechanism, treating these lists
//! and flags as fields of one singleton context. All methods here read "now"
//! from the dispatcher's own [`thecore_core::tick::TickSource`] rather than
//! taking it as a parameter, since the tick counter is global state
//! independent of the dispatcher's process-payload type `T`.

use thecore_core::event::EVENT_ID_POLL;
use thecore_core::protothread::PtState;
use thecore_core::tick::{Duration, Tick};
use thecore_core::timer::Timer;

use crate::dispatcher::{Dispatcher, ProcessId};

/// Index into a `Dispatcher`'s process-timer arena.
pub type PtimerId = u16;

/// Invoked when a process timer expires, with the id of the timer that
/// fired. May call [`Dispatcher::ptimer_start`]/[`Dispatcher::ptimer_restart`]/
/// [`Dispatcher::ptimer_reset`] again to re-arm itself.
pub type PtimerHandler<T, const N: usize, const Q: usize, const M: usize> =
    fn(&mut Dispatcher<T, N, Q, M>, PtimerId);

#[derive(Clone, Copy)]
pub(crate) struct PtimerSlot<T, const N: usize, const Q: usize, const M: usize> {
    timer: Timer,
    handler: PtimerHandler<T, N, Q, M>,
}

fn noop_handler<T: Copy + Default, const N: usize, const Q: usize, const M: usize>(
    _d: &mut Dispatcher<T, N, Q, M>,
    _id: PtimerId,
) {
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> Dispatcher<T, N, Q, M> {
    /// Allocates a process-timer slot, unlinked and not running. The
    /// returned id is a stable handle for `ptimer_start`/`stop`/etc. for the
    /// lifetime of the dispatcher (this arena has no `free` — allocation
    /// here is caller-scoped rather than dynamically reclaimed).
    pub fn ptimer_create(&mut self) -> Option<PtimerId> {
        let i = self.ptimers.iter().position(|s| s.is_none())?;
        self.ptimers[i] = Some(PtimerSlot {
            timer: Timer::new(),
            handler: noop_handler,
        });
        Some(i as PtimerId)
    }

    /// Installs handler, starts the inner timer, links into the running
    /// list if not already linked, updates the `next_to_expire` hint.
    pub fn ptimer_start(&mut self, id: PtimerId, span: Duration, handler: PtimerHandler<T, N, Q, M>) {
        let now = self.now();
        let was_running = self.ptimer_running.contains(id);
        if let Some(slot) = self.ptimers[id as usize].as_mut() {
            slot.handler = handler;
            slot.timer.start(now, span);
        }
        if !was_running {
            self.ptimer_running.push_back(id);
        }
        self.ptimer_update_hint_candidate(id, now);
    }

    /// Restarts the inner timer (resample `start`, keep `span`), ensures
    /// linked.
    pub fn ptimer_restart(&mut self, id: PtimerId) {
        let now = self.now();
        let was_running = self.ptimer_running.contains(id);
        if let Some(slot) = self.ptimers[id as usize].as_mut() {
            slot.timer.restart(now);
        }
        if !was_running {
            self.ptimer_running.push_back(id);
        }
        self.ptimer_update_hint_candidate(id, now);
    }

    /// Like [`Dispatcher::ptimer_restart`] but also updates the span.
    pub fn ptimer_restart_with_new_span(&mut self, id: PtimerId, span: Duration) {
        if let Some(slot) = self.ptimers[id as usize].as_mut() {
            slot.timer.set_span(span);
        }
        self.ptimer_restart(id);
    }

    /// Periodic re-arm, advancing `start` by `span` rather than resampling
    /// `now` (driftless).
    pub fn ptimer_reset(&mut self, id: PtimerId) {
        let now = self.now();
        let was_running = self.ptimer_running.contains(id);
        if let Some(slot) = self.ptimers[id as usize].as_mut() {
            slot.timer.reset();
        }
        if !was_running {
            self.ptimer_running.push_back(id);
        }
        self.ptimer_update_hint_candidate(id, now);
    }

    /// Like [`Dispatcher::ptimer_reset`] but also updates the span.
    pub fn ptimer_reset_with_new_span(&mut self, id: PtimerId, span: Duration) {
        if let Some(slot) = self.ptimers[id as usize].as_mut() {
            slot.timer.set_span(span);
        }
        self.ptimer_reset(id);
    }

    /// Unlinks and clears `running`.
    pub fn ptimer_stop(&mut self, id: PtimerId) {
        if self.ptimer_running.contains(id) {
            self.ptimer_running.erase(id);
        }
        if self.next_to_expire == Some(id) {
            self.next_to_expire = None;
        }
    }

    /// Whether the timer at `id` has expired.
    pub fn ptimer_expired(&self, id: PtimerId) -> bool {
        let now = self.now();
        self.ptimers[id as usize]
            .as_ref()
            .map(|s| s.timer.expired(now))
            .unwrap_or(true)
    }

    /// Ticks remaining until the timer at `id` expires.
    pub fn ptimer_left(&self, id: PtimerId) -> Duration {
        let now = self.now();
        self.ptimers[id as usize]
            .as_ref()
            .map(|s| s.timer.left(now))
            .unwrap_or(0)
    }

    #[inline]
    pub fn ptimer_is_running(&self, id: PtimerId) -> bool {
        self.ptimer_running.contains(id)
    }

    /// Registers and starts the dedicated ptimer process. Must be called
    /// exactly once, after the dispatcher itself exists.
    /// Returns the process id so a caller wiring up bring-up order can
    /// sequence it.
    pub fn ptimer_process_start(&mut self) -> ProcessId {
        let pid = self
            .register("ptimer", ptimer_process_thread_fn)
            .expect("process arena exhausted during bring-up");
        self.ptimer_process = Some(pid);
        self.start(pid, T::default());
        pid
    }

    /// The only non-critical-section interaction with the list, intended
    /// for interrupt-side use. If the hint is set and expired, raises a
    /// poll on the ptimer process; otherwise does nothing. The hint may be
    /// stale — the worst case is a missed poll the next tick catches, which
    /// is an accepted tradeoff of the hint-based design.
    pub fn ptimer_poll_if_necessary(&mut self) {
        let Some(id) = self.next_to_expire else {
            return;
        };
        let now = self.now();
        let expired = self.ptimers[id as usize]
            .as_ref()
            .map(|s| s.timer.expired(now))
            .unwrap_or(false);
        if expired {
            if let Some(pid) = self.ptimer_process {
                self.poll(pid);
            }
        }
    }

    /// One full pass of the ptimer poll loop: clear the hint, walk the
    /// running list with the manual safe-remove pattern
    /// (`next` captured before the handler — which may re-link — runs), and
    /// rebuild the hint from whichever timers are still running.
    fn ptimer_poll_pass(&mut self) {
        let now = self.now();
        self.next_to_expire = None;

        let mut cur = self.ptimer_running.head();
        while let Some(id) = cur {
            cur = self.ptimer_running.next(id);

            let expired = self.ptimers[id as usize]
                .as_ref()
                .map(|s| s.timer.expired(now))
                .unwrap_or(false);

            if expired {
                self.ptimer_running.erase(id);
                let handler = self.ptimers[id as usize].as_ref().unwrap().handler;
                handler(self, id);
            } else {
                self.ptimer_update_hint_candidate(id, now);
            }
        }
    }

    /// Updates `next_to_expire` if `id` expires sooner than the current
    /// hint, or sets it outright if there was none.
    fn ptimer_update_hint_candidate(&mut self, id: PtimerId, now: Tick) {
        let candidate_left = self.ptimers[id as usize]
            .as_ref()
            .map(|s| s.timer.left(now))
            .unwrap_or(Duration::MAX);
        let should_replace = match self.next_to_expire {
            None => true,
            Some(cur) => {
                let cur_left = self.ptimers[cur as usize]
                    .as_ref()
                    .map(|s| s.timer.left(now))
                    .unwrap_or(Duration::MAX);
                candidate_left < cur_left
            }
        };
        if should_replace {
            self.next_to_expire = Some(id);
        }
    }
}

/// The ptimer process body: waits for `poll`, then runs
/// one full pass of the timer list and goes back to waiting. Never
/// terminates — a single suspension point repeated forever, so it is
/// written directly against [`PtState`] rather than through the `thecore`
/// facade's suspension macros (it has no second distinct resume point to
/// track).
fn ptimer_process_thread_fn<T: Copy + Default, const N: usize, const Q: usize, const M: usize>(
    d: &mut Dispatcher<T, N, Q, M>,
    _me: ProcessId,
    ev: &thecore_core::event::Event<ProcessId, T>,
) -> PtState {
    if ev.id == EVENT_ID_POLL {
        d.ptimer_poll_pass();
    }
    PtState::Waiting
}
