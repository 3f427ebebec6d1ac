//! Real-time timer: single-instance, hardware-timer-backed timer.
//!
//! Unlike the ptimer hierarchy, a real-time timer is not poll-driven — it
//! is backed by one hardware comparator/alarm and its expiry runs directly
//! on the interrupt stack, so only one can be outstanding at a time. A
//! simple lock (not a blocking mutex — this runs on the interrupt path, so
//! it is a single `AtomicBool` compare-and-swap, ISR-safe by construction)
//! arbitrates `set`/`scheduler` racing against each other on a single-core
//! target.
//!
//! The hardware side is abstracted behind [`RtimerArch`]; this module
//! supplies the portable scheduling logic and leaves
//! `now()`/`timer_set()`/`module_init()` to whatever board support package
//! the embedder links in.

use std::sync::atomic::{AtomicBool, Ordering};

use thecore_core::tick::{Duration, Tick};

use crate::dispatcher::{Dispatcher, ProcessId};

/// Hardware real-time timer driver. An embedder targeting real hardware
/// implements this over its own timer/counter
/// peripheral; a hosted build (this crate's demo binaries) can back it with
/// [`thecore_core::tick::TickSource`] and a no-op `timer_set` since nothing
/// here actually fires an interrupt off of it.
pub trait RtimerArch {
    /// Current hardware time, same units as [`Tick`].
    fn now(&self) -> Tick;
    /// Arm the comparator to fire at `deadline`. A real driver programs a
    /// hardware register here; the call must be safe to make from the
    /// scheduler's own interrupt context (re-arming for the next timer).
    fn timer_set(&mut self, deadline: Tick);
    /// One-time hardware init, called during bring-up.
    fn module_init(&mut self) {}
}

/// The callback invoked when a real-time timer expires, with the
/// dispatcher, the process that is meant to care (if any), and the payload
/// passed to [`Dispatcher::rtimer_set`].
pub type RtimerCallback<T, const N: usize, const Q: usize, const M: usize> =
    fn(&mut Dispatcher<T, N, Q, M>, ProcessId, T);

struct Armed<T, const N: usize, const Q: usize, const M: usize> {
    deadline: Tick,
    context: ProcessId,
    callback: RtimerCallback<T, N, Q, M>,
    data: T,
}

/// The single real-time timer instance. Only one real-time timer may be
/// outstanding at a time.
pub struct RealtimeTimer<T, const N: usize, const Q: usize, const M: usize> {
    locked: AtomicBool,
    armed: Option<Armed<T, N, Q, M>>,
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> RealtimeTimer<T, N, Q, M> {
    pub fn new() -> Self {
        RealtimeTimer {
            locked: AtomicBool::new(false),
            armed: None,
        }
    }

    /// Acquire the lock. `false` if already held — callers must not block,
    /// they retry or fail.
    fn lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> Default
    for RealtimeTimer<T, N, Q, M>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> Dispatcher<T, N, Q, M> {
    /// Arms the single real-time timer for `now + span`, programming the
    /// hardware deadline through `arch`. Returns `false` if the timer was
    /// already armed and locked against re-arming. The lock stays held for
    /// as long as the timer is armed — it is only released by
    /// [`Dispatcher::rtimer_scheduler`], whose release clears both the lock
    /// and the armed slot together. Releasing it here too would let a
    /// second `rtimer_set` succeed while the first timer is still
    /// outstanding, defeating the single-instance discipline this module
    /// exists to enforce.
    pub fn rtimer_set(
        &mut self,
        context: ProcessId,
        callback: RtimerCallback<T, N, Q, M>,
        data: T,
        now: Tick,
        span: Duration,
        arch: &mut dyn RtimerArch,
    ) -> bool {
        if !self.rtimer.lock() {
            return false;
        }
        let deadline = now.wrapping_add(span);
        self.rtimer.armed = Some(Armed {
            deadline,
            context,
            callback,
            data,
        });
        arch.timer_set(deadline);
        true
    }

    /// Time remaining before the armed deadline, or `None` if nothing is
    /// armed.
    pub fn rtimer_left(&self, now: Tick) -> Option<Duration> {
        self.rtimer.armed.as_ref().map(|a| a.deadline.wrapping_sub(now))
    }

    /// Attempt to acquire the real-time timer's lock without arming
    /// anything, for `PROCESS_RTIMER_OBTAIN`, which suspends cooperatively
    /// in a loop until this succeeds. A caller that wins the lock this way
    /// is responsible for releasing it
    /// again via [`Dispatcher::rtimer_set`] (which re-locks and re-unlocks
    /// around arming) or by unlocking directly if it decides not to arm
    /// after all — this method itself only reports acquisition.
    pub fn rtimer_try_lock(&mut self) -> bool {
        if self.rtimer.lock() {
            self.rtimer.unlock();
            true
        } else {
            false
        }
    }

    /// The hardware ISR calls this when the comparator fires. The lock is
    /// already held for the entire armed lifetime by whoever called
    /// [`Dispatcher::rtimer_set`], so this does not try to acquire it —
    /// it clears the armed slot, releases the lock, then runs the
    /// callback — the callback runs unlocked so it is free to call
    /// [`Dispatcher::rtimer_set`] again to re-arm itself.
    pub fn rtimer_scheduler(&mut self) {
        let armed = self.rtimer.armed.take();
        self.rtimer.unlock();

        if let Some(a) = armed {
            (a.callback)(self, a.context, a.data);
        }
    }
}
