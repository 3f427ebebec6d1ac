//! Protothread and process suspension macros.
//!
//! The classic Duff's-device local continuation (`LC_SET`/`LC_SET_YIELD`/
//! `PT_WAIT_UNTIL`/`PT_YIELD_UNTIL`/`PT_SPAWN`/...) resumes by
//! `switch (lc) { case __LINE__: ... }`, which jumps directly into the body
//! and skips every statement physically before the resume label. Safe Rust
//! has no computed jump, so each macro here instead compares its own
//! `line!()` against the stored [`Lc`] and decides what to do from that
//! comparison alone (see `thecore_core::protothread` module docs for the
//! exact three-way rule). This reproduces the classic suspend/resume/skip
//! behavior for every *macro* call, but cannot reproduce skipping plain,
//! non-macro code that sits between two suspension points in the same
//! function body — see the "Known limitation" section below.
//!
//! ## Known limitation: intervening plain code re-executes on resume
//!
//! `switch (lc) { case N: ... }` jumps past any C statement written
//! between the top of the function and label `N`, including plain
//! assignments with no protothread macro around them at all. A
//! comparison-guarded macro can only protect *itself* this way — it
//! cannot make the Rust compiler skip arbitrary code the macros don't
//! wrap. A thread function that writes ordinary (non-macro) statements
//! between two suspension points will re-run those statements on every
//! resumption that passes through them, where the classic form would have
//! skipped straight to the resume label. This is a structural consequence
//! of giving up computed jumps for safe Rust, parallel to the documented
//! contract that local variables are not preserved across suspensions:
//! thread function bodies must keep any state that must survive a
//! suspension, or must not be re-run, in the process's own data record
//! (via `Dispatcher::data_mut`), not in a bare local.
//!
//! ## Usage
//!
//! ```ignore
//! use thecore::*;
//!
//! // One suspension point in straight-line code, not wrapped in a native
//! // Rust loop — see the "Known limitation" section below. The dispatcher's
//! // own per-event re-invocation supplies the repetition.
//! fn ping_thread_fn(d: &mut Dispatcher<(), 4, 4, 4>, me: ProcessId, ev: &Event<ProcessId, ()>) -> PtState {
//!     pt_begin!(d.pt_mut(me));
//!     wait_event!(d.pt_mut(me), ev, EVENT_ID_APPLICATION_BASE);
//!     kprintln!("ping");
//!     PtState::Waiting
//! }
//! ```

/// If the protothread already terminated, make every further call a no-op
/// that keeps returning `Terminated`. Must be the first statement of the
/// thread function body.
#[macro_export]
macro_rules! pt_begin {
    ($pt:expr) => {{
        if $pt.state() == $crate::PtState::Terminated {
            return $crate::PtState::Terminated;
        }
    }};
}

/// Sets `lc` to the sentinel and returns `Terminated`. Must be the last
/// statement of the thread function body.
#[macro_export]
macro_rules! pt_end {
    ($pt:expr) => {{
        $pt.exit();
        return $crate::PtState::Terminated;
    }};
}

/// Marks this point; if `cond` is false, suspend and return `Waiting`;
/// first evaluation happens on entry, so if `cond` is already true no
/// suspension occurs at all.
#[macro_export]
macro_rules! wait_until {
    ($pt:expr, $cond:expr) => {{
        const __LC: $crate::Lc = line!() as $crate::Lc;
        let __pt_lc = $pt.lc();
        if __pt_lc <= __LC {
            if !($cond) {
                $pt.set_lc(__LC);
                return $crate::PtState::Waiting;
            }
        }
    }};
}

/// `= wait_until(!cond)`.
#[macro_export]
macro_rules! wait_while {
    ($pt:expr, $cond:expr) => {
        $crate::wait_until!($pt, !($cond))
    };
}

/// Stores this label and returns `Waiting` exactly once unconditionally;
/// the next invocation resumes past this point without suspending here
/// again.
#[macro_export]
macro_rules! pt_yield {
    ($pt:expr) => {{
        const __LC: $crate::Lc = line!() as $crate::Lc;
        if $pt.lc() < __LC {
            $pt.set_lc(__LC);
            return $crate::PtState::Waiting;
        }
    }};
}

/// Like [`pt_yield!`], exactly one unconditional suspension occurs on
/// first arrival regardless of `cond`; every subsequent invocation
/// re-checks `cond` and only falls through once it is true.
#[macro_export]
macro_rules! yield_until {
    ($pt:expr, $cond:expr) => {{
        const __LC: $crate::Lc = line!() as $crate::Lc;
        let __pt_lc = $pt.lc();
        if __pt_lc < __LC {
            $pt.set_lc(__LC);
            return $crate::PtState::Waiting;
        } else if __pt_lc == __LC && !($cond) {
            return $crate::PtState::Waiting;
        }
    }};
}

/// Evaluates `schedule(child)` on every invocation that reaches this point
/// and suspends while it is not `Terminated`. `$child_call` is the child's
/// thread-function call expression, e.g. `child_thread_fn(d, child_pid,
/// ev)`.
#[macro_export]
macro_rules! wait_thread {
    ($pt:expr, $child_call:expr) => {
        $crate::wait_until!($pt, $child_call == $crate::PtState::Terminated)
    };
}

/// `init(child)` the first time this point is reached, then
/// [`wait_thread!`]. `$child_pt` is the
/// child's own [`thecore_core::protothread::ProtoThread`] (or whatever
/// owns it, exposing `.init()`).
#[macro_export]
macro_rules! spawn_pt {
    ($pt:expr, $child_pt:expr, $child_call:expr) => {{
        const __LC: $crate::Lc = line!() as $crate::Lc;
        if $pt.lc() < __LC {
            $child_pt.init();
        }
        $crate::wait_thread!($pt, $child_call)
    }};
}

/// Terminates unconditionally right here, regardless of position in the
/// function body (unlike [`pt_end!`], which must be the final statement).
#[macro_export]
macro_rules! exit_pt {
    ($pt:expr) => {{
        $pt.exit();
        return $crate::PtState::Terminated;
    }};
}

/// Resets `lc` to `0` and returns `Initialized` — the only way a
/// terminated or running protothread gets back to its start.
#[macro_export]
macro_rules! restart_pt {
    ($pt:expr) => {{
        $pt.restart();
        return $crate::PtState::Initialized;
    }};
}

/// Yields until the current event's id equals `id_wanted`. Implemented as
/// [`yield_until!`] rather than [`wait_until!`]: an already-matching event
/// on first entry still costs exactly one suspension, which
/// `process_sleep!`'s "any intervening event with a different id does not
/// wake the sleep" contract depends on.
#[macro_export]
macro_rules! wait_event {
    ($pt:expr, $ev:expr, $id_wanted:expr) => {
        $crate::yield_until!($pt, $ev.id == $id_wanted)
    };
}

/// Yields until `cond` is true, evaluated against the current event. Same
/// `yield_until!` semantics as [`wait_event!`], generalized to an
/// arbitrary predicate over the event.
#[macro_export]
macro_rules! wait_event_until {
    ($pt:expr, $cond:expr) => {
        $crate::yield_until!($pt, $cond)
    };
}

/// Yields unconditionally once, resuming on whatever event arrives next
/// regardless of its id.
#[macro_export]
macro_rules! wait_any_event {
    ($pt:expr) => {
        $crate::pt_yield!($pt)
    };
}

/// Posts `continue` to self, then `wait_event(continue)` — equivalent to
/// voluntarily going to the back of the event queue. `$d`/`$me` are the
/// dispatcher and this process's own id.
#[macro_export]
macro_rules! suspend {
    ($pt:expr, $d:expr, $me:expr, $ev:expr) => {{
        $d.post(Some($me), $crate::EVENT_ID_CONTINUE, ::std::default::Default::default());
        $crate::wait_event!($pt, $ev, $crate::EVENT_ID_CONTINUE)
    }};
}

/// Starts an event timer targeting self with `id = continue`, then waits
/// for that `continue` event. Any
/// intervening event with a different id does not wake the sleep, since
/// `wait_event!` only falls through on an exact id match. `$d`/`$me` are
/// the dispatcher and this process's own id; `$pt` is this process's
/// protothread cell (e.g. `$d.pt_mut($me)`, captured by the caller before
/// the call since the macro itself must also borrow `$d` mutably to start
/// the timer).
#[macro_export]
macro_rules! process_sleep {
    ($pt:expr, $d:expr, $me:expr, $ev:expr, $span:expr) => {{
        const __LC: $crate::Lc = line!() as $crate::Lc;
        if $pt.lc() < __LC {
            $d.event_timer_start($me, $crate::EVENT_ID_CONTINUE, ::std::default::Default::default(), $span);
        }
        $crate::wait_event!($pt, $ev, $crate::EVENT_ID_CONTINUE)
    }};
}

/// Suspends cooperatively in a loop until the real-time timer's lock is
/// acquired. `$d` is the dispatcher;
/// the macro evaluates `$d.rtimer_try_lock()` on every entry (including
/// resumes) and only falls through once it returns `true`.
#[macro_export]
macro_rules! process_rtimer_obtain {
    ($pt:expr, $d:expr) => {
        $crate::wait_until!($pt, $d.rtimer_try_lock())
    };
}
