//! Protothread local-continuation state.
//!
//! The classic Duff's-device local continuation resumes a function body with
//! `switch (lc) { case 0: ...; case __LINE__: ...; }`, relying on real C
//! fallthrough between cases. Safe Rust has no computed-goto and no
//! fallthrough `switch`, so each suspension point here is instead reached by
//! comparing the stored `lc` against its own `line!()` rather than jumping to
//! it.
//!
//! The `thecore` facade crate's `pt_begin!`/`wait_until!`/`pt_yield!`/...
//! macros (see `thecore/src/macros.rs`) each expand to code that reads
//! `line!()` at the macro's own call site and compares it against
//! [`ProtoThread::lc`] to decide whether to run, suspend, or skip past that
//! suspension point — reproducing the protothread invariants without
//! needing a jump table:
//!
//! - A suspension point whose `line!()` is *less than* the stored `lc` has
//!   already been passed on a previous resumption and must be skipped
//!   entirely (this is what a `case` label below the resume point being
//!   skipped achieves in the classic form).
//! - A suspension point whose `line!()` *equals* the stored `lc` is exactly
//!   where the previous call suspended; its condition must be re-evaluated
//!   now.
//! - A suspension point whose `line!()` is *greater than* the stored `lc`
//!   has not yet been reached this pass and runs normally (first arrival).
//!
//! Because every suspension macro is single-line (one per logical wait
//! point, matching the classic one-`PT_YIELD`-per-line discipline),
//! `line!()` is a stable, monotonically increasing tag along the body in
//! source order — exactly the property Duff's device relies on `__LINE__`
//! for.

/// Local continuation cell.
pub type Lc = u16;

/// `lc = 0` marks a protothread that has not yet been entered, or has been
/// explicitly restarted.
pub const LC_INIT: Lc = 0;

/// All-ones sentinel marking a terminated protothread. `u16::MAX` is larger
/// than any `line!()` a real source file reaches, so it can never collide
/// with a legitimate resume label.
pub const LC_TERMINATED: Lc = Lc::MAX;

/// The three protothread states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtState {
    Initialized,
    Waiting,
    Terminated,
}

/// The local-continuation cell a protothread function owns.
///
/// `ProtoThread` itself holds no body and no local variables — the caller's
/// thread function is the body, and any state that must survive a
/// suspension is stored in the caller's own process/data record, not here.
/// This type is exactly the resumable-position counter a protothread needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtoThread {
    lc: Lc,
}

impl ProtoThread {
    /// A freshly constructed protothread is `Initialized`.
    pub const fn new() -> Self {
        ProtoThread { lc: LC_INIT }
    }

    #[inline]
    pub fn lc(&self) -> Lc {
        self.lc
    }

    #[inline]
    pub fn set_lc(&mut self, lc: Lc) {
        self.lc = lc;
    }

    /// `state(lc) = Initialized if lc=0; Terminated if lc=sentinel; Waiting
    /// otherwise`.
    pub fn state(&self) -> PtState {
        match self.lc {
            LC_INIT => PtState::Initialized,
            LC_TERMINATED => PtState::Terminated,
            _ => PtState::Waiting,
        }
    }

    /// `is_running = (lc ≠ 0 ∧ lc ≠ sentinel)` — equivalently,
    /// `state() == Waiting`.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state(), PtState::Waiting)
    }

    /// Explicit `init`: resets to `Initialized`. An explicit restart from
    /// any state also routes through this.
    pub fn init(&mut self) {
        self.lc = LC_INIT;
    }

    /// `exit`: sets `lc` to the sentinel and the protothread is
    /// `Terminated` from this point on.
    pub fn exit(&mut self) {
        self.lc = LC_TERMINATED;
    }

    /// `restart`: `lc = 0`. Identical effect to [`ProtoThread::init`]; kept
    /// as a separate name because module bring-up and a thread function's
    /// own explicit restart macro are distinct operations on the API
    /// surface even though they mutate `lc` the same way.
    pub fn restart(&mut self) {
        self.lc = LC_INIT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_initialized_and_not_running() {
        let pt = ProtoThread::new();
        assert_eq!(pt.state(), PtState::Initialized);
        assert!(!pt.is_running());
    }

    #[test]
    fn test_waiting_when_lc_is_a_resume_label() {
        let mut pt = ProtoThread::new();
        pt.set_lc(42);
        assert_eq!(pt.state(), PtState::Waiting);
        assert!(pt.is_running());
    }

    #[test]
    fn test_exit_terminates() {
        let mut pt = ProtoThread::new();
        pt.set_lc(42);
        pt.exit();
        assert_eq!(pt.state(), PtState::Terminated);
        assert!(!pt.is_running());
    }

    #[test]
    fn test_restart_reinitializes() {
        let mut pt = ProtoThread::new();
        pt.exit();
        pt.restart();
        assert_eq!(pt.state(), PtState::Initialized);
    }
}
