//! Monotonic time source.
//!
//! `Tick` is a free-running counter advanced from an interrupt context. The
//! counter wraps; every comparison in this crate uses the modular
//! signed-difference rule: `a < b` iff `(signed)(a - b) < 0`. This crate
//! does not itself run an interrupt — `thecore-runtime` owns the global
//! tick counter and calls [`Tick::wrapping_add`] from the ISR path; this
//! module supplies the counter type and its comparison law.

use std::sync::atomic::{AtomicU32, Ordering};

/// A monotonic tick value. Wraparound is a normal, expected event, not an
/// error.
pub type Tick = u32;

/// A span of ticks — same underlying type as `Tick`.
pub type Duration = u32;

/// `true` iff `a` is strictly before `b` under modular wraparound semantics.
///
/// `a < b` iff `(signed)(a - b) < 0`. Using `wrapping_sub` and
/// reinterpreting as signed gives exactly that rule without invoking
/// undefined behavior on overflow.
#[inline]
pub fn less_than(a: Tick, b: Tick) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

/// A free-running tick counter, advanced from interrupt context.
///
/// Reads are lock-free. Because the target platform may not be able to
/// load the full counter width atomically, `now()` follows a read-twice
/// rule: read twice and retry until two consecutive reads agree. On the
/// architectures `std::sync::atomic::AtomicU32` actually supports this is
/// unconditionally single-read-stable, but the retry loop is kept so the
/// contract holds even if the backing store narrows.
#[derive(Debug, Default)]
pub struct TickSource {
    counter: AtomicU32,
}

impl TickSource {
    pub const fn new() -> Self {
        TickSource {
            counter: AtomicU32::new(0),
        }
    }

    /// Current tick value. Read-twice-and-retry.
    #[inline]
    pub fn now(&self) -> Tick {
        loop {
            let a = self.counter.load(Ordering::Acquire);
            let b = self.counter.load(Ordering::Acquire);
            if a == b {
                return a;
            }
        }
    }

    /// Advance the counter by one tick. Called from the tick ISR.
    #[inline]
    pub fn advance(&self) {
        self.counter.fetch_add(1, Ordering::AcqRel);
    }

    /// Advance the counter by an arbitrary number of ticks (test/simulation
    /// helper; a real ISR advances by exactly one).
    #[inline]
    pub fn advance_by(&self, n: Tick) {
        self.counter.fetch_add(n, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_less_than_no_wrap() {
        assert!(less_than(1, 2));
        assert!(!less_than(2, 1));
        assert!(!less_than(5, 5));
    }

    #[test]
    fn test_less_than_wraps_around() {
        let max = Tick::MAX;
        assert!(less_than(max, 0));
        assert!(!less_than(0, max));
    }

    #[test]
    fn test_tick_source_advances() {
        let src = TickSource::new();
        assert_eq!(src.now(), 0);
        src.advance();
        assert_eq!(src.now(), 1);
        src.advance_by(41);
        assert_eq!(src.now(), 42);
    }
}
