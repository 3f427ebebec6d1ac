//! Error types for THE CORE.
//!
//! The four named in-band failure modes (queue full, already running, target
//! not running, lock contention) stay `bool` returns — they are expected
//! runtime conditions, not exceptions. `CoreError` is
//! reserved for the handful of things that are genuine misconfiguration
//! (zero-capacity collections, a real-time timer armed without an arch
//! backend) and therefore sit outside that in-band contract.

use core::fmt;

/// Result type for the handful of core operations that are not expressed as
/// in-band booleans.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// A bounded collection was constructed with zero capacity.
    ZeroCapacity,
    /// `RtimerHandle` was armed but no `RtimerArch` backend is installed.
    NoRtimerArch,
    /// The item pool has no free slots.
    PoolExhausted,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ZeroCapacity => write!(f, "collection capacity must be > 0"),
            CoreError::NoRtimerArch => write!(f, "no real-time timer arch backend installed"),
            CoreError::PoolExhausted => write!(f, "item pool exhausted"),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", CoreError::ZeroCapacity),
            "collection capacity must be > 0"
        );
    }
}
