//! Environment variable utilities
//!
//! Generic `env_get<T>` function for parsing environment variables with
//! defaults. Used by `CoreConfig` (runtime crate) and by `kprint`'s
//! logging knobs.
//!
//! # Usage
//!
//! ```ignore
//! use thecore_core::env::{env_get, env_get_bool};
//!
//! let cap: usize = env_get("THECORE_EVENT_QUEUE_CAPACITY", 8);
//! let debug: bool = env_get_bool("THECORE_DEBUG", false);
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default.
///
/// Works with any type that implements `FromStr`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean.
///
/// Accepts: "1", "true", "yes", "on" (case-insensitive) as true.
/// Everything else (including unset) returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as an optional value.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Get environment variable as string, or return default.
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check if environment variable is set (regardless of value).
#[inline]
pub fn env_is_set(key: &str) -> bool {
    std::env::var(key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__THECORE_TEST_UNSET__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__THECORE_TEST_BOOL__", "yes");
        assert!(env_get_bool("__THECORE_TEST_BOOL__", false));
        std::env::set_var("__THECORE_TEST_BOOL__", "0");
        assert!(!env_get_bool("__THECORE_TEST_BOOL__", true));
        std::env::remove_var("__THECORE_TEST_BOOL__");
    }

    #[test]
    fn test_env_get_opt_none() {
        let val: Option<usize> = env_get_opt("__THECORE_TEST_UNSET__");
        assert!(val.is_none());
    }

    #[test]
    fn test_env_is_set() {
        assert!(!env_is_set("__THECORE_TEST_UNSET__"));
        assert!(env_is_set("PATH"));
    }
}
