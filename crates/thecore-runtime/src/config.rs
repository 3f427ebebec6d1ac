//! THE CORE runtime configuration.
//!
//! Compile-time defaults overridable from the environment, a builder, and a
//! `validate()` pass. The config surface covers the system's compile-time
//! options (ring buffer capacity, `from`-field tracking, list variant,
//! event-id width, tick rate); this crate keeps them as construction-time
//! fields on `CoreConfig` rather than `const` generics wired through every
//! type, since most of them (list variant, `from` tracking) only affect how
//! the dispatcher is built, not the shape of caller-visible data.

use thecore_core::env::{env_get, env_get_bool};

/// Compile-time-default, environment-overridable runtime configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Capacity of the process/event dispatcher's event ring buffer
    /// (default 8).
    pub event_queue_capacity: usize,
    /// Whether `Event` records carry a populated `from` field.
    pub track_event_from: bool,
    /// Whether `post` is permitted from interrupt context; when `true`, the
    /// dispatcher treats the event queue's count update as the only field
    /// an ISR may touch.
    pub allow_isr_post: bool,
    /// Enable `kdebug!`/`ktrace!`-level dispatcher logging at startup.
    pub debug_logging: bool,
    /// Recommended process-timer arena capacity. Advisory only:
    /// `Dispatcher<T, N, Q, M>`'s `M` is a `const` generic fixed at the call
    /// site that constructs the dispatcher, so this field cannot itself
    /// resize anything — it exists so a caller building a `Dispatcher` from
    /// a `CoreConfig` has one place to read the intended value from before
    /// picking `M`, and so `print()` reports the full configuration
    /// surface.
    pub ptimer_list_capacity: usize,
    /// Recommended process-table arena capacity. Same advisory-only
    /// relationship to `Dispatcher`'s `N` as `ptimer_list_capacity` has to
    /// `M`.
    pub process_table_capacity: usize,
}

mod defaults {
    pub const EVENT_QUEUE_CAPACITY: usize = 8;
    pub const TRACK_EVENT_FROM: bool = true;
    pub const ALLOW_ISR_POST: bool = false;
    pub const DEBUG_LOGGING: bool = false;
    pub const PTIMER_LIST_CAPACITY: usize = 16;
    pub const PROCESS_TABLE_CAPACITY: usize = 16;
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl CoreConfig {
    /// Compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `THECORE_EVENT_QUEUE_CAPACITY` - event ring buffer capacity
    /// - `THECORE_TRACK_EVENT_FROM` - populate `Event::from` (0/1)
    /// - `THECORE_ALLOW_ISR_POST` - allow `post` from ISR context (0/1)
    /// - `THECORE_DEBUG` - enable debug logging (0/1)
    /// - `THECORE_PTIMER_CAPACITY` - recommended process-timer arena size
    /// - `THECORE_PROCESS_CAPACITY` - recommended process-table arena size
    pub fn from_env() -> Self {
        CoreConfig {
            event_queue_capacity: env_get(
                "THECORE_EVENT_QUEUE_CAPACITY",
                defaults::EVENT_QUEUE_CAPACITY,
            ),
            track_event_from: env_get_bool(
                "THECORE_TRACK_EVENT_FROM",
                defaults::TRACK_EVENT_FROM,
            ),
            allow_isr_post: env_get_bool("THECORE_ALLOW_ISR_POST", defaults::ALLOW_ISR_POST),
            debug_logging: env_get_bool("THECORE_DEBUG", defaults::DEBUG_LOGGING),
            ptimer_list_capacity: env_get(
                "THECORE_PTIMER_CAPACITY",
                defaults::PTIMER_LIST_CAPACITY,
            ),
            process_table_capacity: env_get(
                "THECORE_PROCESS_CAPACITY",
                defaults::PROCESS_TABLE_CAPACITY,
            ),
        }
    }

    /// Explicit defaults, no environment override. Useful for tests.
    pub fn new() -> Self {
        CoreConfig {
            event_queue_capacity: defaults::EVENT_QUEUE_CAPACITY,
            track_event_from: defaults::TRACK_EVENT_FROM,
            allow_isr_post: defaults::ALLOW_ISR_POST,
            debug_logging: defaults::DEBUG_LOGGING,
            ptimer_list_capacity: defaults::PTIMER_LIST_CAPACITY,
            process_table_capacity: defaults::PROCESS_TABLE_CAPACITY,
        }
    }

    pub fn event_queue_capacity(mut self, cap: usize) -> Self {
        self.event_queue_capacity = cap;
        self
    }

    pub fn track_event_from(mut self, track: bool) -> Self {
        self.track_event_from = track;
        self
    }

    pub fn allow_isr_post(mut self, allow: bool) -> Self {
        self.allow_isr_post = allow;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    pub fn ptimer_list_capacity(mut self, cap: usize) -> Self {
        self.ptimer_list_capacity = cap;
        self
    }

    pub fn process_table_capacity(mut self, cap: usize) -> Self {
        self.process_table_capacity = cap;
        self
    }

    /// Validate configuration and return errors if invalid. The dispatcher's
    /// event queue capacity is a `const N` on `Dispatcher<_, _, N, _>`, so
    /// this does not gate dispatcher construction itself — it exists for
    /// callers who build `CoreConfig` from untrusted input (e.g. a demo
    /// binary reading env vars) before picking `N`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "event_queue_capacity must be > 0",
            ));
        }
        if self.ptimer_list_capacity == 0 {
            return Err(ConfigError::InvalidValue("ptimer_list_capacity must be > 0"));
        }
        if self.process_table_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "process_table_capacity must be > 0",
            ));
        }
        Ok(())
    }

    /// Print configuration to stderr via the `kprint` facility (debugging
    /// aid).
    pub fn print(&self) {
        thecore_core::kprintln!("THE CORE configuration:");
        thecore_core::kprintln!("  event_queue_capacity: {}", self.event_queue_capacity);
        thecore_core::kprintln!("  track_event_from:     {}", self.track_event_from);
        thecore_core::kprintln!("  allow_isr_post:       {}", self.allow_isr_post);
        thecore_core::kprintln!("  debug_logging:        {}", self.debug_logging);
        thecore_core::kprintln!("  ptimer_list_capacity: {}", self.ptimer_list_capacity);
        thecore_core::kprintln!(
            "  process_table_capacity: {}",
            self.process_table_capacity
        );
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults_are_valid() {
        let config = CoreConfig::from_env();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CoreConfig::new()
            .event_queue_capacity(16)
            .track_event_from(false);
        assert_eq!(config.event_queue_capacity, 16);
        assert!(!config.track_event_from);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let config = CoreConfig::new().event_queue_capacity(0);
        assert!(config.validate().is_err());
    }
}
