//! Process/event dispatcher and timer hierarchy for THE CORE.
//!
//! Builds on [`thecore_core`]'s data structures to provide the stateful
//! singleton pieces: the process/event dispatcher, the poll-driven process
//! timer, event/callback timers, the real-time timer, and module bring-up.
//!
//! This crate has no notion of Duff's-device suspension — that translation
//! lives in the `thecore` facade crate's macros, which read/write a
//! process's [`thecore_core::protothread::ProtoThread`] through
//! [`dispatcher::Dispatcher::pt_mut`]. Everything here is plain, safe Rust
//! calling plain, safe Rust.

pub mod bringup;
pub mod config;
pub mod dispatcher;
pub mod etimer;
pub mod ptimer;
pub mod rtimer;

pub use bringup::{bring_up, BroughtUp};
pub use config::{ConfigError, CoreConfig};
pub use dispatcher::{Dispatcher, ProcessId, ThreadFn};
pub use etimer::CallbackTimerCallback;
pub use ptimer::{PtimerHandler, PtimerId};
pub use rtimer::{RtimerArch, RtimerCallback};
