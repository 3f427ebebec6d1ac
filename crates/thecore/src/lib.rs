//! THE CORE — a cooperative, event-driven mini-OS core.
//!
//! Facade crate: re-exports [`thecore_core`] (protothread state, the timer
//! hierarchy's pure types, the bounded collections) and [`thecore_runtime`]
//! (the dispatcher and its timer machinery), and owns the user-facing
//! `#[macro_export]` macro surface in [`macros`].
//!
//! ## Quick start
//!
//! ```ignore
//! use thecore::*;
//!
//! // One suspension point in straight-line code, not wrapped in a native
//! // Rust loop — see `macros`'s "Known limitation" doc. The dispatcher's
//! // own per-event re-invocation supplies the repetition.
//! fn ping_thread_fn(d: &mut Dispatcher<(), 4, 4, 4>, me: ProcessId, ev: &Event<ProcessId, ()>) -> PtState {
//!     pt_begin!(d.pt_mut(me));
//!     wait_event!(d.pt_mut(me), ev, EVENT_ID_APPLICATION_BASE);
//!     kprintln!("ping");
//!     PtState::Waiting
//! }
//! ```

pub mod macros;

pub use thecore_core::dlist::DList;
pub use thecore_core::env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
pub use thecore_core::error::{CoreError, CoreResult};
pub use thecore_core::event::{
    Event, EventId, EVENT_ID_APPLICATION_BASE, EVENT_ID_CONTINUE, EVENT_ID_POLL, EVENT_ID_START,
    EVENT_ID_TIMEOUT,
};
pub use thecore_core::pool::ItemPool;
pub use thecore_core::protothread::{Lc, ProtoThread, PtState, LC_INIT, LC_TERMINATED};
pub use thecore_core::ringbuf::RingBuffer;
pub use thecore_core::tick::{less_than, Duration, Tick, TickSource};
pub use thecore_core::timer::Timer;

pub use thecore_core::kprint::{self, init as init_logging, LogLevel};
pub use thecore_core::{kdebug, kerror, kinfo, ktrace, kwarn, kprint as kprint_macro, kprintln};

pub use thecore_runtime::bringup::{bring_up, BroughtUp};
pub use thecore_runtime::config::{ConfigError, CoreConfig};
pub use thecore_runtime::dispatcher::{Dispatcher, ProcessId, ThreadFn};
pub use thecore_runtime::etimer::CallbackTimerCallback;
pub use thecore_runtime::ptimer::{PtimerHandler, PtimerId};
pub use thecore_runtime::rtimer::{RtimerArch, RtimerCallback};
