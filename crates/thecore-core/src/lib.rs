//! Platform-agnostic bounded collections, timing, and protothread primitives
//! for THE CORE.
//!
//! This crate has no dispatcher and no global state: it is the set of
//! building blocks (`ringbuf`, `dlist`, `pool`, `tick`, `timer`,
//! `protothread`) that `thecore-runtime` assembles into the process/event
//! dispatcher and the timer hierarchy.

pub mod dlist;
pub mod env;
pub mod error;
pub mod event;
pub mod kprint;
pub mod pool;
pub mod protothread;
pub mod ringbuf;
pub mod tick;
pub mod timer;

pub use dlist::DList;
pub use error::CoreError;
pub use event::{Event, EventId};
pub use pool::ItemPool;
pub use protothread::{Lc, ProtoThread, PtState};
pub use ringbuf::RingBuffer;
pub use tick::{Duration as TickSpan, Tick};
pub use timer::Timer;
