//! Basic THE CORE example
//!
//! Registers one process, starts it (delivering a synchronous `start`
//! event), then drives the dispatcher loop with `post`/`run` until the
//! process terminates. The process waits for a `ping` event, bounces a
//! counter back to itself, and terminates once the counter reaches 3.
//!
//! Deliberately avoids wrapping `wait_event!` in a native Rust loop — see
//! `thecore::macros`'s module docs ("Known limitation"). Instead the single
//! `wait_event!` call sits in straight-line code; its resume label stays
//! parked across invocations, so the dispatcher's own per-event
//! re-invocation supplies the repetition.

use thecore::*;

type Disp = Dispatcher<i32, 4, 8, 4>;

const EVENT_ID_PING: EventId = EVENT_ID_APPLICATION_BASE;

fn ping_thread_fn(d: &mut Disp, me: ProcessId, ev: &Event<ProcessId, i32>) -> PtState {
    pt_begin!(d.pt_mut(me));

    wait_event!(d.pt_mut(me), ev, EVENT_ID_PING);
    let n = ev.data;
    kinfo!("ping received {}", n);
    if n >= 3 {
        pt_end!(d.pt_mut(me));
    }
    d.post(Some(me), EVENT_ID_PING, n + 1);
    PtState::Waiting
}

fn main() {
    thecore::init_logging();

    println!("=== THE CORE: basic example ===\n");

    let config = CoreConfig::new();
    let mut d: Disp = Dispatcher::new(&config);

    let ping = d.register("ping", ping_thread_fn).unwrap();
    d.start(ping, 0);
    d.post(Some(ping), EVENT_ID_PING, 0);

    while d.is_running(ping) {
        d.run();
    }

    println!("\nping process terminated after reaching 3");
}
