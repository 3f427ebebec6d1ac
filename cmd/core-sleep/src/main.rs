//! THE CORE event-timer sleep example
//!
//! Demonstrates `process_sleep!`: a process suspends for a span of ticks
//! without blocking the dispatcher, using an event timer under the hood.
//! The `main` loop here plays the role of the tick ISR: it advances the tick
//! counter and calls `ptimer_poll_if_necessary` once per simulated tick,
//! then drives the dispatcher with `run()`.
//!
//! `process_sleep!`'s "arm the timer" side effect only fires the first time
//! its call site is reached (the same `lc < line` guard `wait_event!` uses
//! to suspend exactly once) — one call site therefore sleeps exactly once
//! per protothread lifetime. A process that needs to sleep repeatedly must
//! use a distinct `process_sleep!` call site per round, or re-arm the
//! underlying event timer directly via `Dispatcher::event_timer_reset`.

use thecore::*;

type Disp = Dispatcher<i32, 4, 8, 4>;

const SLEEP_SPAN: Duration = 5;

fn sleeper_thread_fn(d: &mut Disp, me: ProcessId, ev: &Event<ProcessId, i32>) -> PtState {
    // No plain statement precedes `process_sleep!` here — see
    // `thecore::macros`'s "Known limitation" doc: a non-macro statement
    // placed before a suspension point re-executes on every resumption
    // that passes through it, which would print this process's "going to
    // sleep" line a second time when it wakes.
    pt_begin!(d.pt_mut(me));
    process_sleep!(d.pt_mut(me), d, me, ev, SLEEP_SPAN);
    kinfo!("woke up at tick {}", d.now());
    *d.data_mut(me) = 1;
    pt_end!(d.pt_mut(me));
}

struct HostedArch;
impl RtimerArch for HostedArch {
    fn now(&self) -> Tick {
        0
    }
    fn timer_set(&mut self, _deadline: Tick) {}
}

fn main() {
    thecore::init_logging();

    println!("=== THE CORE: event-timer sleep example ===\n");

    let config = CoreConfig::new();
    let mut arch = HostedArch;
    let up: BroughtUp<i32, 4, 8, 4> = bring_up(&config, &mut arch);
    let mut d = up.dispatcher;

    let sleeper = d.register("sleeper", sleeper_thread_fn).unwrap();
    d.start(sleeper, 0);

    // Simulated tick ISR: advance the counter and poll the ptimer process
    // once per iteration.
    while d.is_running(sleeper) {
        d.tick_source().advance();
        d.ptimer_poll_if_necessary();
        d.run();
    }

    println!("\nsleeper terminated, woken-flag = {}", d.data(sleeper));
}
