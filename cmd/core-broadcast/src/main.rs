//! THE CORE broadcast example
//!
//! Three processes all wait on the same class of event; `post(None, ...)`
//! fans one event out to every running process in a single `run()` call.
//! One process is marked to terminate the first time it sees a broadcast,
//! demonstrating that the dispatcher's safe-remove traversal lets a process
//! vanish mid-broadcast without disturbing delivery to the processes after
//! it.

use thecore::*;

type Disp = Dispatcher<i32, 4, 8, 4>;

// Deliberately NOT a `loop { wait_any_event!(...); ... }` — see
// `thecore::macros`'s "Known limitation" doc: a suspension macro re-reached
// via a Rust-level loop backedge within a single invocation can't tell that
// encounter apart from the original resume. One suspension point and a
// plain `Waiting` fallthrough let the dispatcher's own repeated broadcasts
// supply the repetition instead.
fn member_thread_fn(d: &mut Disp, me: ProcessId, ev: &Event<ProcessId, i32>) -> PtState {
    pt_begin!(d.pt_mut(me));
    wait_any_event!(d.pt_mut(me));

    let marked = *d.data(me) == 1;
    kinfo!("{:?} received event {} (marked = {})", me, ev.id, marked);
    if ev.id == EVENT_ID_CONTINUE && marked {
        kinfo!("{:?} terminating mid-broadcast", me);
        exit_pt!(d.pt_mut(me));
    }
    PtState::Waiting
}

fn main() {
    thecore::init_logging();

    println!("=== THE CORE: broadcast example ===\n");

    let config = CoreConfig::new();
    let mut d: Disp = Dispatcher::new(&config);

    let p1 = d.register("p1", member_thread_fn).unwrap();
    let p2 = d.register("p2", member_thread_fn).unwrap();
    let p3 = d.register("p3", member_thread_fn).unwrap();

    // p2 is marked to self-terminate on its first broadcast.
    d.start(p1, 0);
    d.start(p2, 1);
    d.start(p3, 0);

    for round in 1..=3 {
        println!("-- round {round} --");
        d.post(None, EVENT_ID_CONTINUE, round);
        d.run();
        println!(
            "p1 running = {}, p2 running = {}, p3 running = {}",
            d.is_running(p1),
            d.is_running(p2),
            d.is_running(p3)
        );
    }
}
