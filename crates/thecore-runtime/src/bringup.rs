//! Module bring-up: a single entry point that wires a complete runtime
//! instance together in the order its pieces actually depend on each other.
//!
//! The dispatcher's own fields (process list, event queue, poll flag, timer
//! arenas) are all zeroed by [`Dispatcher::new`] in one step, but the
//! *subsystems* still have a required start-up order because the ptimer
//! process must exist and be running before anything calls
//! `ptimer_poll_if_necessary`, and the hardware driver must run its
//! `module_init` before the first `rtimer_set`.
//!
//! Order: dispatcher struct exists → tick counter (already zeroed by
//! `Dispatcher::new`) → pure timer predicates (no init needed) → start the
//! ptimer process → event/callback timers ride on the ptimer process, no
//! separate init → hardware arch `module_init`.

use crate::config::CoreConfig;
use crate::dispatcher::{Dispatcher, ProcessId};
use crate::rtimer::RtimerArch;

/// Result of bringing a dispatcher up: the dispatcher itself plus the
/// process id of the ptimer process that was started, which bring-up
/// callers sometimes want to log or assert against.
pub struct BroughtUp<T: Copy + Default, const N: usize, const Q: usize, const M: usize> {
    pub dispatcher: Dispatcher<T, N, Q, M>,
    pub ptimer_process: ProcessId,
}

/// Brings up a complete runtime instance in dependency order. `arch` is the
/// hardware real-time timer driver; pass a no-op/hosted stand-in when not
/// targeting real interrupt hardware.
pub fn bring_up<T: Copy + Default, const N: usize, const Q: usize, const M: usize>(
    config: &CoreConfig,
    arch: &mut dyn RtimerArch,
) -> BroughtUp<T, N, Q, M> {
    if config.debug_logging {
        config.print();
    }

    // Dispatcher struct, tick counter, and timer arenas: one constructor,
    // since they are all fields of the same singleton context.
    let mut dispatcher: Dispatcher<T, N, Q, M> = Dispatcher::new(config);

    // Start the dedicated ptimer process. Must happen before any
    // `ptimer_start`/`ptimer_poll_if_necessary` call.
    let ptimer_process = dispatcher.ptimer_process_start();

    // Hardware driver init, last, since earlier steps establish the
    // process table and tick counter an ISR firing immediately after this
    // call might need.
    arch.module_init();

    BroughtUp {
        dispatcher,
        ptimer_process,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopArch;
    impl RtimerArch for NoopArch {
        fn now(&self) -> thecore_core::tick::Tick {
            0
        }
        fn timer_set(&mut self, _deadline: thecore_core::tick::Tick) {}
    }

    #[test]
    fn test_bring_up_starts_ptimer_process() {
        let config = CoreConfig::new();
        let mut arch = NoopArch;
        let up: BroughtUp<i32, 4, 4, 4> = bring_up(&config, &mut arch);
        assert!(up.dispatcher.is_running(up.ptimer_process));
    }
}
