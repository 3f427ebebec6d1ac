//! Process/event dispatcher.
//!
//! One struct owns every piece of process-wide singleton state: the running
//! list, the event queue, the poll flag, the current-process pointer.
//!
//! Processes live in a fixed-capacity arena owned by the `Dispatcher`
//! itself, indexed by [`ProcessId`], rather than in caller-provided static
//! storage pointed to by an intrusive list node. `register` plays the role
//! of `init(process, thread_fn)` — it hands back the `ProcessId` the caller
//! uses in place of a pointer for every subsequent operation.

use thecore_core::dlist::DList;
use thecore_core::event::{Event, EventId, EVENT_ID_POLL, EVENT_ID_START};
use thecore_core::protothread::{ProtoThread, PtState};
use thecore_core::ringbuf::RingBuffer;

use crate::config::CoreConfig;

/// Index into a `Dispatcher`'s process arena. Stands in for a `struct
/// process *` in the index-arena model.
pub type ProcessId = u16;

/// A process's thread function: `(dispatcher, self, event) -> protothread
/// state`, a pure function of `(process, event)`.
///
/// The dispatcher is passed in (rather than just `&mut T` and `&mut
/// ProtoThread`) because a process body frequently needs to `post`/`poll`/
/// `start` other processes from inside itself — exactly the pattern an
/// event-timer handler uses when it re-enters `process_post_sync`. The body
/// reads and writes its own state through
/// [`Dispatcher::pt_mut`]/[`Dispatcher::data_mut`] using the `self` id it's
/// given, rather than through a borrowed `&mut` field, which is what lets
/// one function signature serve both needs without a borrow conflict.
pub type ThreadFn<T, const N: usize, const Q: usize, const M: usize> =
    fn(&mut Dispatcher<T, N, Q, M>, ProcessId, &Event<ProcessId, T>) -> PtState;

#[derive(Clone, Copy)]
struct ProcessSlot<T, const N: usize, const Q: usize, const M: usize> {
    name: &'static str,
    thread_fn: ThreadFn<T, N, Q, M>,
    data: T,
    pt: ProtoThread,
    poll_req: bool,
}

/// The process/event dispatcher: process arena of capacity `N`, event queue
/// of capacity `Q`, process-timer arena of capacity `M` (see `ptimer.rs`).
///
/// `M`'s arenas (`ptimers`/`event_timers`/`callback_timers`/
/// `next_to_expire`/`ptimer_running`) are declared here rather than in
/// `ptimer.rs` because Rust requires a type's fields to live with its
/// definition; the *operations* over them are implemented in
/// `ptimer.rs`/`etimer.rs` as additional `impl` blocks over this same type,
/// which is why those fields are `pub(crate)` rather than private.
pub struct Dispatcher<T: Copy + Default, const N: usize, const Q: usize, const M: usize> {
    slots: [Option<ProcessSlot<T, N, Q, M>>; N],
    running: DList<N>,
    queue: RingBuffer<Event<ProcessId, T>, Q>,
    global_poll_req: bool,
    current: Option<ProcessId>,
    track_from: bool,

    pub(crate) ptimers: [Option<crate::ptimer::PtimerSlot<T, N, Q, M>>; M],
    pub(crate) ptimer_running: DList<M>,
    pub(crate) next_to_expire: Option<crate::ptimer::PtimerId>,
    pub(crate) ptimer_process: Option<ProcessId>,

    pub(crate) event_timers: [Option<crate::etimer::EventTimerSlot<T>>; M],
    pub(crate) callback_timers: [Option<crate::etimer::CallbackTimerSlot<T, N, Q, M>>; M],

    pub(crate) rtimer: crate::rtimer::RealtimeTimer<T, N, Q, M>,

    /// Global tick counter. Owned here rather than as a free-standing
    /// singleton so `ptimer`'s handlers can read "now" without requiring the
    /// dispatcher's payload type `T` to itself be a tick value — the counter
    /// is process-payload-agnostic.
    pub(crate) tick: thecore_core::tick::TickSource,
}

impl<T: Copy + Default, const N: usize, const Q: usize, const M: usize> Dispatcher<T, N, Q, M> {
    /// Empties the list, empties the queue, clears the current-process
    /// pointer and the poll flag. Also performs the timer subsystems' own
    /// `init` — module bring-up folds these into one constructor here rather
    /// than separate calls, since they're all fields of the same singleton
    /// context — see [`crate::bringup`] for the staged *start*-up that must
    /// still happen in order after this.
    pub fn new(config: &CoreConfig) -> Self {
        Dispatcher {
            slots: [None; N],
            running: DList::new(),
            queue: RingBuffer::new(),
            global_poll_req: false,
            current: None,
            track_from: config.track_event_from,

            ptimers: [None; M],
            ptimer_running: DList::new(),
            next_to_expire: None,
            ptimer_process: None,

            event_timers: [None; M],
            callback_timers: [None; M],

            rtimer: crate::rtimer::RealtimeTimer::new(),

            tick: thecore_core::tick::TickSource::new(),
        }
    }

    /// The dispatcher's tick counter. A tick ISR calls
    /// [`thecore_core::tick::TickSource::advance`] on this; application code
    /// reads it via [`Dispatcher::now`].
    #[inline]
    pub fn tick_source(&self) -> &thecore_core::tick::TickSource {
        &self.tick
    }

    /// Current tick value.
    #[inline]
    pub fn now(&self) -> thecore_core::tick::Tick {
        self.tick.now()
    }

    /// Registers a new process in the arena. Sets fields, zeroes the
    /// protothread state, clears
    /// `poll_req`. Does not link — the process is not running until
    /// [`Dispatcher::start`]. Returns `None` if the arena is full.
    pub fn register(
        &mut self,
        name: &'static str,
        thread_fn: ThreadFn<T, N, Q, M>,
    ) -> Option<ProcessId> {
        let i = self.slots.iter().position(|s| s.is_none())?;
        self.slots[i] = Some(ProcessSlot {
            name,
            thread_fn,
            data: T::default(),
            pt: ProtoThread::new(),
            poll_req: false,
        });
        Some(i as ProcessId)
    }

    /// Starts a process. If already running, fails (`false`). Otherwise
    /// stores `data`, initializes the protothread,
    /// links the process into the running list, and synchronously delivers
    /// a `start` event to it. If that first delivery returns `Terminated`,
    /// the process is unlinked immediately (inside [`Dispatcher::deliver`],
    /// same as any other delivery). Returns `true` regardless of whether
    /// the process survived its `start` event — `start` reports whether
    /// the process *was started*, not whether it is still running
    /// afterwards.
    pub fn start(&mut self, pid: ProcessId, data: T) -> bool {
        if self.running.contains(pid) {
            return false;
        }
        let Some(slot) = self.slots[pid as usize].as_mut() else {
            return false;
        };
        slot.data = data;
        slot.pt.init();
        slot.poll_req = false;
        self.running.push_back(pid);

        let ev = Event::new(EVENT_ID_START, data, Some(pid), None);
        self.deliver(&ev);
        true
    }

    /// Queues an event. `false` if the queue is full (no partial state
    /// change — the push is atomic from the caller's point of view).
    /// Records `from = current` when `track_event_from` is enabled in
    /// [`CoreConfig`].
    pub fn post(&mut self, to: Option<ProcessId>, id: EventId, data: T) -> bool {
        let from = if self.track_from { self.current } else { None };
        self.queue.push(Event::new(id, data, to, from))
    }

    /// Builds an event and delivers it immediately. Returns whether the
    /// target was running.
    pub fn post_sync(&mut self, to: ProcessId, id: EventId, data: T) -> bool {
        if !self.running.contains(to) {
            return false;
        }
        let from = if self.track_from { self.current } else { None };
        let ev = Event::new(id, data, Some(to), from);
        self.deliver(&ev)
    }

    /// Sets the process's `poll_req` and the global flag. In a real embedded
    /// target this is the one dispatcher operation an ISR calls directly;
    /// this `std`-hosted implementation assumes a single cooperative thread
    /// of execution and does not itself arbitrate concurrent ISR access — an
    /// arch layer embedding this crate on real interrupt hardware is
    /// expected to wrap this call in its own critical section.
    pub fn poll(&mut self, pid: ProcessId) -> bool {
        let Some(slot) = self.slots[pid as usize].as_mut() else {
            return false;
        };
        slot.poll_req = true;
        self.global_poll_req = true;
        true
    }

    /// One iteration of the dispatcher loop. Drains all pending poll
    /// requests first, then delivers
    /// at most one queued event. Returns a hint that is non-zero while work
    /// remains (queued events plus whether another poll pass is pending).
    pub fn run(&mut self) -> usize {
        while self.global_poll_req {
            self.global_poll_req = false;

            let mut cur = self.running.head();
            while let Some(pid) = cur {
                cur = self.running.next(pid);

                let wants_poll = self.slots[pid as usize]
                    .as_ref()
                    .map(|s| s.poll_req)
                    .unwrap_or(false);
                if !wants_poll {
                    continue;
                }
                if let Some(slot) = self.slots[pid as usize].as_mut() {
                    slot.poll_req = false;
                }
                let ev = Event::new(EVENT_ID_POLL, T::default(), Some(pid), None);
                self.deliver(&ev);
            }
        }

        if !self.queue.empty() {
            if let Some(ev) = self.queue.pop() {
                self.deliver(&ev);
            }
        }

        self.queue.count() + usize::from(self.global_poll_req)
    }

    /// Event delivery algorithm. Dispatches to
    /// [`Dispatcher::deliver_broadcast`] when `e.to.is_none()`.
    fn deliver(&mut self, e: &Event<ProcessId, T>) -> bool {
        let Some(to) = e.to else {
            return self.deliver_broadcast(e);
        };
        if !self.running.contains(to) {
            return false;
        }

        let prev = self.current;
        self.current = Some(to);

        // Copy the function pointer and name out of the arena before
        // calling it with `&mut self` — the slot itself cannot stay
        // borrowed across that call (`thread_fn` takes `&mut
        // Dispatcher<T, N, Q, M>`, i.e. `&mut self`). Function pointers and
        // `&'static str` are both `Copy`, so this is a plain value copy,
        // not a new allocation.
        let Some(slot) = self.slots[to as usize].as_ref() else {
            self.current = prev;
            return false;
        };
        let thread_fn = slot.thread_fn;
        let name = slot.name;

        thecore_core::kprint::set_current_process(name);
        let state = thread_fn(self, to, e);
        thecore_core::kprint::clear_current_process();

        if state == PtState::Terminated {
            self.running.erase(to);
        }

        self.current = prev;
        true
    }

    /// Broadcast delivery: delivered to every process in the running list at
    /// the moment of delivery, tolerating a process being removed
    /// mid-broadcast. Uses the manual safe-remove traversal documented on
    /// [`thecore_core::dlist::DList`]: `next` is captured before the current
    /// node's handler runs, so a process that terminates in response to the
    /// broadcast does not disturb iteration.
    fn deliver_broadcast(&mut self, e: &Event<ProcessId, T>) -> bool {
        let mut cur = self.running.head();
        while let Some(pid) = cur {
            cur = self.running.next(pid);
            let mut ev = *e;
            ev.to = Some(pid);
            self.deliver(&ev);
        }
        true
    }

    #[inline]
    pub fn is_running(&self, pid: ProcessId) -> bool {
        self.running.contains(pid)
    }

    /// The process currently executing on the dispatcher, if any.
    #[inline]
    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    /// The protothread state cell belonging to `pid`. Used by the
    /// `pt_begin!`/`wait_until!`/... macros in `thecore`'s facade crate to
    /// read/write the caller's own resume label.
    pub fn pt_mut(&mut self, pid: ProcessId) -> &mut ProtoThread {
        &mut self.slots[pid as usize].as_mut().expect("unregistered process id").pt
    }

    pub fn pt(&self, pid: ProcessId) -> &ProtoThread {
        &self.slots[pid as usize].as_ref().expect("unregistered process id").pt
    }

    /// The user data record belonging to `pid`.
    pub fn data(&self, pid: ProcessId) -> &T {
        &self.slots[pid as usize].as_ref().expect("unregistered process id").data
    }

    pub fn data_mut(&mut self, pid: ProcessId) -> &mut T {
        &mut self.slots[pid as usize].as_mut().expect("unregistered process id").data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thecore_core::event::{EVENT_ID_APPLICATION_BASE, EVENT_ID_CONTINUE};

    fn counting_thread_fn(
        d: &mut Dispatcher<i32, 4, 4, 4>,
        me: ProcessId,
        ev: &Event<ProcessId, i32>,
    ) -> PtState {
        if ev.id == EVENT_ID_START {
            return PtState::Waiting;
        }
        if ev.id == EVENT_ID_APPLICATION_BASE {
            *d.data_mut(me) = ev.data;
            return PtState::Waiting;
        }
        if ev.id == EVENT_ID_CONTINUE {
            return PtState::Terminated;
        }
        PtState::Waiting
    }

    fn empty_thread_fn(
        _d: &mut Dispatcher<i32, 4, 4, 4>,
        _me: ProcessId,
        _ev: &Event<ProcessId, i32>,
    ) -> PtState {
        PtState::Terminated
    }

    /// Terminates on a `continue` broadcast only if its own data is `1` —
    /// lets the broadcast test single out exactly one process to
    /// self-terminate, the way a test scenario distinguishes "the second
    /// process" among three identical recipients.
    fn terminate_if_marked_thread_fn(
        d: &mut Dispatcher<i32, 4, 4, 4>,
        me: ProcessId,
        ev: &Event<ProcessId, i32>,
    ) -> PtState {
        if ev.id == EVENT_ID_START {
            return PtState::Waiting;
        }
        if ev.id == EVENT_ID_CONTINUE && *d.data(me) == 1 {
            return PtState::Terminated;
        }
        PtState::Waiting
    }

    #[test]
    fn test_start_delivers_start_event_synchronously() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        assert!(d.start(p, 0));
        assert!(d.is_running(p));
    }

    #[test]
    fn test_start_unlinks_immediately_terminating_process() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", empty_thread_fn).unwrap();
        assert!(d.start(p, 0));
        assert!(!d.is_running(p));
    }

    #[test]
    fn test_start_twice_fails() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        assert!(d.start(p, 0));
        assert!(!d.start(p, 0));
    }

    #[test]
    fn test_post_then_run_delivers_one_event_in_fifo_order() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p1 = d.register("p1", counting_thread_fn).unwrap();
        let p2 = d.register("p2", counting_thread_fn).unwrap();
        d.start(p1, 0);
        d.start(p2, 0);

        assert!(d.post(Some(p1), EVENT_ID_APPLICATION_BASE, 11));
        assert!(d.post(Some(p2), EVENT_ID_APPLICATION_BASE, 22));

        d.run();
        assert_eq!(*d.data(p1), 11);
        assert_eq!(*d.data(p2), 0);

        d.run();
        assert_eq!(*d.data(p2), 22);
    }

    #[test]
    fn test_post_sync_delivers_immediately() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        d.start(p, 0);
        assert!(d.post_sync(p, EVENT_ID_APPLICATION_BASE, 7));
        assert_eq!(*d.data(p), 7);
    }

    #[test]
    fn test_post_sync_to_not_running_fails() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        assert!(!d.post_sync(p, EVENT_ID_APPLICATION_BASE, 7));
    }

    #[test]
    fn test_poll_delivers_poll_event_and_drains_before_queue() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        d.start(p, 0);

        assert!(d.post(Some(p), EVENT_ID_APPLICATION_BASE, 99));
        assert!(d.poll(p));
        d.run();
        // poll pass drains first; the queued application event is
        // untouched by the poll (id mismatch leaves data at 0), then a
        // single run() delivers it.
        assert_eq!(*d.data(p), 99);
    }

    #[test]
    fn test_broadcast_survives_self_termination_mid_broadcast() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 4, 4> = Dispatcher::new(&cfg);
        let p1 = d.register("p1", terminate_if_marked_thread_fn).unwrap();
        let p2 = d.register("p2", terminate_if_marked_thread_fn).unwrap();
        let p3 = d.register("p3", terminate_if_marked_thread_fn).unwrap();
        d.start(p1, 0);
        d.start(p2, 1);
        d.start(p3, 0);

        assert!(d.post(None, EVENT_ID_CONTINUE, 0));
        d.run();

        assert!(!d.is_running(p2));
        assert!(d.is_running(p1));
        assert!(d.is_running(p3));
    }

    #[test]
    fn test_queue_full_rejects_post() {
        let cfg = CoreConfig::new();
        let mut d: Dispatcher<i32, 4, 2, 4> = Dispatcher::new(&cfg);
        let p = d.register("p", counting_thread_fn).unwrap();
        d.start(p, 0);
        assert!(d.post(Some(p), EVENT_ID_APPLICATION_BASE, 1));
        assert!(d.post(Some(p), EVENT_ID_APPLICATION_BASE, 2));
        assert!(!d.post(Some(p), EVENT_ID_APPLICATION_BASE, 3));
    }
}
