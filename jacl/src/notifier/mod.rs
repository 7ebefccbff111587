//! The Event Notifier
//!
//! The notifier is the scheduler behind `vwait`, `update`, `after idle`, and I/O
//! readiness callbacks.  It owns two pieces of state:
//!
//! * A FIFO queue of [`TclEvent`]s: units of work to be run by the notifier's primary
//!   thread.
//! * A list of [`IdleHandler`]s: callbacks fired once, the next time the notifier finds
//!   no events to process.
//!
//! # Threads
//!
//! There is one notifier per thread, shared by every interpreter created on that thread;
//! [`Notifier::for_current_thread`] returns it.  The thread that created it is its
//! _primary thread_, and only the primary thread ever runs events and idle callbacks.
//! This is enforced by the type system: a [`Notifier`] handle is `!Send`, and is the only
//! handle with servicing methods.  Other threads obtain a [`NotifierHandle`], which is
//! `Send + Sync` and can only produce work: queue events, register idle handlers, and
//! wake the primary thread.  Work produced by another thread must itself be `Send`; the
//! primary thread may also queue work that is not.
//!
//! # Servicing
//!
//! [`Notifier::service_event`] does at most one unit of work: it runs the first queued
//! event that accepts processing, or, if no event was run, one pass over the idle
//! handlers.  [`Notifier::do_one_event`] wraps it with an optional blocking wait, which
//! returns as soon as another thread queues work or calls `signal_waiters`.
//!
//! # Idle Generations
//!
//! Every idle handler is stamped with the notifier's idle generation when it is
//! registered.  Each idle pass advances the generation and fires only handlers stamped
//! before the pass began, so an idle callback that registers another idle handler can't
//! keep a single pass running forever: the new handler waits for the next pass.
//!
//! # Teardown
//!
//! The notifier is torn down when the last `Notifier` handle on its primary thread is
//! dropped.  Pending events and idle handlers are discarded; threads blocked in
//! [`TclEvent::sync`] are released with [`NotifierError::Disposed`], as are later
//! attempts to queue work through a `NotifierHandle`.
//!
//! # Example
//!
//! ```
//! use rejacl::notifier::{EventFlags, Notifier, QueuePosition, TclEvent};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let notifier = Notifier::for_current_thread();
//! let count = Arc::new(AtomicUsize::new(0));
//!
//! let handle = notifier.handle();
//! let c = count.clone();
//! let worker = std::thread::spawn(move || {
//!     let event = TclEvent::new(move |_flags: EventFlags| {
//!         c.fetch_add(1, Ordering::SeqCst);
//!         true
//!     });
//!     handle.queue_event(&event, QueuePosition::Tail).unwrap();
//! });
//! worker.join().unwrap();
//!
//! // The event runs only when the primary thread services the queue.
//! assert_eq!(count.load(Ordering::SeqCst), 0);
//! assert!(notifier.service_event(EventFlags::ALL_EVENTS));
//! assert_eq!(count.load(Ordering::SeqCst), 1);
//! ```
//!
//! [`TclEvent`]: struct.TclEvent.html
//! [`TclEvent::sync`]: struct.TclEvent.html#method.sync
//! [`IdleHandler`]: struct.IdleHandler.html
//! [`Notifier`]: struct.Notifier.html
//! [`Notifier::for_current_thread`]: struct.Notifier.html#method.for_current_thread
//! [`Notifier::service_event`]: struct.Notifier.html#method.service_event
//! [`Notifier::do_one_event`]: struct.Notifier.html#method.do_one_event
//! [`NotifierHandle`]: struct.NotifierHandle.html
//! [`NotifierError::Disposed`]: ../error/enum.NotifierError.html

use crate::error::NotifierError;
use crate::types::TclHasher;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::ops::BitOr;
use core::sync::atomic::{AtomicU64, Ordering};
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

mod event;
mod idle;

pub use event::EventProc;
pub use event::TclEvent;
pub use idle::IdleHandler;

use event::EventBody;
use idle::IdleBody;

/// Flags controlling what kinds of work a service call may do, and whether it may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventFlags(u32);

impl EventFlags {
    /// Return immediately if there is no work to do.
    pub const DONT_WAIT: Self = Self(1 << 1);
    pub const WINDOW_EVENTS: Self = Self(1 << 2);
    pub const FILE_EVENTS: Self = Self(1 << 3);
    pub const TIMER_EVENTS: Self = Self(1 << 4);
    pub const IDLE_EVENTS: Self = Self(1 << 5);
    /// Every kind of work.
    pub const ALL_EVENTS: Self = Self(!(1 << 1));

    /// No flags at all; service calls treat this as `ALL_EVENTS`.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether every flag in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` selects any kind of work at all.
    pub const fn has_event_types(self) -> bool {
        self.0 & Self::ALL_EVENTS.0 != 0
    }

    /// The raw flag bits.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where in the event queue a new event goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePosition {
    /// At the end of the queue: normal FIFO order.
    Tail,
    /// At the front of the queue, ahead of everything.
    Head,
    /// After the most recent event queued with `Mark`, or at the front if there is none.
    /// Successive marked events thus run in order, ahead of unmarked ones.
    Mark,
}

//------------------------------------------------------------------------------------------
// Shared state

static NEXT_NOTIFIER_ID: AtomicU64 = AtomicU64::new(1);

/// The part of a notifier that every thread may touch.
pub(crate) struct Shared {
    id: u64,
    primary: ThreadId,
    state: Mutex<QueueState>,
    wakeup: Condvar,
    // Local callbacks of idle handlers cancelled on other threads, for the primary thread
    // to drop.
    released: Mutex<Vec<u64>>,
}

struct QueueState {
    events: VecDeque<Arc<TclEvent>>,
    // The number of leading events queued at the mark.
    marker: usize,
    idle: VecDeque<Arc<IdleHandler>>,
    idle_generation: u64,
    alerted: bool,
    disposed: bool,
}

impl Shared {
    fn new() -> Self {
        Self {
            id: NEXT_NOTIFIER_ID.fetch_add(1, Ordering::Relaxed),
            primary: thread::current().id(),
            state: Mutex::new(QueueState {
                events: VecDeque::new(),
                marker: 0,
                idle: VecDeque::new(),
                idle_generation: 0,
                alerted: false,
                disposed: false,
            }),
            wakeup: Condvar::new(),
            released: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_primary_thread(&self) -> bool {
        thread::current().id() == self.primary
    }

    fn queue_event(
        self: &Arc<Self>,
        event: &Arc<TclEvent>,
        position: QueuePosition,
    ) -> Result<(), NotifierError> {
        let mut q = self.state.lock();

        if q.disposed {
            return Err(NotifierError::Disposed);
        }

        event.claim(self);

        match position {
            QueuePosition::Tail => q.events.push_back(event.clone()),
            QueuePosition::Head => {
                q.events.push_front(event.clone());
                if q.marker > 0 {
                    q.marker += 1;
                }
            }
            QueuePosition::Mark => {
                let at = q.marker;
                q.events.insert(at, event.clone());
                q.marker += 1;
            }
        }

        if !self.is_primary_thread() {
            Self::alert(&mut q, &self.wakeup);
        }

        Ok(())
    }

    fn register_idle(self: &Arc<Self>, handler: &Arc<IdleHandler>) -> Result<(), NotifierError> {
        let mut q = self.state.lock();

        if q.disposed {
            return Err(NotifierError::Disposed);
        }

        handler.attach(self, q.idle_generation);
        q.idle.push_back(handler.clone());

        if !self.is_primary_thread() {
            Self::alert(&mut q, &self.wakeup);
        }

        Ok(())
    }

    /// Removes an idle handler from the idle list, if it is still there.
    pub(crate) fn unlink_idle(&self, handler: &IdleHandler) {
        let mut q = self.state.lock();
        if let Some(pos) = q
            .idle
            .iter()
            .position(|h| core::ptr::eq(Arc::as_ptr(h), handler))
        {
            q.idle.remove(pos);
        }
    }

    /// Removes an event from the queue, if it is still there.
    fn unlink_event(&self, event: &Arc<TclEvent>) -> bool {
        let mut q = self.state.lock();
        Self::remove_event(&mut q, event)
    }

    fn remove_event(q: &mut QueueState, event: &Arc<TclEvent>) -> bool {
        match q.events.iter().position(|e| Arc::ptr_eq(e, event)) {
            Some(pos) => {
                q.events.remove(pos);
                if pos < q.marker {
                    q.marker -= 1;
                }
                true
            }
            None => false,
        }
    }

    fn alert(q: &mut QueueState, wakeup: &Condvar) {
        q.alerted = true;
        wakeup.notify_all();
    }

    fn signal_waiters(&self) {
        let mut q = self.state.lock();
        Self::alert(&mut q, &self.wakeup);
    }

    /// Marks a local callback for release by the primary thread.
    pub(crate) fn release_local(&self, id: u64) {
        self.released.lock().push(id);
    }

    /// Tears the notifier down, discarding all pending work.
    fn dispose(&self) {
        let (events, idle) = {
            let mut q = self.state.lock();
            if q.disposed {
                return;
            }
            q.disposed = true;
            q.marker = 0;
            let events: Vec<_> = q.events.drain(..).collect();
            let idle: Vec<_> = q.idle.drain(..).collect();
            Self::alert(&mut q, &self.wakeup);
            (events, idle)
        };

        debug!(
            notifier = self.id,
            events = events.len(),
            idle = idle.len(),
            "notifier disposed; discarding pending work"
        );

        for event in events {
            event.discard();
        }

        for handler in idle {
            handler.discard();
        }
    }
}

//------------------------------------------------------------------------------------------
// Primary-thread state

// Callbacks that are not Send live here, on the primary thread, keyed by ID; the shared
// queue refers to them by that ID.
enum LocalProc {
    Event(Box<dyn FnMut(EventFlags) -> bool>),
    Idle(Box<dyn FnOnce()>),
}

struct Primary {
    shared: Arc<Shared>,
    local: RefCell<IndexMap<u64, LocalProc, TclHasher>>,
    next_local: Cell<u64>,
}

impl Drop for Primary {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

thread_local! {
    static CURRENT: RefCell<Weak<Primary>> = RefCell::new(Weak::new());
}

/// The primary-thread handle to a thread's notifier.  See the
/// [module level documentation](index.html).
///
/// `Notifier` is cheap to clone; every clone refers to the same notifier.
#[derive(Clone)]
pub struct Notifier {
    inner: Rc<Primary>,
}

impl Notifier {
    /// Returns the current thread's notifier, creating it if need be.  The current
    /// thread is its primary thread.
    pub fn for_current_thread() -> Notifier {
        CURRENT.with(|current| {
            if let Some(inner) = current.borrow().upgrade() {
                return Notifier { inner };
            }

            let inner = Rc::new(Primary {
                shared: Arc::new(Shared::new()),
                local: RefCell::new(IndexMap::default()),
                next_local: Cell::new(1),
            });
            *current.borrow_mut() = Rc::downgrade(&inner);
            debug!(notifier = inner.shared.id, "notifier created");

            Notifier { inner }
        })
    }

    /// Returns the notifier currently registered for this thread, if any, without
    /// creating one.
    fn current() -> Option<Notifier> {
        CURRENT
            .try_with(|current| current.borrow().upgrade())
            .ok()
            .flatten()
            .map(|inner| Notifier { inner })
    }

    /// Returns a thread-safe handle that other threads can use to queue work.
    pub fn handle(&self) -> NotifierHandle {
        NotifierHandle {
            shared: self.inner.shared.clone(),
        }
    }

    /// The ID of the notifier's primary thread.
    pub fn primary_thread(&self) -> ThreadId {
        self.inner.shared.primary
    }

    /// Whether two handles refer to the same notifier.
    pub fn ptr_eq(&self, other: &Notifier) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.inner.shared
    }

    //--------------------------------------------------------------------------------------
    // Producing work

    /// Queues an event at the given position.
    ///
    /// # Panics
    ///
    /// Panics if the event is already queued, or if it is a local event belonging to a
    /// different notifier.
    pub fn queue_event(&self, event: &Arc<TclEvent>, position: QueuePosition) {
        // A live primary handle means the notifier hasn't been disposed.
        let _ = self.inner.shared.queue_event(event, position);
    }

    /// Creates an event whose processor need not be `Send`.  The event may only be
    /// queued on this notifier.
    pub fn local_event(&self, proc: impl FnMut(EventFlags) -> bool + 'static) -> Arc<TclEvent> {
        let id = self.store_local(LocalProc::Event(Box::new(proc)));
        TclEvent::with_body(EventBody::Local {
            notifier: self.inner.shared.id,
            id,
        })
    }

    /// Registers an idle callback that need not be `Send`, returning its handler so that
    /// it can be cancelled.
    pub fn idle(&self, callback: impl FnOnce() + 'static) -> Arc<IdleHandler> {
        let id = self.store_local(LocalProc::Idle(Box::new(callback)));
        let handler = IdleHandler::with_body(IdleBody::Local {
            notifier: self.inner.shared.id,
            id,
        });
        let _ = self.inner.shared.register_idle(&handler);
        handler
    }

    /// Registers an idle handler created with [`IdleHandler::new`].
    ///
    /// [`IdleHandler::new`]: struct.IdleHandler.html#method.new
    pub fn register_idle(&self, handler: &Arc<IdleHandler>) {
        let _ = self.inner.shared.register_idle(handler);
    }

    /// Removes a queued event without running it.  Returns whether it was found.  Any
    /// thread waiting on the event is released with `NotifierError::Disposed`.
    pub fn delete_event(&self, event: &Arc<TclEvent>) -> bool {
        if self.inner.shared.unlink_event(event) {
            event.discard();
            self.drop_local_event(event);
            true
        } else {
            false
        }
    }

    /// Removes every queued event for which the predicate returns true, returning the
    /// number removed.  Events currently being processed are left alone.
    pub fn delete_events(&self, mut predicate: impl FnMut(&Arc<TclEvent>) -> bool) -> usize {
        // The predicate runs without the queue lock, so it may use the notifier.
        let candidates: Vec<Arc<TclEvent>> = {
            let q = self.inner.shared.state.lock();
            q.events
                .iter()
                .filter(|e| !e.is_processing())
                .cloned()
                .collect()
        };

        let matches: Vec<Arc<TclEvent>> = candidates
            .into_iter()
            .filter(|event| predicate(event))
            .collect();

        let removed: Vec<Arc<TclEvent>> = {
            let mut q = self.inner.shared.state.lock();
            matches
                .into_iter()
                .filter(|event| !event.is_processing() && Shared::remove_event(&mut q, event))
                .collect()
        };

        for event in &removed {
            event.discard();
            self.drop_local_event(event);
        }

        removed.len()
    }

    /// Wakes the primary thread if it is blocked waiting for work.
    pub fn signal_waiters(&self) {
        self.inner.shared.signal_waiters();
    }

    //--------------------------------------------------------------------------------------
    // Introspection

    /// The number of events in the queue.
    pub fn pending_events(&self) -> usize {
        self.inner.shared.state.lock().events.len()
    }

    /// The number of registered idle handlers that have not yet fired.
    pub fn pending_idle(&self) -> usize {
        self.inner.shared.state.lock().idle.len()
    }

    /// The current idle generation.
    pub fn idle_generation(&self) -> u64 {
        self.inner.shared.state.lock().idle_generation
    }

    /// Whether any work could ever arrive: something is queued or registered, or some
    /// other thread holds a `NotifierHandle` through which it could queue more.
    pub fn has_event_sources(&self) -> bool {
        let shared = &self.inner.shared;
        let pending = {
            let q = shared.state.lock();
            !q.events.is_empty() || !q.idle.is_empty()
        };
        pending || Arc::strong_count(shared) > 1
    }

    //--------------------------------------------------------------------------------------
    // Servicing

    /// Does at most one unit of work without blocking: runs the first queued event that
    /// accepts processing, or, if no event ran and `flags` includes `IDLE_EVENTS`, makes
    /// one pass over the idle handlers.  Returns whether any work was done.
    ///
    /// Flags that select no kind of work are treated as `ALL_EVENTS`.
    ///
    /// # Panics
    ///
    /// The notifier may be serviced only by its primary thread; `Notifier` is `!Send`,
    /// so this can only fail if a handle is smuggled across threads.
    pub fn service_event(&self, flags: EventFlags) -> bool {
        assert!(
            self.inner.shared.is_primary_thread(),
            "notifier serviced from a thread other than its primary thread"
        );

        self.reap_released();

        let flags = if flags.has_event_types() {
            flags
        } else {
            flags | EventFlags::ALL_EVENTS
        };

        if self.service_queue(flags) {
            return true;
        }

        flags.contains(EventFlags::IDLE_EVENTS) && self.service_idle()
    }

    /// Does one unit of work, waiting for some to arrive if necessary.
    ///
    /// * With `EventFlags::DONT_WAIT`, this is the same as `service_event`.
    /// * Otherwise, if there is nothing to do, blocks until another thread queues work
    ///   or signals the notifier, and then tries again; if `timeout` is given, gives up
    ///   when it expires.
    ///
    /// Returns whether any work was done.
    pub fn do_one_event(&self, flags: EventFlags, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            if self.service_event(flags) {
                return true;
            }

            if flags.contains(EventFlags::DONT_WAIT) {
                return false;
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            self.wait_for_event(remaining);
        }
    }

    /// Blocks until some thread signals the notifier or the timeout expires.  Returns
    /// whether a signal was received.
    pub fn wait_for_event(&self, timeout: Option<Duration>) -> bool {
        let shared = &self.inner.shared;
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut q = shared.state.lock();

        while !q.alerted && !q.disposed {
            match deadline {
                Some(deadline) => {
                    if shared.wakeup.wait_until(&mut q, deadline).timed_out() {
                        break;
                    }
                }
                None => shared.wakeup.wait(&mut q),
            }
        }

        let alerted = q.alerted;
        q.alerted = false;
        alerted
    }

    /// Runs the first queued event that accepts processing.
    fn service_queue(&self, flags: EventFlags) -> bool {
        let shared = &self.inner.shared;
        let mut declined: Vec<*const TclEvent> = Vec::new();

        loop {
            let event = {
                let q = shared.state.lock();
                q.events
                    .iter()
                    .find(|e| !declined.contains(&Arc::as_ptr(e)) && e.begin_processing())
                    .cloned()
            };

            let event = match event {
                Some(event) => event,
                None => return false,
            };

            let mut guard = InFlight {
                shared,
                event: &event,
                armed: true,
            };
            let handled = self.run_event(&event, flags);
            guard.armed = false;

            if handled {
                shared.unlink_event(&event);
                event.finish();
                trace!(notifier = shared.id, "event processed");
                return true;
            }

            event.end_processing();
            declined.push(Arc::as_ptr(&event));
        }
    }

    fn run_event(&self, event: &Arc<TclEvent>, flags: EventFlags) -> bool {
        match event.take_body() {
            EventBody::Shared(mut proc) => {
                let handled = proc.process_event(flags);
                if !handled {
                    event.restore_body(EventBody::Shared(proc));
                }
                handled
            }
            EventBody::Local { notifier, id } => {
                let proc = self.take_local(id);
                match proc {
                    Some(LocalProc::Event(mut proc)) => {
                        let handled = proc(flags);
                        if !handled {
                            self.inner
                                .local
                                .borrow_mut()
                                .insert(id, LocalProc::Event(proc));
                            event.restore_body(EventBody::Local { notifier, id });
                        }
                        handled
                    }
                    _ => true,
                }
            }
            // Nothing left to run.
            EventBody::Empty => true,
        }
    }

    /// Fires, in order, every idle handler registered before this pass began.
    fn service_idle(&self) -> bool {
        let shared = &self.inner.shared;

        let start = {
            let mut q = shared.state.lock();
            if q.idle.is_empty() {
                return false;
            }
            let start = q.idle_generation;
            q.idle_generation += 1;
            start
        };

        let mut fired = false;

        loop {
            let handler = {
                let mut q = shared.state.lock();
                match q.idle.front() {
                    Some(h) if h.generation() <= start => q.idle.pop_front(),
                    _ => None,
                }
            };

            match handler {
                Some(handler) => {
                    if handler.invoke(self) {
                        fired = true;
                    }
                }
                None => break,
            }
        }

        fired
    }

    //--------------------------------------------------------------------------------------
    // Local callback storage

    fn store_local(&self, proc: LocalProc) -> u64 {
        let id = self.inner.next_local.get();
        self.inner.next_local.set(id + 1);
        self.inner.local.borrow_mut().insert(id, proc);
        id
    }

    fn take_local(&self, id: u64) -> Option<LocalProc> {
        self.inner.local.borrow_mut().shift_remove(&id)
    }

    pub(crate) fn take_local_idle(&self, id: u64) -> Option<Box<dyn FnOnce()>> {
        match self.take_local(id) {
            Some(LocalProc::Idle(callback)) => Some(callback),
            Some(other) => {
                // Not an idle callback; put it back.
                self.inner.local.borrow_mut().insert(id, other);
                None
            }
            None => None,
        }
    }

    fn drop_local_event(&self, event: &Arc<TclEvent>) {
        if let EventBody::Local { notifier, id } = event.take_body() {
            if notifier == self.inner.shared.id {
                self.take_local(id);
            }
        }
    }

    /// Drops the stored callback of a cancelled local idle handler.  Off the primary
    /// thread, the callback is left for the primary thread to drop on its next service
    /// call.
    pub(crate) fn release_local(shared: Option<&Arc<Shared>>, notifier: u64, id: u64) {
        if let Some(current) = Notifier::primary_for(notifier) {
            current.take_local(id);
        } else if let Some(shared) = shared {
            shared.release_local(id);
        }
    }

    fn reap_released(&self) {
        let ids = core::mem::take(&mut *self.inner.shared.released.lock());
        for id in ids {
            self.take_local(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn local_count(&self) -> usize {
        self.inner.local.borrow().len()
    }

    /// The primary handle for the notifier with the given ID, if this thread is its
    /// primary thread and it is still alive.
    pub(crate) fn primary_for(notifier: u64) -> Option<Notifier> {
        Notifier::current().filter(|n| n.inner.shared.id == notifier)
    }
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("id", &self.inner.shared.id)
            .field("primary", &self.inner.shared.primary)
            .finish()
    }
}

// Removes an event whose processor panicked, releasing any thread waiting on it.
struct InFlight<'a> {
    shared: &'a Arc<Shared>,
    event: &'a Arc<TclEvent>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.unlink_event(self.event);
            self.event.discard();
        }
    }
}

//------------------------------------------------------------------------------------------
// Cross-thread handle

/// A thread-safe handle to a notifier, used by threads other than the primary thread to
/// produce work for it.  See the [module level documentation](index.html).
#[derive(Clone)]
pub struct NotifierHandle {
    shared: Arc<Shared>,
}

impl NotifierHandle {
    /// Queues an event at the given position, waking the primary thread if this is
    /// another thread.
    ///
    /// # Panics
    ///
    /// Panics if the event is already queued, or if it is a local event.
    pub fn queue_event(
        &self,
        event: &Arc<TclEvent>,
        position: QueuePosition,
    ) -> Result<(), NotifierError> {
        self.shared.queue_event(event, position)
    }

    /// Registers an idle callback, waking the primary thread if this is another thread.
    pub fn idle(
        &self,
        callback: impl FnOnce() + Send + 'static,
    ) -> Result<Arc<IdleHandler>, NotifierError> {
        let handler = IdleHandler::new(callback);
        self.shared.register_idle(&handler)?;
        Ok(handler)
    }

    /// Registers an idle handler created with [`IdleHandler::new`].
    ///
    /// [`IdleHandler::new`]: struct.IdleHandler.html#method.new
    pub fn register_idle(&self, handler: &Arc<IdleHandler>) -> Result<(), NotifierError> {
        self.shared.register_idle(handler)
    }

    /// Wakes the primary thread if it is blocked waiting for work.
    pub fn signal_waiters(&self) {
        self.shared.signal_waiters();
    }

    /// Whether the calling thread is the notifier's primary thread.
    pub fn is_primary_thread(&self) -> bool {
        self.shared.is_primary_thread()
    }

    /// The ID of the notifier's primary thread.
    pub fn primary_thread(&self) -> ThreadId {
        self.shared.primary
    }
}

impl core::fmt::Debug for NotifierHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("NotifierHandle")
            .field("id", &self.shared.id)
            .field("primary", &self.shared.primary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_for_current_thread_is_shared() {
        let a = Notifier::for_current_thread();
        let b = Notifier::for_current_thread();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.primary_thread(), thread::current().id());
    }

    #[test]
    fn test_fifo_order() {
        let notifier = Notifier::for_current_thread();
        let log = recorder();

        for name in ["e1", "e2", "e3"] {
            let log = log.clone();
            let event = notifier.local_event(move |_| {
                log.borrow_mut().push(name.into());
                true
            });
            notifier.queue_event(&event, QueuePosition::Tail);
        }

        while notifier.service_event(EventFlags::ALL_EVENTS) {}

        assert_eq!(*log.borrow(), vec!["e1", "e2", "e3"]);
        assert_eq!(notifier.pending_events(), 0);
    }

    #[test]
    fn test_queue_positions() {
        let notifier = Notifier::for_current_thread();
        let log = recorder();

        let queue = |name: &'static str, pos| {
            let log = log.clone();
            let event = notifier.local_event(move |_| {
                log.borrow_mut().push(name.into());
                true
            });
            notifier.queue_event(&event, pos);
        };

        queue("tail1", QueuePosition::Tail);
        queue("mark1", QueuePosition::Mark);
        queue("mark2", QueuePosition::Mark);
        queue("head", QueuePosition::Head);
        queue("tail2", QueuePosition::Tail);

        while notifier.service_event(EventFlags::ALL_EVENTS) {}

        assert_eq!(
            *log.borrow(),
            vec!["head", "mark1", "mark2", "tail1", "tail2"]
        );
    }

    #[test]
    fn test_declined_event_stays_queued() {
        let notifier = Notifier::for_current_thread();
        let ready = Rc::new(Cell::new(false));
        let ran = Rc::new(Cell::new(0));

        let r = ready.clone();
        let n = ran.clone();
        let event = notifier.local_event(move |_| {
            if r.get() {
                n.set(n.get() + 1);
                true
            } else {
                false
            }
        });
        notifier.queue_event(&event, QueuePosition::Tail);

        assert!(!notifier.service_event(EventFlags::ALL_EVENTS));
        assert_eq!(notifier.pending_events(), 1);

        ready.set(true);
        assert!(notifier.service_event(EventFlags::ALL_EVENTS));
        assert_eq!(ran.get(), 1);
        assert!(event.is_processed());
    }

    #[test]
    fn test_idle_runs_only_without_events() {
        let notifier = Notifier::for_current_thread();
        let log = recorder();

        let l = log.clone();
        notifier.idle(move || l.borrow_mut().push("idle".into()));

        let l = log.clone();
        let event = notifier.local_event(move |_| {
            l.borrow_mut().push("event".into());
            true
        });
        notifier.queue_event(&event, QueuePosition::Tail);

        assert!(notifier.service_event(EventFlags::ALL_EVENTS));
        assert_eq!(*log.borrow(), vec!["event"]);

        assert!(notifier.service_event(EventFlags::ALL_EVENTS));
        assert_eq!(*log.borrow(), vec!["event", "idle"]);

        assert!(!notifier.service_event(EventFlags::ALL_EVENTS));
    }

    #[test]
    fn test_idle_flag_required() {
        let notifier = Notifier::for_current_thread();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        notifier.idle(move || f.set(true));

        assert!(!notifier.service_event(EventFlags::FILE_EVENTS));
        assert!(!fired.get());
        assert!(notifier.service_event(EventFlags::IDLE_EVENTS));
        assert!(fired.get());
    }

    #[test]
    fn test_idle_generation_fence() {
        let notifier = Notifier::for_current_thread();
        let log = recorder();

        {
            let log = log.clone();
            let n = notifier.clone();
            notifier.idle(move || {
                log.borrow_mut().push("h1".into());
                let log = log.clone();
                n.idle(move || log.borrow_mut().push("late".into()));
            });
        }
        for name in ["h2", "h3"] {
            let log = log.clone();
            notifier.idle(move || log.borrow_mut().push(name.into()));
        }

        assert!(notifier.service_event(EventFlags::IDLE_EVENTS));
        assert_eq!(*log.borrow(), vec!["h1", "h2", "h3"]);
        assert_eq!(notifier.pending_idle(), 1);

        assert!(notifier.service_event(EventFlags::IDLE_EVENTS));
        assert_eq!(*log.borrow(), vec!["h1", "h2", "h3", "late"]);
        assert_eq!(notifier.pending_idle(), 0);
    }

    #[test]
    fn test_delete_events() {
        let notifier = Notifier::for_current_thread();
        let ran = Rc::new(Cell::new(0));

        let mut events = Vec::new();
        for _ in 0..3 {
            let r = ran.clone();
            let event = notifier.local_event(move |_| {
                r.set(r.get() + 1);
                true
            });
            notifier.queue_event(&event, QueuePosition::Tail);
            events.push(event);
        }

        let victim = events[1].clone();
        assert_eq!(notifier.delete_events(|e| Arc::ptr_eq(e, &victim)), 1);
        assert!(!notifier.delete_event(&victim));
        assert!(notifier.delete_event(&events[2]));

        while notifier.service_event(EventFlags::ALL_EVENTS) {}
        assert_eq!(ran.get(), 1);
        assert_eq!(events[1].sync(), Err(NotifierError::Disposed));
    }

    #[test]
    fn test_delete_events_predicate_may_use_notifier() {
        let notifier = Notifier::for_current_thread();

        for _ in 0..2 {
            let event = notifier.local_event(|_| true);
            notifier.queue_event(&event, QueuePosition::Tail);
        }

        let late = notifier.local_event(|_| true);
        let mut queued_late = false;
        let removed = notifier.delete_events(|_| {
            assert!(notifier.pending_events() >= 2);
            if !queued_late {
                notifier.queue_event(&late, QueuePosition::Tail);
                queued_late = true;
            }
            true
        });

        // Only the events queued before the call were candidates.
        assert_eq!(removed, 2);
        assert_eq!(notifier.pending_events(), 1);
        assert!(notifier.service_event(EventFlags::ALL_EVENTS));
        assert!(late.is_processed());
    }

    #[test]
    fn test_do_one_event_dont_wait() {
        let notifier = Notifier::for_current_thread();
        assert!(!notifier.do_one_event(EventFlags::ALL_EVENTS | EventFlags::DONT_WAIT, None));
    }

    #[test]
    fn test_do_one_event_times_out() {
        let notifier = Notifier::for_current_thread();
        let start = Instant::now();
        assert!(!notifier.do_one_event(EventFlags::ALL_EVENTS, Some(Duration::from_millis(20))));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_handle_queue_after_dispose_fails() {
        let (tx, rx) = std::sync::mpsc::channel();

        // The notifier lives and dies on its own thread.
        std::thread::spawn(move || {
            let notifier = Notifier::for_current_thread();
            tx.send(notifier.handle()).unwrap();
        })
        .join()
        .unwrap();

        let handle = rx.recv().unwrap();
        let event = TclEvent::new(|_: EventFlags| true);
        assert_eq!(
            handle.queue_event(&event, QueuePosition::Tail),
            Err(NotifierError::Disposed)
        );
        assert!(handle.idle(|| ()).is_err());
    }

    #[test]
    fn test_flags() {
        assert!(EventFlags::ALL_EVENTS.contains(EventFlags::IDLE_EVENTS));
        assert!(!EventFlags::ALL_EVENTS.contains(EventFlags::DONT_WAIT));
        assert!(!EventFlags::empty().has_event_types());
        assert!(EventFlags::DONT_WAIT.bits() != 0);
    }
}
