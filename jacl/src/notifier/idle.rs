//! Idle handlers.

use super::{Notifier, Shared};
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::cell::RefCell;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::{Mutex, ReentrantMutex};

pub(crate) enum IdleBody {
    Shared(Box<dyn FnOnce() + Send>),
    // A callback stored on the primary thread of the given notifier.
    Local { notifier: u64, id: u64 },
    Empty,
}

struct IdleState {
    cancelled: bool,
    fired: bool,
}

/// A one-shot callback run by a notifier when it has no events to process.
///
/// An idle handler fires at most once.  [`cancel`](#method.cancel) may be called from any
/// thread at any time; if the callback is running on the primary thread at that moment,
/// `cancel` waits for it to finish.  Cancelling twice, or cancelling a handler that has
/// already fired, does nothing.
pub struct IdleHandler {
    lock: ReentrantMutex<RefCell<IdleState>>,
    generation: AtomicU64,
    notifier: Mutex<Weak<Shared>>,
    body: Mutex<IdleBody>,
}

impl IdleHandler {
    /// Creates an unregistered idle handler.  Register it with
    /// [`Notifier::register_idle`](struct.Notifier.html#method.register_idle) or
    /// [`NotifierHandle::register_idle`](struct.NotifierHandle.html#method.register_idle).
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Arc<IdleHandler> {
        Self::with_body(IdleBody::Shared(Box::new(callback)))
    }

    pub(crate) fn with_body(body: IdleBody) -> Arc<IdleHandler> {
        Arc::new(IdleHandler {
            lock: ReentrantMutex::new(RefCell::new(IdleState {
                cancelled: false,
                fired: false,
            })),
            generation: AtomicU64::new(0),
            notifier: Mutex::new(Weak::new()),
            body: Mutex::new(body),
        })
    }

    /// The idle generation in which the handler was registered.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Whether the handler has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.lock.lock().borrow().cancelled
    }

    /// Whether the handler's callback has run.
    pub fn has_fired(&self) -> bool {
        self.lock.lock().borrow().fired
    }

    /// Cancels the handler, removing it from its notifier's idle list.
    pub fn cancel(&self) {
        let guard = self.lock.lock();
        {
            let mut state = guard.borrow_mut();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
        }

        let shared = self.notifier.lock().upgrade();
        if let Some(shared) = &shared {
            shared.unlink_idle(self);
        }

        let body = core::mem::replace(&mut *self.body.lock(), IdleBody::Empty);
        if let IdleBody::Local { notifier, id } = body {
            Notifier::release_local(shared.as_ref(), notifier, id);
        }
    }

    /// Records registration on a notifier in the given generation.  Called with the
    /// notifier's queue lock held.
    pub(crate) fn attach(&self, shared: &Arc<Shared>, generation: u64) {
        if let IdleBody::Local { notifier, .. } = &*self.body.lock() {
            assert!(
                *notifier == shared.id(),
                "a local idle handler can only be registered on its own notifier"
            );
        }
        self.generation.store(generation, Ordering::Release);
        *self.notifier.lock() = Arc::downgrade(shared);
    }

    /// Runs the callback, unless the handler has been cancelled or has already fired.
    /// Returns whether the callback ran.
    pub(crate) fn invoke(&self, notifier: &Notifier) -> bool {
        let guard = self.lock.lock();
        {
            let mut state = guard.borrow_mut();
            if state.cancelled || state.fired {
                return false;
            }
            state.fired = true;
        }

        let body = core::mem::replace(&mut *self.body.lock(), IdleBody::Empty);

        // The lock stays held while the callback runs, so that a concurrent cancel
        // waits for it.
        match body {
            IdleBody::Shared(callback) => callback(),
            IdleBody::Local { id, .. } => {
                if let Some(callback) = notifier.take_local_idle(id) {
                    callback();
                }
            }
            IdleBody::Empty => (),
        }

        drop(guard);
        true
    }

    /// Drops the handler when its notifier is torn down.
    pub(crate) fn discard(&self) {
        let guard = self.lock.lock();
        guard.borrow_mut().cancelled = true;
        let body = core::mem::replace(&mut *self.body.lock(), IdleBody::Empty);
        drop(guard);
        drop(body);
    }
}

impl core::fmt::Debug for IdleHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let guard = self.lock.lock();
        let state = guard.borrow();
        f.debug_struct("IdleHandler")
            .field("generation", &self.generation())
            .field("cancelled", &state.cancelled)
            .field("fired", &state.fired)
            .finish()
    }
}
