//! Queued events.

use super::{EventFlags, Notifier, Shared};
use crate::error::NotifierError;
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use parking_lot::{Condvar, Mutex};

/// The work done by an event when the notifier processes it.
///
/// `process_event` returns `true` if the event was handled, in which case it is removed
/// from the queue, or `false` to leave it queued for a later pass.  Any
/// `FnMut(EventFlags) -> bool` closure that is `Send` is an `EventProc`.
pub trait EventProc: Send + 'static {
    fn process_event(&mut self, flags: EventFlags) -> bool;
}

impl<F> EventProc for F
where
    F: FnMut(EventFlags) -> bool + Send + 'static,
{
    fn process_event(&mut self, flags: EventFlags) -> bool {
        self(flags)
    }
}

pub(crate) enum EventBody {
    Shared(Box<dyn EventProc>),
    // A processor stored on the primary thread of the given notifier.
    Local { notifier: u64, id: u64 },
    Empty,
}

struct EventState {
    notifier: Option<Weak<Shared>>,
    queued: bool,
    processing: bool,
    processed: bool,
    discarded: bool,
    needs_notify: bool,
}

/// A unit of work queued on a [`Notifier`](struct.Notifier.html).
///
/// An event is queued at most once.  After it has been processed, threads blocked in
/// [`sync`](#method.sync) are released.
pub struct TclEvent {
    state: Mutex<EventState>,
    done: Condvar,
    body: Mutex<EventBody>,
}

impl TclEvent {
    /// Creates an event that runs the given processor.  The event may be queued from
    /// any thread.
    pub fn new(proc: impl EventProc) -> Arc<TclEvent> {
        Self::with_body(EventBody::Shared(Box::new(proc)))
    }

    pub(crate) fn with_body(body: EventBody) -> Arc<TclEvent> {
        Arc::new(TclEvent {
            state: Mutex::new(EventState {
                notifier: None,
                queued: false,
                processing: false,
                processed: false,
                discarded: false,
                needs_notify: false,
            }),
            done: Condvar::new(),
            body: Mutex::new(body),
        })
    }

    /// Whether the event has been processed.
    pub fn is_processed(&self) -> bool {
        self.state.lock().processed
    }

    /// Whether the event was removed from its queue without being processed.
    pub fn is_discarded(&self) -> bool {
        self.state.lock().discarded
    }

    /// Whether the event's processor is running right now.
    pub fn is_processing(&self) -> bool {
        self.state.lock().processing
    }

    /// Waits until the event has been processed.
    ///
    /// Called on the notifier's primary thread, this services the notifier until the
    /// event has run; on any other thread, it blocks until the primary thread has run
    /// it.  Returns `NotifierError::Disposed` if the event was discarded instead: deleted
    /// from the queue, or dropped when the notifier was torn down.
    ///
    /// # Panics
    ///
    /// Panics if the event has never been queued.
    pub fn sync(&self) -> Result<(), NotifierError> {
        let shared = {
            let state = self.state.lock();
            assert!(state.queued, "sync called on an event that was never queued");
            state.notifier.as_ref().and_then(|w| w.upgrade())
        };

        match shared {
            Some(shared) if shared.is_primary_thread() => {
                let notifier = match Notifier::primary_for(shared.id()) {
                    Some(notifier) => notifier,
                    None => return self.outcome(),
                };
                drop(shared);

                loop {
                    {
                        let state = self.state.lock();
                        if state.processed || state.discarded {
                            break;
                        }
                    }
                    notifier.do_one_event(EventFlags::ALL_EVENTS, None);
                }

                self.outcome()
            }
            _ => {
                let mut state = self.state.lock();
                state.needs_notify = true;
                while !state.processed && !state.discarded {
                    self.done.wait(&mut state);
                }
                if state.processed {
                    Ok(())
                } else {
                    Err(NotifierError::Disposed)
                }
            }
        }
    }

    fn outcome(&self) -> Result<(), NotifierError> {
        if self.state.lock().processed {
            Ok(())
        } else {
            Err(NotifierError::Disposed)
        }
    }

    //--------------------------------------------------------------------------------------
    // Notifier side

    /// Records that the event is now queued on the given notifier.
    pub(crate) fn claim(&self, shared: &Arc<Shared>) {
        if let EventBody::Local { notifier, .. } = &*self.body.lock() {
            assert!(
                *notifier == shared.id(),
                "a local event can only be queued on its own notifier"
            );
        }

        let mut state = self.state.lock();
        assert!(!state.queued, "event is already queued");
        state.queued = true;
        state.notifier = Some(Arc::downgrade(shared));
    }

    /// Marks the event as being processed, unless it already is or is finished.
    pub(crate) fn begin_processing(&self) -> bool {
        let mut state = self.state.lock();
        if state.processing || state.processed || state.discarded {
            false
        } else {
            state.processing = true;
            true
        }
    }

    pub(crate) fn end_processing(&self) {
        self.state.lock().processing = false;
    }

    pub(crate) fn take_body(&self) -> EventBody {
        core::mem::replace(&mut *self.body.lock(), EventBody::Empty)
    }

    pub(crate) fn restore_body(&self, body: EventBody) {
        *self.body.lock() = body;
    }

    /// Marks the event processed and releases any waiters.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock();
        state.processing = false;
        state.processed = true;
        if state.needs_notify {
            self.done.notify_all();
        }
    }

    /// Marks the event discarded and releases any waiters.
    pub(crate) fn discard(&self) {
        {
            let mut body = self.body.lock();
            if let EventBody::Shared(_) = &*body {
                *body = EventBody::Empty;
            }
        }

        let mut state = self.state.lock();
        state.processing = false;
        state.discarded = true;
        self.done.notify_all();
    }
}

impl core::fmt::Debug for TclEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TclEvent")
            .field("queued", &state.queued)
            .field("processing", &state.processing)
            .field("processed", &state.processed)
            .field("discarded", &state.discarded)
            .finish()
    }
}
