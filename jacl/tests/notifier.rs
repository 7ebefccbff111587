//! Notifier scheduling: event order, idle generations, and cross-thread wakeups.

use parking_lot::Mutex;
use rejacl::{EventFlags, Interp, Notifier, QueuePosition, TclEvent};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn idle_generation_fence() {
    let notifier = Notifier::for_current_thread();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let log = fired.clone();
    notifier.idle(move || {
        log.borrow_mut().push(1);
        let log = log.clone();
        Notifier::for_current_thread().idle(move || log.borrow_mut().push(4));
    });
    for i in 2..=3 {
        let log = fired.clone();
        notifier.idle(move || log.borrow_mut().push(i));
    }

    assert!(notifier.service_event(EventFlags::IDLE_EVENTS));
    assert_eq!(*fired.borrow(), vec![1, 2, 3]);
    assert_eq!(notifier.pending_idle(), 1);

    assert!(notifier.service_event(EventFlags::IDLE_EVENTS));
    assert_eq!(*fired.borrow(), vec![1, 2, 3, 4]);
    assert!(!notifier.service_event(EventFlags::IDLE_EVENTS));
}

#[test]
fn events_run_in_order_and_sync_waits_for_its_event() {
    let notifier = Notifier::for_current_thread();
    let log = Arc::new(Mutex::new(Vec::new()));

    let events: Vec<Arc<TclEvent>> = (1..=3)
        .map(|i| {
            let log = log.clone();
            TclEvent::new(move |_flags: EventFlags| {
                log.lock().push(i);
                true
            })
        })
        .collect();

    let handle = notifier.handle();
    let worker_events = events.clone();
    let worker_log = log.clone();
    let worker = thread::spawn(move || {
        for event in &worker_events {
            handle.queue_event(event, QueuePosition::Tail).expect("queue");
        }
        worker_events[1].sync().expect("sync");
        let seen = worker_log.lock().clone();
        seen
    });

    while !worker.is_finished() {
        notifier.do_one_event(EventFlags::ALL_EVENTS, Some(Duration::from_millis(50)));
    }
    let seen = worker.join().expect("worker");
    assert!(seen.starts_with(&[1, 2]));

    while notifier.service_event(EventFlags::ALL_EVENTS) {}
    assert_eq!(*log.lock(), vec![1, 2, 3]);
    assert!(events.iter().all(|e| e.is_processed()));
}

#[test]
fn idle_from_another_thread_wakes_primary() {
    let notifier = Notifier::for_current_thread();
    let fired = Arc::new(AtomicBool::new(false));

    let handle = notifier.handle();
    let flag = fired.clone();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle
            .idle(move || flag.store(true, Ordering::SeqCst))
            .expect("idle");
    });

    let start = Instant::now();
    let did_work = notifier.do_one_event(EventFlags::ALL_EVENTS, Some(Duration::from_secs(10)));
    worker.join().expect("worker");

    assert!(did_work);
    assert!(fired.load(Ordering::SeqCst));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn event_from_another_thread_wakes_primary() {
    let notifier = Notifier::for_current_thread();
    let ran = Arc::new(AtomicBool::new(false));

    let handle = notifier.handle();
    let flag = ran.clone();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        let event = TclEvent::new(move |_flags: EventFlags| {
            flag.store(true, Ordering::SeqCst);
            true
        });
        handle.queue_event(&event, QueuePosition::Tail).expect("queue");
    });

    let start = Instant::now();
    while !ran.load(Ordering::SeqCst) {
        assert!(start.elapsed() < Duration::from_secs(5), "primary was never woken");
        notifier.do_one_event(EventFlags::ALL_EVENTS, Some(Duration::from_secs(10)));
    }
    worker.join().expect("worker");
}

#[test]
fn vwait_on_work_from_another_thread() {
    let interp = Interp::new();
    let handle = interp.notifier().handle();

    // The worker can't touch the interpreter; it asks the primary thread to.
    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        flag.store(true, Ordering::SeqCst);
        handle.signal_waiters();
    });

    let weak = interp.downgrade();
    let poll = done.clone();
    let event = interp.notifier().local_event(move |_flags| {
        if !poll.load(Ordering::SeqCst) {
            return false;
        }
        if let Some(interp) = weak.upgrade() {
            interp.set_scalar("result", "from worker".into());
        }
        true
    });
    interp.notifier().queue_event(&event, QueuePosition::Tail);

    assert_eq!(interp.eval_command("vwait result").map(|_| ()), Ok(()));
    assert_eq!(interp.scalar("result").expect("set").as_str(), "from worker");
    worker.join().expect("worker");
    interp.dispose();
}
