use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use threadvisor::{Registry, Signal, TaskBuilder, TaskError, TaskStatus};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("threadvisor=debug"))
            .with_test_writer()
            .try_init();
    });
}

fn private_registry() -> Arc<Registry> {
    Arc::new(Registry::new())
}

#[test]
fn test_basic_start_stop() {
    init_tracing();
    let counter = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("basic")
        .registry(private_registry())
        .spawn_repeating({
            let counter = counter.clone();
            move |_token| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(Signal::Continue(()))
            }
        })
        .unwrap();

    thread::sleep(Duration::from_millis(100));
    assert!(task.stop(false, Duration::from_secs(1)));

    assert!(counter.load(Ordering::SeqCst) > 0);
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert!(!task.is_alive());
}

#[test]
fn test_pause_and_resume() {
    init_tracing();
    let counter = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("pausable")
        .registry(private_registry())
        .interval(Duration::from_millis(5))
        .spawn_repeating({
            let counter = counter.clone();
            move |_token| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(Signal::Continue(()))
            }
        })
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert!(task.pause());
    assert_eq!(task.status(), TaskStatus::Paused);

    // Let any in-flight iteration drain before sampling.
    thread::sleep(Duration::from_millis(30));
    let paused_at = counter.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(60));
    assert_eq!(counter.load(Ordering::SeqCst), paused_at);
    assert_eq!(task.status(), TaskStatus::Paused);

    assert!(task.resume());
    thread::sleep(Duration::from_millis(60));
    assert!(counter.load(Ordering::SeqCst) > paused_at);

    task.stop(false, Duration::from_secs(1));
}

#[test]
fn test_pause_when_not_running_is_noop() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("not-started")
        .registry(private_registry())
        .build_repeating(|_token| Ok::<_, TaskError>(Signal::Continue(())));

    assert!(!task.pause());
    assert_eq!(task.status(), TaskStatus::Created);
    assert!(!task.resume());
    assert_eq!(task.status(), TaskStatus::Created);
}

#[test]
fn test_stop_signal_ends_loop_after_exact_count() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("limited")
        .registry(private_registry())
        .spawn_repeating({
            let calls = calls.clone();
            move |_token| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= 3 {
                    Ok::<_, TaskError>(Signal::Stop(n))
                } else {
                    Ok(Signal::Continue(n))
                }
            }
        })
        .unwrap();

    assert!(task.join(Some(Duration::from_secs(1))));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(task.status(), TaskStatus::Stopped);

    let outcome = task.outcome();
    assert_eq!(outcome.value, Some(3));
    assert!(outcome.success());
}

#[test]
fn test_double_stop_is_idempotent() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("twice")
        .registry(private_registry())
        .spawn_repeating(|_token| Ok::<_, TaskError>(Signal::Continue(())))
        .unwrap();

    assert!(task.stop(false, Duration::from_secs(1)));
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert!(task.stop(false, Duration::from_secs(1)));
    assert_eq!(task.status(), TaskStatus::Stopped);
}

#[test]
fn test_stop_on_error_invokes_handler_once() {
    init_tracing();
    let handled = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("failing")
        .registry(private_registry())
        .stop_on_error(true)
        .on_error({
            let handled = handled.clone();
            move |_err| {
                handled.fetch_add(1, Ordering::SeqCst);
            }
        })
        .spawn_repeating(|_token| Err::<Signal<()>, _>(TaskError::fail("bad value")))
        .unwrap();

    assert!(task.join(Some(Duration::from_secs(1))));
    assert_eq!(handled.load(Ordering::SeqCst), 1);
    assert_eq!(task.status(), TaskStatus::Error);

    let outcome = task.outcome();
    assert!(!outcome.success());
    assert!(outcome.error.is_some());
}

#[test]
fn test_errors_without_stop_on_error_keep_looping() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("flaky")
        .registry(private_registry())
        .interval(Duration::from_millis(1))
        .spawn_repeating({
            let calls = calls.clone();
            move |_token| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Signal<()>, _>(TaskError::fail("transient"))
            }
        })
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert!(!task.status().is_terminal());
    assert!(calls.load(Ordering::SeqCst) > 1);

    assert!(task.stop(false, Duration::from_secs(1)));
    assert_eq!(task.status(), TaskStatus::Stopped);
    // The last error stays visible even though the stop was clean.
    assert!(!task.outcome().success());
}

#[test]
fn test_panic_is_captured_not_propagated() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("panicky")
        .registry(private_registry())
        .stop_on_error(true)
        .spawn_repeating(|_token| -> Result<Signal<()>, TaskError> { panic!("kaboom") })
        .unwrap();

    assert!(task.join(Some(Duration::from_secs(1))));
    assert_eq!(task.status(), TaskStatus::Error);
    let outcome = task.outcome();
    assert!(outcome.error.as_ref().is_some_and(|e| e.is_panic()));
}

#[test]
fn test_double_start_fails() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("started-twice")
        .registry(private_registry())
        .spawn_repeating(|_token| Ok::<_, TaskError>(Signal::Continue(())))
        .unwrap();

    let err = task.start().unwrap_err();
    assert_eq!(err.as_label(), "already_started");

    task.stop(false, Duration::from_secs(1));
}

#[test]
fn test_drop_stops_non_daemon_task() {
    init_tracing();
    let registry = private_registry();
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let _task = TaskBuilder::new()
            .name("scoped")
            .registry(registry.clone())
            .interval(Duration::from_millis(1))
            .spawn_repeating({
                let counter = counter.clone();
                move |_token| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(Signal::Continue(()))
                }
            })
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        // Leaving the block stops the task.
    }

    assert!(registry.get("scoped").is_none());
    let frozen = counter.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(counter.load(Ordering::SeqCst), frozen);
}

#[test]
fn test_stop_interrupts_interval_sleep() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("long-interval")
        .registry(private_registry())
        .interval(Duration::from_secs(60))
        .spawn_repeating(|_token| Ok::<_, TaskError>(Signal::Continue(())))
        .unwrap();

    // The first pass finishes quickly, then the worker sleeps for a
    // minute; stop must wake it well within the bound.
    thread::sleep(Duration::from_millis(20));
    assert!(task.stop(false, Duration::from_secs(1)));
    assert_eq!(task.status(), TaskStatus::Stopped);
}
