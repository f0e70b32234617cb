use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use threadvisor::{Registry, TaskBuilder, TaskError, TaskStatus};

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
fn test_wait_for_result_returns_value() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("answer")
        .registry(private_registry())
        .spawn_once(|_token| Ok::<_, TaskError>(42))
        .unwrap();

    let outcome = task.wait_for_result(Some(Duration::from_secs(1))).unwrap();
    assert_eq!(outcome.value, Some(42));
    assert!(outcome.success());
    assert_eq!(task.status(), TaskStatus::Finished);
    assert!(task.is_completed());
}

#[test]
fn test_wait_for_result_times_out_then_stop_succeeds() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("slow")
        .registry(private_registry())
        .spawn_once(|token| {
            // Nominally a ten-second job; polls the token so a stop
            // request interrupts the sleep.
            for _ in 0..1000 {
                if token.wait_for(Duration::from_millis(10)) {
                    break;
                }
            }
            Ok::<_, TaskError>(())
        })
        .unwrap();

    let err = task
        .wait_for_result(Some(Duration::from_millis(100)))
        .unwrap_err();
    assert_eq!(err.as_label(), "wait_timeout");

    // Still running; a forced stop request must return without error.
    assert!(task.stop(true, Duration::from_secs(1)));
    assert!(task.status().is_terminal());
}

#[test]
fn test_error_is_visible_in_outcome() {
    init_tracing();
    let handled = Arc::new(AtomicUsize::new(0));
    let task = TaskBuilder::new()
        .name("broken")
        .registry(private_registry())
        .on_error({
            let handled = handled.clone();
            move |_err| {
                handled.fetch_add(1, Ordering::SeqCst);
            }
        })
        .spawn_once(|_token| Err::<u32, _>(TaskError::fail("boom")))
        .unwrap();

    let outcome = task.wait_for_result(Some(Duration::from_secs(1))).unwrap();
    assert_eq!(task.status(), TaskStatus::Error);
    assert_eq!(handled.load(Ordering::SeqCst), 1);
    assert!(outcome.error.is_some());
    assert!(!outcome.success());
    assert_eq!(outcome.value, None);
}

#[test]
fn test_wait_for_result_is_broadcast() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("shared")
        .registry(private_registry())
        .spawn_once(|_token| {
            thread::sleep(Duration::from_millis(30));
            Ok::<_, TaskError>("ready")
        })
        .unwrap();

    thread::scope(|scope| {
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                scope.spawn(|| {
                    task.wait_for_result(Some(Duration::from_secs(1)))
                        .unwrap()
                        .value
                })
            })
            .collect();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Some("ready"));
        }
    });

    // And again after completion: the latch stays open.
    let outcome = task.wait_for_result(Some(Duration::from_millis(1))).unwrap();
    assert_eq!(outcome.value, Some("ready"));
}

#[test]
fn test_panic_ends_in_error() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("explodes")
        .registry(private_registry())
        .spawn_once(|_token| -> Result<(), TaskError> { panic!("unexpected") })
        .unwrap();

    let outcome = task.wait_for_result(Some(Duration::from_secs(1))).unwrap();
    assert_eq!(task.status(), TaskStatus::Error);
    assert!(outcome.error.as_ref().is_some_and(|e| e.is_panic()));
}

#[test]
fn test_join_without_bound() {
    init_tracing();
    let task = TaskBuilder::new()
        .name("quick")
        .registry(private_registry())
        .spawn_once(|_token| Ok::<_, TaskError>(7))
        .unwrap();

    assert!(task.join(None));
    assert_eq!(task.status(), TaskStatus::Finished);
    assert_eq!(task.outcome().value, Some(7));
}
