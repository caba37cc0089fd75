//! Process-wide registry and hook slot behavior.
//!
//! These tests share the global registry, so they serialize on `TEST_LOCK`.

use std::sync::Arc;
use std::sync::Mutex;

use exitreg_core::{
    Args, HandlerFailure, fire_process_hook, global_registry, process_hook_slot, register,
    register_fn, run_pending,
};

static TEST_LOCK: Mutex<()> = Mutex::new(());

type Trace = Arc<parking_lot::Mutex<Vec<String>>>;

fn push(trace: &Trace, name: &'static str) -> impl Fn(&Args) -> Result<(), HandlerFailure> + use<> {
    let trace = Arc::clone(trace);
    move |_: &Args| {
        trace.lock().push(name.to_string());
        Ok(())
    }
}

#[test]
fn global_registry_is_a_singleton() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let a = global_registry();
    let b = global_registry();
    assert!(Arc::ptr_eq(a, b));
}

#[test]
fn free_functions_drain_global_registry_lifo() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    global_registry().clear();
    let trace = Trace::default();

    register_fn(push(&trace, "a"), Args::none());
    let handler = register(Arc::new(push(&trace, "b")), Args::none());
    register(handler, Args::none());

    run_pending().unwrap();
    assert_eq!(*trace.lock(), vec!["b", "b", "a"]);
    run_pending().unwrap();
    assert_eq!(trace.lock().len(), 3);
}

#[test]
fn global_registry_reentrant_registration() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    global_registry().clear();
    let trace = Trace::default();

    let inner_trace = Arc::clone(&trace);
    register_fn(
        move |_: &Args| {
            inner_trace.lock().push("outer".to_string());
            register_fn(push(&inner_trace, "inner"), Args::none());
            Ok(())
        },
        Args::none(),
    );

    run_pending().unwrap();
    assert_eq!(*trace.lock(), vec!["outer", "inner"]);
    assert!(global_registry().is_empty());
}

#[test]
fn process_hook_fires_global_drain_once() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // Attach (idempotent) before touching the slot.
    let registry = global_registry();
    registry.clear();

    // Re-arm the slot for this test: the global registry attached on first use.
    {
        let mut slot = process_hook_slot().lock();
        slot.take();
        registry.attach(&mut slot);
    }

    let trace = Trace::default();
    register_fn(push(&trace, "first"), Args::none());
    register_fn(
        |_: &Args| Err(HandlerFailure::exit(5)),
        Args::none(),
    );

    let err = fire_process_hook().unwrap_err();
    assert_eq!(err.exit_status(), Some(5));
    assert_eq!(*trace.lock(), vec!["first"]);

    // Slot is spent; the registry stays usable.
    register_fn(push(&trace, "late"), Args::none());
    fire_process_hook().unwrap();
    assert_eq!(trace.lock().len(), 1);
    registry.clear();
}
