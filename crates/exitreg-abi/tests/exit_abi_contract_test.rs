//! Integration tests for the exit-handler ABI surface.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use exitreg_abi::{exitreg_atexit, exitreg_install, exitreg_run_pending, is_installed};
use exitreg_core::{Args, HandlerFailure, global_registry, register_fn};

static TEST_LOCK: Mutex<()> = Mutex::new(());
static ORDER: Mutex<Vec<u8>> = Mutex::new(Vec::new());
static CALLS: AtomicUsize = AtomicUsize::new(0);

fn record(tag: u8) {
    CALLS.fetch_add(1, Ordering::SeqCst);
    ORDER.lock().unwrap_or_else(|e| e.into_inner()).push(tag);
}

unsafe extern "C" fn handler_a() {
    record(b'a');
}

unsafe extern "C" fn handler_b() {
    record(b'b');
}

unsafe extern "C" fn handler_c() {
    record(b'c');
}

fn reset() {
    global_registry().clear();
    CALLS.store(0, Ordering::SeqCst);
    ORDER.lock().unwrap_or_else(|e| e.into_inner()).clear();
}

fn order() -> Vec<u8> {
    ORDER.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

#[test]
fn c_handlers_run_in_reverse_registration_order() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    // SAFETY: all three are valid zero-argument extern "C" functions.
    unsafe {
        assert_eq!(exitreg_atexit(Some(handler_a)), 0);
        assert_eq!(exitreg_atexit(Some(handler_b)), 0);
        assert_eq!(exitreg_atexit(Some(handler_c)), 0);
    }

    assert_eq!(exitreg_run_pending(), 0);
    assert_eq!(order(), b"cba".to_vec());
    assert_eq!(CALLS.load(Ordering::SeqCst), 3);
}

#[test]
fn drain_on_empty_registry_returns_zero() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    assert_eq!(exitreg_run_pending(), 0);
    assert_eq!(exitreg_run_pending(), 0);
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn termination_request_status_is_returned() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    // SAFETY: valid zero-argument extern "C" function.
    unsafe {
        exitreg_atexit(Some(handler_a));
    }
    register_fn(|_: &Args| Err(HandlerFailure::exit(3)), Args::none());

    assert_eq!(exitreg_run_pending(), 3);
    assert_eq!(order(), b"a".to_vec());
}

#[test]
fn handler_error_maps_to_minus_one_and_drain_continues() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    // SAFETY: valid zero-argument extern "C" functions.
    unsafe {
        exitreg_atexit(Some(handler_a));
    }
    register_fn(
        |_: &Args| Err(HandlerFailure::error("AbiTest", "expected failure")),
        Args::none(),
    );
    // SAFETY: valid zero-argument extern "C" function.
    unsafe {
        exitreg_atexit(Some(handler_b));
    }

    assert_eq!(exitreg_run_pending(), -1);
    assert_eq!(order(), b"ba".to_vec());
}

#[test]
fn install_is_idempotent() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    assert_eq!(exitreg_install(), 0);
    assert_eq!(exitreg_install(), 0);
}

#[test]
fn c_registration_installs_trampoline() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    // SAFETY: valid zero-argument extern "C" function.
    assert_eq!(unsafe { exitreg_atexit(Some(handler_a)) }, 0);
    assert!(is_installed());

    assert_eq!(exitreg_run_pending(), 0);
    assert_eq!(order(), b"a".to_vec());
}

#[test]
fn rust_registration_installs_trampoline() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();

    exitreg_abi::register_fn(
        |_: &Args| {
            record(b'r');
            Ok(())
        },
        Args::none(),
    );
    assert!(is_installed());
    assert_eq!(global_registry().len(), 1);

    assert_eq!(exitreg_run_pending(), 0);
    assert_eq!(order(), b"r".to_vec());
}
