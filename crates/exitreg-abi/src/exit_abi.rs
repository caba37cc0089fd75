//! ABI entry points for exit-handler registration and draining.

use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

use exitreg_core::{Args, Handler, HandlerFailure};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Maps a drain result to a C status: `0` when nothing failed, the requested
/// status for a termination request, `-1` for any other handler error.
///
/// The mapping is lossy. A termination request for status `0` reads the same
/// as a clean drain, and one for status `-1` reads the same as a handler
/// error. Callers that must tell them apart drain through
/// [`exitreg_core::run_pending`] instead.
#[must_use]
pub fn drain_status(result: &Result<(), HandlerFailure>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(HandlerFailure::TerminationRequest { status }) => *status,
        Err(HandlerFailure::HandlerError { .. }) => -1,
    }
}

extern "C" fn run_at_exit() {
    if let Err(HandlerFailure::TerminationRequest { status }) = exitreg_core::fire_process_hook()
    {
        // SAFETY: flushing every open stream then terminating without
        // re-entering the atexit list. Handler errors were already reported
        // and leave the original exit status alone.
        unsafe {
            libc::fflush(std::ptr::null_mut());
            libc::_exit(status);
        }
    }
}

// ---------------------------------------------------------------------------
// exitreg_install
// ---------------------------------------------------------------------------

/// Attaches the global registry to the C runtime's `atexit` list.
///
/// Idempotent. Returns `0` on success and `-1` if `atexit` refused the
/// trampoline.
#[unsafe(no_mangle)]
pub extern "C" fn exitreg_install() -> c_int {
    let _ = exitreg_core::global_registry();
    if INSTALLED.swap(true, Ordering::AcqRel) {
        return 0;
    }
    // SAFETY: `run_at_exit` is a plain extern "C" fn with no captured state.
    if unsafe { libc::atexit(run_at_exit) } == 0 {
        0
    } else {
        INSTALLED.store(false, Ordering::Release);
        -1
    }
}

/// Whether the `atexit` trampoline has been registered in this process.
#[must_use]
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Acquire)
}

// ---------------------------------------------------------------------------
// exitreg_atexit
// ---------------------------------------------------------------------------

/// Registers a C function as a zero-argument exit handler.
///
/// Installs the `atexit` trampoline on first use. Returns `-1` for a null
/// function pointer or if the trampoline could not be installed, `0`
/// otherwise.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn exitreg_atexit(func: Option<unsafe extern "C" fn()>) -> c_int {
    let Some(func) = func else {
        return -1;
    };
    if exitreg_install() != 0 {
        return -1;
    }
    exitreg_core::register_fn(
        move |_: &Args| {
            // SAFETY: the caller registered a valid zero-argument C function.
            unsafe { func() };
            Ok(())
        },
        Args::none(),
    );
    0
}

// ---------------------------------------------------------------------------
// Rust-side registration
// ---------------------------------------------------------------------------

/// Registers `handler` on the global registry and makes sure it runs at
/// normal process exit.
///
/// Same as [`exitreg_core::register`] plus [`exitreg_install`]. If `atexit`
/// refuses the trampoline the handler is still queued and runs on an explicit
/// drain.
pub fn register(handler: Handler, args: Args) -> Handler {
    let _ = exitreg_install();
    exitreg_core::register(handler, args)
}

/// Closure form of [`register`].
pub fn register_fn<F>(f: F, args: Args) -> Handler
where
    F: Fn(&Args) -> Result<(), HandlerFailure> + Send + Sync + 'static,
{
    let _ = exitreg_install();
    exitreg_core::register_fn(f, args)
}

// ---------------------------------------------------------------------------
// exitreg_run_pending
// ---------------------------------------------------------------------------

/// Drains the global registry immediately. See [`drain_status`] for the result.
#[unsafe(no_mangle)]
pub extern "C" fn exitreg_run_pending() -> c_int {
    drain_status(&exitreg_core::run_pending())
}
