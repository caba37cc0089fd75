// extern "C" exports take plain function pointers from C callers; the
// registry copes with any pointer it is handed, so per-function safety docs
// would be boilerplate.
#![allow(clippy::missing_safety_doc)]
//! # exitreg-abi
//!
//! `extern "C"` boundary for exitreg.
//!
//! The C runtime's `atexit` list is the host termination mechanism. This
//! crate registers a single trampoline there that fires the process hook slot
//! of `exitreg-core`, which in turn drains the global registry.
//!
//! ```text
//! C caller -> exitreg_atexit -> (install once) -> global registry
//! Rust caller -> exitreg_abi::register -> (install once) -> global registry
//! exit() -> libc atexit list -> trampoline -> process hook slot -> run_pending
//! ```

pub mod exit_abi;

pub use exit_abi::{
    drain_status, exitreg_atexit, exitreg_install, exitreg_run_pending, is_installed, register,
    register_fn,
};
