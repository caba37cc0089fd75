//! # exitreg-core
//!
//! Process-wide registry of exit handlers, run last-in-first-out when the
//! program terminates normally.
//!
//! # Architecture
//!
//! ```text
//! register(handler, args) -> pending.push
//! host shutdown -> HookSlot::fire -> ExitRegistry::run_pending -> pop + invoke until empty
//! ```
//!
//! Handler failures never stop the drain. Each ordinary failure is reported to
//! the diagnostic sink; only the last captured failure is returned to the
//! caller of [`ExitRegistry::run_pending`].

#![deny(unsafe_code)]

pub mod args;
pub mod config;
pub mod diagnostic;
pub mod failure;
pub mod hook;
pub mod registry;

pub use args::Args;
pub use diagnostic::{DiagnosticSink, MemorySink, StderrSink};
pub use failure::HandlerFailure;
pub use hook::{ExitHook, HookSlot, fire_process_hook, process_hook_slot};
pub use registry::{
    ExitRegistry, Handler, PendingCall, global_registry, register, register_fn, run_pending,
};
