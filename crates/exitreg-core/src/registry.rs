//! The exit-handler registry and its drain loop.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::args::Args;
use crate::diagnostic::{DiagnosticSink, StderrSink};
use crate::failure::HandlerFailure;
use crate::hook::{HookSlot, process_hook_slot};

/// A registered exit handler. Receives the arguments bound at registration.
pub type Handler = Arc<dyn Fn(&Args) -> Result<(), HandlerFailure> + Send + Sync>;

/// One deferred invocation.
#[derive(Clone)]
pub struct PendingCall {
    pub handler: Handler,
    pub args: Args,
}

impl PendingCall {
    /// Invokes the handler with its bound arguments. Panics become
    /// `HandlerError`s of kind `panic`.
    pub fn invoke(&self) -> Result<(), HandlerFailure> {
        catch_unwind(AssertUnwindSafe(|| (self.handler)(&self.args)))
            .unwrap_or_else(|payload| Err(HandlerFailure::from_panic(payload)))
    }
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("handler", &Arc::as_ptr(&self.handler))
            .field("args", &self.args)
            .finish()
    }
}

/// Ordered list of pending calls, drained last-in-first-out.
///
/// The lock only guards the list. It is released before each handler runs, so
/// a handler may register more handlers and they are picked up by the same
/// drain. Registration from several threads is the caller's to serialize; the
/// registry makes no cross-thread ordering promise.
pub struct ExitRegistry {
    pending: Mutex<Vec<PendingCall>>,
    sink: Box<dyn DiagnosticSink>,
}

impl ExitRegistry {
    /// Empty registry reporting failures to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(StderrSink)
    }

    #[must_use]
    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            sink: Box::new(sink),
        }
    }

    /// Appends a call to `handler` with `args` and returns `handler` itself.
    pub fn register(&self, handler: Handler, args: Args) -> Handler {
        self.pending.lock().push(PendingCall {
            handler: Arc::clone(&handler),
            args,
        });
        handler
    }

    /// [`register`](Self::register) for a plain closure or function.
    pub fn register_fn<F>(&self, f: F, args: Args) -> Handler
    where
        F: Fn(&Args) -> Result<(), HandlerFailure> + Send + Sync + 'static,
    {
        self.register(Arc::new(f), args)
    }

    /// Runs every pending call, newest first, until none remain.
    ///
    /// Each failure is captured and the drain continues. Ordinary handler
    /// errors are reported to the sink; termination requests are not. The
    /// last captured failure is returned once the list is empty, earlier ones
    /// are dropped.
    pub fn run_pending(&self) -> Result<(), HandlerFailure> {
        let mut last_failure = None;
        while let Some(call) = self.pop() {
            if let Err(failure) = call.invoke() {
                if !failure.is_termination_request() {
                    self.sink.report(&failure);
                }
                last_failure = Some(failure);
            }
        }
        match last_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    /// Installs this registry's drain into `slot`.
    ///
    /// A hook already in the slot is registered first as a zero-argument call,
    /// so it sits at the bottom of the stack and runs after every handler
    /// registered later.
    pub fn attach(self: &Arc<Self>, slot: &mut HookSlot) {
        if let Some(prior) = slot.take() {
            self.register_fn(move |_: &Args| prior(), Args::none());
        }
        let registry = Arc::clone(self);
        slot.install(Arc::new(move || registry.run_pending()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Drops all pending calls without running them.
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    fn pop(&self) -> Option<PendingCall> {
        self.pending.lock().pop()
    }
}

impl Default for ExitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitRegistry")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<ExitRegistry>> = OnceLock::new();

/// The process-wide registry, attached to [`process_hook_slot`] on first use.
///
/// Firing that slot at real process exit is the host's job; `exitreg-abi`
/// links it to the C runtime's `atexit` whenever something registers through
/// it.
pub fn global_registry() -> &'static Arc<ExitRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| {
        let registry = Arc::new(ExitRegistry::new());
        registry.attach(&mut process_hook_slot().lock());
        registry
    })
}

/// Registers `handler` on the process-wide registry.
pub fn register(handler: Handler, args: Args) -> Handler {
    global_registry().register(handler, args)
}

/// Registers a closure on the process-wide registry.
pub fn register_fn<F>(f: F, args: Args) -> Handler
where
    F: Fn(&Args) -> Result<(), HandlerFailure> + Send + Sync + 'static,
{
    global_registry().register_fn(f, args)
}

/// Drains the process-wide registry now.
pub fn run_pending() -> Result<(), HandlerFailure> {
    global_registry().run_pending()
}
