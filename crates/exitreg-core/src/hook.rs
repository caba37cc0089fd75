//! Single-slot host termination hook.
//!
//! The host runtime offers one "run this before the process ends" slot. A
//! registry attaching to the slot chains whatever was installed before it
//! (see [`crate::ExitRegistry::attach`]).

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, const_mutex};

use crate::failure::HandlerFailure;

/// Callable stored in a hook slot.
pub type ExitHook = Arc<dyn Fn() -> Result<(), HandlerFailure> + Send + Sync>;

/// Holds at most one termination hook.
#[derive(Default)]
pub struct HookSlot {
    hook: Option<ExitHook>,
}

impl HookSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self { hook: None }
    }

    /// Removes and returns the installed hook.
    pub fn take(&mut self) -> Option<ExitHook> {
        self.hook.take()
    }

    /// Installs `hook`, returning the one it replaced.
    pub fn install(&mut self, hook: ExitHook) -> Option<ExitHook> {
        self.hook.replace(hook)
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.hook.is_some()
    }

    /// Runs the installed hook and empties the slot. A second call is a no-op.
    pub fn fire(&mut self) -> Result<(), HandlerFailure> {
        match self.hook.take() {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

static PROCESS_HOOK_SLOT: Mutex<HookSlot> = const_mutex(HookSlot::new());

/// The process-wide hook slot fired at normal termination.
///
/// Do not hold this lock across a call to [`crate::global_registry`]; the
/// first call attaches to this slot.
pub fn process_hook_slot() -> &'static Mutex<HookSlot> {
    &PROCESS_HOOK_SLOT
}

/// Fires the process hook with the slot unlocked, so handlers may touch it.
pub fn fire_process_hook() -> Result<(), HandlerFailure> {
    let hook = PROCESS_HOOK_SLOT.lock().take();
    match hook {
        Some(hook) => hook(),
        None => Ok(()),
    }
}
