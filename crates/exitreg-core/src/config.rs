//! Diagnostic output configuration.
//!
//! The format of handler-failure diagnostics is set via the
//! `EXITREG_DIAGNOSTICS` environment variable:
//! - `plain` (default): a fixed label line followed by the failure and its
//!   backtrace.
//! - `jsonl`: one JSON object per failure, for log collectors.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable read on first use.
pub const DIAGNOSTICS_ENV: &str = "EXITREG_DIAGNOSTICS";

/// Format used by the stderr diagnostic sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticMode {
    /// Label line, then `kind: message`, then the backtrace.
    #[default]
    Plain,
    /// Single-line JSON record.
    Jsonl,
}

impl DiagnosticMode {
    /// Parse from string (case-insensitive). Unknown values fall back to `Plain`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonl" | "json" | "structured" => Self::Jsonl,
            _ => Self::Plain,
        }
    }
}

// 0=unresolved, 1=Plain, 2=Jsonl.
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_PLAIN: u8 = 1;
const MODE_JSONL: u8 = 2;

fn mode_to_u8(mode: DiagnosticMode) -> u8 {
    match mode {
        DiagnosticMode::Plain => MODE_PLAIN,
        DiagnosticMode::Jsonl => MODE_JSONL,
    }
}

fn u8_to_mode(v: u8) -> DiagnosticMode {
    match v {
        MODE_JSONL => DiagnosticMode::Jsonl,
        _ => DiagnosticMode::Plain,
    }
}

/// Configured diagnostic mode (reads the env var on first call, caches thereafter).
#[must_use]
pub fn diagnostic_mode() -> DiagnosticMode {
    let cached = CACHED_MODE.load(Ordering::Relaxed);
    if cached != MODE_UNRESOLVED {
        return u8_to_mode(cached);
    }

    let mode = std::env::var(DIAGNOSTICS_ENV)
        .map(|v| DiagnosticMode::from_str_loose(&v))
        .unwrap_or_default();
    // A concurrent override wins over the env value.
    match CACHED_MODE.compare_exchange(
        MODE_UNRESOLVED,
        mode_to_u8(mode),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => mode,
        Err(current) => u8_to_mode(current),
    }
}

/// Overrides the cached mode for the rest of the process.
pub fn set_diagnostic_mode(mode: DiagnosticMode) {
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
}
