//! Where handler-failure diagnostics go.
//!
//! The drain reports every ordinary handler failure before moving on, even
//! though only the last one is returned. Termination requests are not reported.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{DiagnosticMode, diagnostic_mode};
use crate::failure::HandlerFailure;

/// First line of every plain-text diagnostic.
pub const DIAGNOSTIC_LABEL: &str = "Error in exit handler:";

/// Receives one report per failed handler.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, failure: &HandlerFailure);
}

/// Writes diagnostics to the process's standard error stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, failure: &HandlerFailure) {
        let mut stderr = std::io::stderr().lock();
        // Nothing useful to do if stderr is gone during shutdown.
        let _ = write_diagnostic(&mut stderr, failure, diagnostic_mode());
    }
}

/// Writes one rendered diagnostic to `out` and flushes it.
fn write_diagnostic(
    out: &mut impl Write,
    failure: &HandlerFailure,
    mode: DiagnosticMode,
) -> std::io::Result<()> {
    out.write_all(render(failure, mode).as_bytes())?;
    out.flush()
}

/// Collects rendered diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<String>>>,
    mode: DiagnosticMode,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mode: DiagnosticMode) -> Self {
        Self {
            entries: Arc::default(),
            mode,
        }
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, failure: &HandlerFailure) {
        let text = render(failure, self.mode);
        self.entries.lock().push(text);
    }
}

/// Renders a failure in the given mode. Output always ends with a newline.
#[must_use]
pub fn render(failure: &HandlerFailure, mode: DiagnosticMode) -> String {
    match mode {
        DiagnosticMode::Plain => render_plain(failure),
        DiagnosticMode::Jsonl => render_jsonl(failure),
    }
}

fn render_plain(failure: &HandlerFailure) -> String {
    match failure.backtrace() {
        Some(trace) => format!("{DIAGNOSTIC_LABEL}\n{failure}\n{trace}\n"),
        None => format!("{DIAGNOSTIC_LABEL}\n{failure}\n"),
    }
}

fn render_jsonl(failure: &HandlerFailure) -> String {
    let message = match failure {
        HandlerFailure::HandlerError { message, .. } => message.clone(),
        HandlerFailure::TerminationRequest { .. } => failure.to_string(),
    };
    let record = serde_json::json!({
        "event": "exit_handler_failure",
        "kind": failure.kind(),
        "message": message,
        "exit_status": failure.exit_status(),
        "backtrace": failure.backtrace().map(ToString::to_string),
    });
    format!("{record}\n")
}
