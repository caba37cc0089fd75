//! Failures raised by exit handlers.

use std::any::Any;
use std::backtrace::Backtrace;

use thiserror::Error;

/// Kind recorded for handlers that panicked instead of returning an error.
pub const PANIC_KIND: &str = "panic";

/// Why a handler did not complete normally.
#[derive(Debug, Error)]
pub enum HandlerFailure {
    /// The handler asked the process to exit with `status`.
    #[error("exit requested with status {status}")]
    TerminationRequest { status: i32 },
    /// Any other failure. The backtrace is captured where the failure was built.
    ///
    /// Boxed so the derive does not treat it as a provided backtrace, which
    /// needs the unstable `error_generic_member_access` feature.
    #[error("{kind}: {message}")]
    HandlerError {
        kind: String,
        message: String,
        backtrace: Box<Backtrace>,
    },
}

impl HandlerFailure {
    /// Request process exit with `status`.
    #[must_use]
    pub fn exit(status: i32) -> Self {
        Self::TerminationRequest { status }
    }

    /// An ordinary handler error, capturing the current stack.
    #[must_use]
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerError {
            kind: kind.into(),
            message: message.into(),
            backtrace: Box::new(Backtrace::force_capture()),
        }
    }

    /// Wraps an arbitrary error, using its type name as the kind.
    ///
    /// Generic parameters are dropped: `a::Wrapper<b::Inner>` gives `Wrapper`.
    #[must_use]
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        Self::error(short_type_name::<E>(), err.to_string())
    }

    /// Converts a payload caught by `catch_unwind`.
    ///
    /// The backtrace points at the catch site; the panic hook has already
    /// printed the originating location.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::error(PANIC_KIND, message)
    }

    #[must_use]
    pub const fn is_termination_request(&self) -> bool {
        matches!(self, Self::TerminationRequest { .. })
    }

    /// Requested exit status, if this is a termination request.
    #[must_use]
    pub const fn exit_status(&self) -> Option<i32> {
        match self {
            Self::TerminationRequest { status } => Some(*status),
            Self::HandlerError { .. } => None,
        }
    }

    /// Short classification used in diagnostics and reports.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::TerminationRequest { .. } => "TerminationRequest",
            Self::HandlerError { kind, .. } => kind,
        }
    }

    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Self::TerminationRequest { .. } => None,
            Self::HandlerError { backtrace, .. } => Some(&**backtrace),
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

impl From<std::io::Error> for HandlerFailure {
    fn from(err: std::io::Error) -> Self {
        Self::error("io", err.to_string())
    }
}
