use std::fmt;

use ottoman_vm::VmError;

/// Which half of a view was running when evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => f.write_str("map"),
            Phase::Reduce => f.write_str("reduce"),
        }
    }
}

// ── ViewError ─────────────────────────────────────────────────

/// Evaluation is all-or-nothing: any of these aborts the whole call.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    /// The map or reduce source did not compile.
    Compilation { phase: Phase, message: String },
    /// User code raised, or the runtime could not run it.
    Execution { phase: Phase, message: String },
    /// The document at `index` could not be handed to the runtime.
    MalformedDocument { index: usize, message: String },
}

impl ViewError {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Compilation { phase, .. } | Self::Execution { phase, .. } => Some(*phase),
            Self::MalformedDocument { .. } => None,
        }
    }

    pub(crate) fn execution(phase: Phase, message: impl Into<String>) -> Self {
        Self::Execution {
            phase,
            message: message.into(),
        }
    }

    pub(crate) fn compilation(phase: Phase, message: impl Into<String>) -> Self {
        Self::Compilation {
            phase,
            message: message.into(),
        }
    }

    /// Classify a runtime error. Only compile errors indict the view source.
    pub(crate) fn vm(phase: Phase, err: VmError) -> Self {
        match err {
            VmError::Compile(msg) => Self::compilation(phase, msg),
            other => Self::execution(phase, other.to_string()),
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compilation { phase, message } => {
                write!(f, "{phase} function failed to compile: {message}")
            }
            Self::Execution { phase, message } => {
                write!(f, "{phase} function failed: {message}")
            }
            Self::MalformedDocument { index, message } => {
                write!(f, "malformed document at position {index}: {message}")
            }
        }
    }
}

impl std::error::Error for ViewError {}

// ── ReduceError ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ReduceError {
    /// A helper was called with something other than a list of values.
    NotAnArray(&'static str),
    /// The value at `position` is not a number.
    NotNumeric { position: usize },
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnArray(helper) => write!(f, "{helper} expects an array of values"),
            Self::NotNumeric { position } => {
                write!(f, "value at position {position} is not a number")
            }
        }
    }
}

impl std::error::Error for ReduceError {}

// ── DocumentError ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentError(pub String);

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DocumentError {}
