//! Error types for prize evaluation

use thiserror::Error;

use crate::cell::Cell;

/// Broad classification used by callers to decide how to react to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad paytable or configuration. Never retried.
    Configuration,
    /// Fatal to the current evaluation. The caller decides whether to abort the round.
    Evaluation,
    /// Rejected at the API boundary before any mutation happened.
    PreconditionViolation,
}

/// Evaluation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A population references a strip that is not in the strip list
    #[error("Strip not found: {0}")]
    MissingStrip(String),

    /// A win references a prize that is not in the prize scale
    #[error("Prize not found: {0}")]
    MissingPrize(String),

    /// A pattern or population entry could not be resolved
    #[error("Pattern not found: {0}")]
    MissingPattern(String),

    /// A pattern references a cell that was never populated
    #[error("Cell not populated: {0}")]
    MissingCell(Cell),

    /// Evaluation failed
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Pick without replacement asked for more values than the pool holds
    #[error("Pick count {requested} exceeds available pool of {available}")]
    PickCount { requested: u64, available: u64 },

    /// Invalid argument at the API boundary
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),
}

impl EvalError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_)
            | Self::MissingStrip(_)
            | Self::MissingPrize(_)
            | Self::MissingPattern(_)
            | Self::MissingCell(_) => ErrorKind::Configuration,
            Self::Evaluation(_) | Self::PickCount { .. } | Self::Overflow(_) => {
                ErrorKind::Evaluation
            }
            Self::Precondition(_) => ErrorKind::PreconditionViolation,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Checked `a + b` for money and weights
pub(crate) fn checked_add(a: u64, b: u64, what: &'static str) -> EvalResult<u64> {
    a.checked_add(b).ok_or(EvalError::Overflow(what))
}

/// Checked `a * b` for money and multipliers
pub(crate) fn checked_mul(a: u64, b: u64, what: &'static str) -> EvalResult<u64> {
    a.checked_mul(b).ok_or(EvalError::Overflow(what))
}
