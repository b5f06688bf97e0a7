//! Error taxonomy shared by the tensor, schema, builder and compiler layers.

use std::fmt;
use std::io;

use thiserror::Error;

/// Failure surfaced by graph construction or compilation.
///
/// Every variant aborts the call that produced it; the builder never keeps a partially appended
/// node around, so the graph stays valid for further construction after an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Caller broke an operator precondition (ownership, rank, axis, partition sums, ...).
    #[error("contract violation in {op}: {detail}")]
    ContractViolation { op: &'static str, detail: String },
    /// The operator, data type or rank is not available for the configured capabilities.
    #[error("unsupported configuration for {op}: {detail}")]
    UnsupportedConfiguration { op: &'static str, detail: String },
    /// Compilation found an edge it cannot classify.
    #[error("graph structure error: {detail}")]
    GraphStructure { detail: String },
    #[error("{op} is not implemented: {reason}")]
    Unimplemented { op: &'static str, reason: String },
}

impl GraphError {
    pub fn contract(op: &'static str, detail: impl Into<String>) -> Self {
        GraphError::ContractViolation {
            op,
            detail: detail.into(),
        }
    }

    pub fn unsupported(op: &'static str, detail: impl Into<String>) -> Self {
        GraphError::UnsupportedConfiguration {
            op,
            detail: detail.into(),
        }
    }

    pub fn structure(detail: impl Into<String>) -> Self {
        GraphError::GraphStructure {
            detail: detail.into(),
        }
    }

    pub fn unimplemented(op: &'static str, reason: impl Into<String>) -> Self {
        GraphError::Unimplemented {
            op,
            reason: reason.into(),
        }
    }

    /// Short, stable category label used in logs.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GraphError::ContractViolation { .. } => ErrorCategory::ContractViolation,
            GraphError::UnsupportedConfiguration { .. } => ErrorCategory::UnsupportedConfiguration,
            GraphError::GraphStructure { .. } => ErrorCategory::GraphStructure,
            GraphError::Unimplemented { .. } => ErrorCategory::Unimplemented,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ContractViolation,
    UnsupportedConfiguration,
    GraphStructure,
    Unimplemented,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::ContractViolation => "contract-violation",
            ErrorCategory::UnsupportedConfiguration => "unsupported-configuration",
            ErrorCategory::GraphStructure => "graph-structure",
            ErrorCategory::Unimplemented => "unimplemented",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convenience alias for results returned by graph routines.
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum DescriptionSerdeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum DescriptionIoError {
    #[error(transparent)]
    Serialization(#[from] DescriptionSerdeError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Returns a [`GraphError::ContractViolation`] from the enclosing function unless `cond` holds.
#[macro_export]
macro_rules! ensure_contract {
    ($cond:expr, $op:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::GraphError::contract($op, format!($($arg)+)));
        }
    };
}
