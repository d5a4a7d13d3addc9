//! Error types shared across the command and connection layers.
//!
//! Every failure a caller can observe is one variant of [`Error`]. Errors are:
//! - **Structured**: each variant has typed fields naming what went wrong
//! - **Serializable**: they can be shipped to a presentation layer as JSON
//! - **Recoverable**: none of them is a panic, including precondition violations

use serde::{Deserialize, Serialize};

/// Result type alias for kvbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Command translation and execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Input | `Parse`, `InvalidArgument` | Malformed text or caller input |
/// | Resolution | `UnknownCommand`, `ArityMismatch`, `InvalidArgumentShape` | Command table lookup |
/// | Capability | `NotSupported` | Backend lacks the operation (expected, not a fault) |
/// | Backend | `Connection`, `WireProtocol` | Connect failure or failed native call |
/// | Caller bug | `PreconditionViolation` | Domain call on a disconnected wrapper |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Input ====================
    /// Malformed token stream (unbalanced quotes, dangling escape, empty script)
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// Missing or malformed caller input
    #[error("invalid input argument(s): {reason}")]
    InvalidArgument { reason: String },

    // ==================== Resolution ====================
    /// No descriptor in the table matches the input
    #[error("unknown sequence: '{input}'")]
    UnknownCommand { input: String },

    /// A descriptor matched but the argument count is out of bounds
    #[error("wrong number of arguments for '{command}': expected {expected}, got {actual}")]
    ArityMismatch {
        command: String,
        expected: String,
        actual: usize,
    },

    /// An argument failed its declared shape check
    #[error("invalid argument #{position} for '{command}': expected {expected}, got '{actual}'")]
    InvalidArgumentShape {
        command: String,
        position: usize,
        expected: String,
        actual: String,
    },

    // ==================== Capability ====================
    /// The backend does not implement the requested operation
    #[error("{operation} is not supported by {backend}")]
    NotSupported { operation: String, backend: String },

    // ==================== Backend ====================
    /// Connecting or disconnecting failed
    #[error("connection error: {reason}")]
    Connection { reason: String },

    /// A native driver call on a connected backend failed
    #[error("{operation} function error: {detail}")]
    WireProtocol { operation: String, detail: String },

    // ==================== Caller bug ====================
    /// A domain operation was attempted in the wrong lifecycle state
    #[error("precondition violated: {reason}")]
    PreconditionViolation { reason: String },
}

impl Error {
    /// Shorthand for [`Error::Parse`].
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::NotSupported`].
    pub fn not_supported(operation: impl Into<String>, backend: impl Into<String>) -> Self {
        Error::NotSupported {
            operation: operation.into(),
            backend: backend.into(),
        }
    }

    /// Shorthand for [`Error::Connection`].
    pub fn connection(reason: impl Into<String>) -> Self {
        Error::Connection {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::WireProtocol`].
    pub fn wire(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::WireProtocol {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// True for capability refusals, which callers treat as a normal outcome.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::NotSupported { .. })
    }

    /// True when the error reports a caller ordering bug.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Error::PreconditionViolation { .. })
    }
}
