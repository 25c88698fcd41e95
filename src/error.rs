//! Unified error handling for command-bus.
//!
//! Dispatch failures fall into two groups: wiring mistakes detected by the
//! router itself (no handler, duplicate handler, type mismatch) and failures
//! raised by a handler, which pass through untouched.

use thiserror::Error;

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Errors that can occur while registering or dispatching a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No void handler is bound to the command's runtime type.
    #[error("no handler registered for command `{command}`")]
    NoHandlerRegistered { command: &'static str },

    /// No handler is bound to the (command, result) pair.
    #[error("no handler registered for command `{command}` producing `{result}`")]
    NoResultHandlerRegistered {
        command: &'static str,
        result: &'static str,
    },

    /// A handler is already bound to this shape and the registry rejects duplicates.
    #[error("a handler is already registered for `{shape}`")]
    DuplicateHandler { shape: String },

    /// The stored handler could not accept the dispatched command value.
    #[error("handler expected command `{expected}` but received `{actual}`")]
    CommandTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The stored handler produced a value of a different type than requested.
    #[error("handler for `{command}` produced a value that is not `{expected}`")]
    ResultTypeMismatch {
        command: &'static str,
        expected: &'static str,
    },

    /// The handler itself failed. The original error is preserved.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl DispatchError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoHandlerRegistered { .. } | Self::NoResultHandlerRegistered { .. } => {
                "no_handler"
            }
            Self::DuplicateHandler { .. } => "duplicate_handler",
            Self::CommandTypeMismatch { .. } => "command_type_mismatch",
            Self::ResultTypeMismatch { .. } => "result_type_mismatch",
            Self::Handler(_) => "handler_failed",
        }
    }

    /// True for lookup failures, i.e. a command nobody bound a handler to.
    pub fn is_no_handler(&self) -> bool {
        matches!(
            self,
            Self::NoHandlerRegistered { .. } | Self::NoResultHandlerRegistered { .. }
        )
    }

    /// Borrow the handler's own error, if this failure came from a handler.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Handler(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T = ()> = Result<T, DispatchError>;
