//! Queue Error Types

use crate::core::error_handling::ContextualError;
use std::fmt;
use uuid::Uuid;

/// Caller-supplied argument rejected by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueArgument {
    Topic,
    Payload,
    Capacity,
}

impl fmt::Display for QueueArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueArgument::Topic => "topic",
            QueueArgument::Payload => "payload",
            QueueArgument::Capacity => "capacity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        argument: QueueArgument,
        message: String,
    },

    /// Operation attempted after the queue was disposed
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Dequeued payload is not of the requested type; the message was consumed
    #[error("Type mismatch for message {message_id}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        message_id: Uuid,
    },

    #[error("Operation cancelled")]
    Cancelled,

    /// The topic channel was closed while the operation was in flight
    #[error("Topic '{topic}' is closed")]
    Closed { topic: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

impl QueueError {
    pub(crate) fn invalid_argument(argument: QueueArgument, message: impl Into<String>) -> Self {
        QueueError::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    pub(crate) fn disposed() -> Self {
        QueueError::InvalidState {
            message: "queue has been disposed".to_string(),
        }
    }

    /// The rejected argument, for `InvalidArgument` errors
    pub fn argument(&self) -> Option<QueueArgument> {
        match self {
            QueueError::InvalidArgument { argument, .. } => Some(*argument),
            _ => None,
        }
    }

    /// True for errors caused by queue shutdown (`InvalidState` or `Closed`)
    pub fn is_shutdown(&self) -> bool {
        matches!(
            self,
            QueueError::InvalidState { .. } | QueueError::Closed { .. }
        )
    }
}

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, QueueError::InvalidArgument { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::InvalidArgument { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
