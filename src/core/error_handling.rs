//! Generic error handling utilities
//!
//! Provides unified error reporting across the queue and CLI error types
//! while keeping their domain-specific messages.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// # Implementation Consistency
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns
/// `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown to
    /// the user directly
    ///
    /// User-actionable: bad arguments, invalid configuration, a consumer
    /// asking for the wrong payload type.
    /// System: a queue shut down underneath the caller, lock poisoning.
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use topicq::core::error_handling::log_error_with_context;
/// # use topicq::core::validation::ValidationError;
/// let error = ValidationError::new("Capacity must be greater than 0");
/// log_error_with_context(&error, "Loading configuration");
/// // Logs: "FATAL: Capacity must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text to show the user for an error, following the same rules as
/// [`log_error_with_context`]
pub fn display_message<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => user_msg.to_string(),
        _ => format!("{}: {}", operation_context, error),
    }
}
