//! Validation utilities for CLI arguments and configuration values

use crate::core::error_handling::ContextualError;

/// Validation failure with a message that can be shown to the user as-is
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, ValidationError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ValidationError::new("Value must be greater than 0")),
        Ok(n) => Ok(n),
        Err(_) => Err(ValidationError::new(format!(
            "'{}' is not a valid positive integer",
            value
        ))),
    }
}

/// Validate a list of topic names
///
/// Accepts repeated values and comma-separated lists. Blank entries are
/// rejected and duplicates are removed case-insensitively, keeping the
/// first spelling, since topic routing ignores case.
pub fn validate_topic_list(values: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut topics: Vec<String> = Vec::new();

    for raw in values.iter().flat_map(|v| v.split(',')) {
        let topic = raw.trim();
        if topic.is_empty() {
            return Err(ValidationError::new("Topic names cannot be empty"));
        }
        let folded = topic.to_lowercase();
        if !topics.iter().any(|t| t.to_lowercase() == folded) {
            topics.push(topic.to_string());
        }
    }

    if topics.is_empty() {
        return Err(ValidationError::new("At least one topic is required"));
    }

    Ok(topics)
}
