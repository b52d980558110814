//! Queue configuration

use crate::core::version::default_topic_capacity;
use crate::queue::error::{QueueArgument, QueueError, QueueResult};
use serde::{Deserialize, Serialize};

/// Construction options for a [`QueueManager`](crate::queue::QueueManager)
///
/// Deserializes from kebab-case keys so it can be embedded in a TOML file:
///
/// ```toml
/// capacity = 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct QueueConfig {
    /// Maximum number of queued messages per topic; the same bound applies
    /// to every topic
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_topic_capacity(),
        }
    }
}

impl QueueConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> QueueResult<()> {
        if self.capacity == 0 {
            return Err(QueueError::invalid_argument(
                QueueArgument::Capacity,
                "capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}
