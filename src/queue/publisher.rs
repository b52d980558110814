//! Topic publisher handle
//!
//! A publisher is bound to one topic and holds a weak reference to its
//! manager, so outstanding handles never keep a queue alive after its owner
//! lets go of it.

use crate::queue::channel::TopicChannel;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::manager::{send_to, QueueManager};
use crate::queue::message::Payload;
use std::any::Any;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Publisher handle for sending messages to one topic
///
/// # Example
///
/// ```rust,no_run
/// # use topicq::queue::{QueueConfig, QueueManager};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = QueueManager::create(QueueConfig::with_capacity(16))?;
/// let publisher = manager.create_publisher("Metrics")?;
///
/// let id = publisher.publish(42_u64).await?;
/// println!("Published message {}", id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TopicPublisher {
    topic: String,
    manager: Weak<QueueManager>,
}

impl TopicPublisher {
    pub(crate) fn new(topic: String, manager: Weak<QueueManager>) -> Self {
        Self { topic, manager }
    }

    /// Topic as spelled when the publisher was created
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish `payload`, waiting while the topic is full
    pub async fn publish<T: Any + Send>(&self, payload: T) -> QueueResult<Uuid> {
        let cancel = CancellationToken::new();
        self.publish_with_cancel(payload, &cancel).await
    }

    pub async fn publish_with_cancel<T: Any + Send>(
        &self,
        payload: T,
        cancel: &CancellationToken,
    ) -> QueueResult<Uuid> {
        let channel = self.channel()?;
        send_to(&channel, &self.topic, Payload::new(payload), cancel).await
    }

    /// Resolve the topic channel; the manager is released before returning
    fn channel(&self) -> QueueResult<Arc<TopicChannel>> {
        let manager = self
            .manager
            .upgrade()
            .ok_or_else(|| QueueError::InvalidState {
                message: "QueueManager no longer exists".to_string(),
            })?;
        manager.resolve_topic(&self.topic)
    }
}
