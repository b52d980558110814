//! Typed topic consumer handle
//!
//! A consumer reads one topic and always validates payloads against its
//! type parameter. Several consumers may share a topic; each message goes to
//! exactly one of them.

use crate::queue::channel::TopicChannel;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::manager::{into_typed, recv_from, QueueManager};
use crate::queue::message::TypedMessage;
use futures::Stream;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

/// Consumer handle that receives `T` payloads from one topic
///
/// # Example
///
/// ```rust,no_run
/// # use topicq::queue::{QueueConfig, QueueManager};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = QueueManager::create(QueueConfig::default())?;
/// let consumer = manager.create_consumer::<String>("events")?;
///
/// let message = consumer.recv().await?;
/// println!("{} from {}: {}", message.id(), message.topic(), message.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TopicConsumer<T> {
    topic: String,
    manager: Weak<QueueManager>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TopicConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            manager: self.manager.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Any + Send> TopicConsumer<T> {
    pub(crate) fn new(topic: String, manager: Weak<QueueManager>) -> Self {
        Self {
            topic,
            manager,
            _marker: PhantomData,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next message, waiting while the topic is empty
    pub async fn recv(&self) -> QueueResult<TypedMessage<T>> {
        let cancel = CancellationToken::new();
        self.recv_with_cancel(&cancel).await
    }

    pub async fn recv_with_cancel(&self, cancel: &CancellationToken) -> QueueResult<TypedMessage<T>> {
        let channel = self.channel()?;
        let (payload, context) = recv_from(&channel, cancel).await?;
        let (content, context) = into_typed::<T>(payload, context)?;
        Ok(TypedMessage { context, content })
    }

    /// Receive a message if one is queued right now
    pub fn try_recv(&self) -> QueueResult<Option<TypedMessage<T>>> {
        Ok(self
            .manager()?
            .try_dequeue::<T>(&self.topic)?
            .map(|(content, context)| TypedMessage { context, content }))
    }

    /// Turn the consumer into a stream of messages
    ///
    /// The stream ends once the queue is disposed or dropped. Type
    /// mismatches are yielded as errors and the stream carries on.
    pub fn into_stream(self) -> impl Stream<Item = QueueResult<TypedMessage<T>>> + Send {
        futures::stream::unfold(self, |consumer| async move {
            match consumer.recv().await {
                Ok(message) => Some((Ok(message), consumer)),
                Err(e) if e.is_shutdown() => None,
                Err(e) => Some((Err(e), consumer)),
            }
        })
    }

    /// Resolve the topic channel; the manager is released before returning
    fn channel(&self) -> QueueResult<Arc<TopicChannel>> {
        let manager = self.manager()?;
        manager.resolve_topic(&self.topic)
    }

    /// Strong reference for synchronous calls only; never held across a wait
    fn manager(&self) -> QueueResult<Arc<QueueManager>> {
        self.manager
            .upgrade()
            .ok_or_else(|| QueueError::InvalidState {
                message: "QueueManager no longer exists".to_string(),
            })
    }
}
