//! QueueManager - public surface of the topic queue
//!
//! The QueueManager validates caller input, routes each call to the channel
//! of its case-folded topic, attaches a [`MessageContext`] on enqueue, checks
//! payload types on dequeue and owns the one-way `Active -> Disposed`
//! shutdown of every channel.

use crate::core::cleanup::Cleanup;
use crate::queue::channel::TopicChannel;
use crate::queue::config::QueueConfig;
use crate::queue::consumer::TopicConsumer;
use crate::queue::error::{QueueArgument, QueueError, QueueResult};
use crate::queue::message::{MessageContext, Payload, QueuedItem};
use crate::queue::publisher::TopicPublisher;
use crate::queue::registry::TopicRegistry;
use crate::queue::types::{DisposeReport, QueueStats, TopicStats};
use std::any::{type_name, Any};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// In-process, topic-multiplexed message queue
///
/// Each topic is an independent bounded FIFO created on first use. Topic
/// names are matched case-insensitively; the context of every message keeps
/// the spelling the producer used.
///
/// # Thread Safety
///
/// All operations take `&self` and may be called concurrently from any
/// number of tasks. Share the manager with `Arc<QueueManager>`.
///
/// # Shutdown
///
/// [`dispose`](Self::dispose) closes and drains every topic. Callers
/// suspended at that moment get `QueueError::Closed`; later calls get
/// `QueueError::InvalidState`. Dropping the manager disposes it as well.
///
/// # Example
///
/// ```rust,no_run
/// use topicq::queue::QueueManager;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = QueueManager::new(100)?;
///
/// let id = manager.enqueue("Orders", String::from("order #1")).await?;
/// let (order, context) = manager.dequeue::<String>("orders").await?;
///
/// assert_eq!(order, "order #1");
/// assert_eq!(context.id(), id);
/// assert_eq!(context.topic(), "Orders");
///
/// manager.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueueManager {
    config: QueueConfig,
    registry: TopicRegistry,
}

impl QueueManager {
    /// Create a queue whose topics each hold at most `capacity` messages
    pub fn new(capacity: usize) -> QueueResult<Self> {
        Self::with_config(QueueConfig::with_capacity(capacity))
    }

    pub fn with_config(config: QueueConfig) -> QueueResult<Self> {
        config.validate()?;
        log::debug!("Creating queue manager (capacity {} per topic)", config.capacity);
        Ok(Self {
            registry: TopicRegistry::new(config.capacity),
            config,
        })
    }

    /// Create a shared manager, as needed for publisher and consumer handles
    pub fn create(config: QueueConfig) -> QueueResult<Arc<Self>> {
        Ok(Arc::new(Self::with_config(config)?))
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Per-topic capacity
    pub fn capacity(&self) -> usize {
        self.registry.capacity()
    }

    /// Create a publisher bound to `topic`
    pub fn create_publisher(self: &Arc<Self>, topic: &str) -> QueueResult<TopicPublisher> {
        topic_key(topic)?;
        Ok(TopicPublisher::new(topic.to_string(), Arc::downgrade(self)))
    }

    /// Create a consumer that reads `T` payloads from `topic`
    pub fn create_consumer<T: Any + Send>(
        self: &Arc<Self>,
        topic: &str,
    ) -> QueueResult<TopicConsumer<T>> {
        topic_key(topic)?;
        Ok(TopicConsumer::new(topic.to_string(), Arc::downgrade(self)))
    }

    /// Enqueue `payload` under `topic`, waiting while the topic is full
    ///
    /// Returns the id of the new message.
    pub async fn enqueue<T: Any + Send>(&self, topic: &str, payload: T) -> QueueResult<Uuid> {
        let cancel = CancellationToken::new();
        self.enqueue_payload(topic, Some(Payload::new(payload)), &cancel)
            .await
    }

    /// [`enqueue`](Self::enqueue) with a cancellation token
    pub async fn enqueue_with_cancel<T: Any + Send>(
        &self,
        topic: &str,
        payload: T,
        cancel: &CancellationToken,
    ) -> QueueResult<Uuid> {
        self.enqueue_payload(topic, Some(Payload::new(payload)), cancel)
            .await
    }

    /// Enqueue an already type-erased payload
    ///
    /// # Errors
    ///
    /// - `InvalidArgument(Topic)` if `topic` is empty or whitespace
    /// - `InvalidArgument(Payload)` if `payload` is `None`
    /// - `InvalidState` if the queue has been disposed
    /// - `Cancelled` if `cancel` fires while waiting for room; nothing is queued
    /// - `Closed` if the queue is disposed while waiting for room
    pub async fn enqueue_payload(
        &self,
        topic: &str,
        payload: Option<Payload>,
        cancel: &CancellationToken,
    ) -> QueueResult<Uuid> {
        let key = topic_key(topic)?;
        let payload = payload.ok_or_else(|| {
            QueueError::invalid_argument(QueueArgument::Payload, "payload cannot be missing")
        })?;

        let channel = self.registry.resolve(&key)?;
        send_to(&channel, topic, payload, cancel).await
    }

    /// Dequeue the next message of `topic` as a `T`, waiting while empty
    ///
    /// The payload type is always validated. A message of another type is
    /// still consumed and reported as `TypeMismatch`; use
    /// [`dequeue_payload`](Self::dequeue_payload) to receive messages
    /// without validation.
    pub async fn dequeue<T: Any + Send>(&self, topic: &str) -> QueueResult<(T, MessageContext)> {
        let cancel = CancellationToken::new();
        self.dequeue_with_cancel(topic, &cancel).await
    }

    /// [`dequeue`](Self::dequeue) with a cancellation token
    pub async fn dequeue_with_cancel<T: Any + Send>(
        &self,
        topic: &str,
        cancel: &CancellationToken,
    ) -> QueueResult<(T, MessageContext)> {
        let (payload, context) = self.dequeue_payload(topic, cancel).await?;
        into_typed(payload, context)
    }

    /// Dequeue the next message of `topic` without validating its type
    ///
    /// A topic that was never used is created empty and the call waits for
    /// a producer.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument(Topic)` if `topic` is empty or whitespace
    /// - `InvalidState` if the queue has been disposed
    /// - `Cancelled` if `cancel` fires first; nothing is consumed
    /// - `Closed` if the queue is disposed while waiting
    pub async fn dequeue_payload(
        &self,
        topic: &str,
        cancel: &CancellationToken,
    ) -> QueueResult<(Payload, MessageContext)> {
        let channel = self.resolve_topic(topic)?;
        recv_from(&channel, cancel).await
    }

    /// Validate `topic` and return its channel, creating it on first use
    ///
    /// Handles must release their strong reference before waiting on the
    /// returned channel, or dropping the manager cannot dispose it.
    pub(crate) fn resolve_topic(&self, topic: &str) -> QueueResult<Arc<TopicChannel>> {
        let key = topic_key(topic)?;
        self.registry.resolve(&key)
    }

    /// Dequeue a `T` if one is queued, without waiting
    pub fn try_dequeue<T: Any + Send>(
        &self,
        topic: &str,
    ) -> QueueResult<Option<(T, MessageContext)>> {
        match self.try_dequeue_payload(topic)? {
            Some((payload, context)) => into_typed(payload, context).map(Some),
            None => Ok(None),
        }
    }

    /// Dequeue a payload if one is queued, without waiting or validating
    pub fn try_dequeue_payload(&self, topic: &str) -> QueueResult<Option<(Payload, MessageContext)>> {
        let key = topic_key(topic)?;
        let channel = self.registry.resolve(&key)?;
        Ok(channel
            .try_recv()?
            .map(|item| (item.payload, item.context)))
    }

    /// Number of messages waiting on `topic`; zero for unknown topics
    pub fn queued(&self, topic: &str) -> QueueResult<usize> {
        let key = topic_key(topic)?;
        match self.registry.get(&key)? {
            Some(channel) => channel.len(),
            None => Ok(0),
        }
    }

    pub fn topic_count(&self) -> QueueResult<usize> {
        self.registry.topic_count()
    }

    pub fn is_disposed(&self) -> bool {
        self.registry.is_disposed()
    }

    pub fn stats(&self) -> QueueResult<QueueStats> {
        let topics = self
            .registry
            .channels()?
            .iter()
            .map(|channel| {
                Ok(TopicStats {
                    topic: channel.key().to_string(),
                    queued: channel.len()?,
                    capacity: channel.capacity(),
                })
            })
            .collect::<QueueResult<Vec<_>>>()?;

        Ok(QueueStats {
            capacity: self.capacity(),
            disposed: self.is_disposed(),
            topics,
        })
    }

    /// Close every topic, discard undelivered messages and refuse further use
    ///
    /// Runs once; later calls return `None`. Never blocks on suspended
    /// callers: they are woken and fail with `Closed`.
    pub fn dispose(&self) -> Option<DisposeReport> {
        let channels = self.registry.dispose()?;

        let mut report = DisposeReport::default();
        for channel in channels {
            let outcome = channel.close_and_drain();
            if outcome.closed_now {
                report.topics_closed += 1;
            } else {
                log::debug!("Topic '{}' already closed", channel.key());
                report.topics_already_closed += 1;
            }
            report.messages_discarded += outcome.discarded;
        }

        if report.messages_discarded > 0 {
            log::warn!(
                "Discarded {} undelivered message(s) during queue shutdown",
                report.messages_discarded
            );
        }
        log::log!(
            dispose_log_level(&report),
            "Queue disposed: {} topic(s) closed",
            report.topics_closed
        );

        Some(report)
    }
}

impl Cleanup for QueueManager {
    fn cleanup(&self) {
        self.dispose();
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Routing key for a topic: case-folded, rejected when blank
pub(crate) fn topic_key(topic: &str) -> QueueResult<String> {
    if topic.trim().is_empty() {
        return Err(QueueError::invalid_argument(
            QueueArgument::Topic,
            "topic cannot be empty or whitespace",
        ));
    }
    Ok(topic.to_lowercase())
}

/// Disposing a queue that never opened a topic is routine for short-lived
/// managers and stays at debug level
fn dispose_log_level(report: &DisposeReport) -> log::Level {
    if report.topics_closed > 0 {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

/// Enqueue `payload` on an already resolved channel
pub(crate) async fn send_to(
    channel: &TopicChannel,
    topic: &str,
    payload: Payload,
    cancel: &CancellationToken,
) -> QueueResult<Uuid> {
    let context = MessageContext::new(topic);
    let message_id = context.id();
    let payload_type = payload.type_name();

    channel.send(QueuedItem { payload, context }, cancel).await?;

    log::debug!(
        "Enqueued message {} on topic '{}' ({})",
        message_id,
        channel.key(),
        payload_type
    );
    Ok(message_id)
}

/// Dequeue the next item of an already resolved channel
pub(crate) async fn recv_from(
    channel: &TopicChannel,
    cancel: &CancellationToken,
) -> QueueResult<(Payload, MessageContext)> {
    let item = channel.recv(cancel).await?;
    log::debug!(
        "Dequeued message {} from topic '{}'",
        item.context.id(),
        channel.key()
    );
    Ok((item.payload, item.context))
}

pub(crate) fn into_typed<T: Any + Send>(
    payload: Payload,
    context: MessageContext,
) -> QueueResult<(T, MessageContext)> {
    match payload.downcast::<T>() {
        Ok(value) => Ok((value, context)),
        Err(payload) => {
            log::debug!(
                "Message {} on topic '{}' is {}, expected {}",
                context.id(),
                context.topic(),
                payload.type_name(),
                type_name::<T>()
            );
            Err(QueueError::TypeMismatch {
                expected: type_name::<T>(),
                actual: payload.type_name(),
                message_id: context.id(),
            })
        }
    }
}
