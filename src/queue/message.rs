//! Message types carried by topic channels
//!
//! A queued item is a type-erased [`Payload`] paired with the
//! [`MessageContext`] created when it was enqueued.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;
use uuid::Uuid;

/// Metadata attached to every enqueued message
///
/// Created once at enqueue time and never modified. `topic` keeps the
/// caller's spelling even though routing ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContext {
    id: Uuid,
    topic: String,
    enqueued_at: DateTime<Utc>,
}

impl MessageContext {
    pub(crate) fn new(topic: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            enqueued_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Topic as originally supplied by the producer
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }
}

/// Type-erased message payload
///
/// Holds the value together with the name of its concrete type so a
/// consumer can check what it received before downcasting.
///
/// # Example
///
/// ```rust
/// use topicq::queue::Payload;
///
/// let payload = Payload::new(42_u32);
/// assert!(payload.is::<u32>());
/// assert_eq!(payload.type_name(), "u32");
///
/// let payload = payload.downcast::<String>().unwrap_err();
/// assert_eq!(payload.downcast::<u32>().unwrap(), 42);
/// ```
pub struct Payload {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the concrete type stored in this payload
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the value out as `T`, or get the payload back unchanged
    pub fn downcast<T: Any>(self) -> Result<T, Payload> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|value| Payload { value, type_name })
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Payload and context held by a topic channel between enqueue and dequeue
#[derive(Debug)]
pub(crate) struct QueuedItem {
    pub(crate) payload: Payload,
    pub(crate) context: MessageContext,
}

/// A dequeued message with strongly-typed content
#[derive(Debug, Clone)]
pub struct TypedMessage<T> {
    pub context: MessageContext,
    pub content: T,
}

impl<T> TypedMessage<T> {
    pub fn id(&self) -> Uuid {
        self.context.id()
    }

    pub fn topic(&self) -> &str {
        self.context.topic()
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.context.enqueued_at()
    }

    pub fn into_parts(self) -> (T, MessageContext) {
        (self.content, self.context)
    }
}
