//! Topic-Multiplexed Queue Component
//!
//! An in-process message queue that routes messages by topic name into
//! independent bounded FIFO channels.
//!
//! # Overview
//!
//! - **Topics on demand**: the first enqueue or dequeue on a name creates its channel
//! - **Case-insensitive routing**: `"Orders"` and `"orders"` share one channel
//! - **Bounded**: every topic holds at most `capacity` messages; producers wait for room
//! - **Any payload**: values are type-erased on enqueue and validated on dequeue
//! - **Competing consumers**: each message is delivered to exactly one consumer
//! - **Cancellable waits**: every suspending call has a `*_with_cancel` form
//! - **Terminal shutdown**: `dispose` closes every topic and wakes all waiters
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Producer A  │     │  Producer B  │     │  Producer C  │
//! └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!        │ "Orders"           │ "orders"           │ "audit"
//!        ▼                    ▼                    ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                      QueueManager                       │
//! │   topic_key(): validate + case-fold, attach context     │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │          TopicRegistry (Active | Disposed)        │  │
//! │  │   "orders" ─► ┌───┬───┬───┬───┐  (capacity N)     │  │
//! │  │               │ 1 │ 2 │ 3 │   │                   │  │
//! │  │               └───┴───┴───┴───┘                   │  │
//! │  │   "audit"  ─► ┌───┬───┬───┬───┐                   │  │
//! │  │               │ 1 │   │   │   │                   │  │
//! │  │               └───┴───┴───┴───┘                   │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └────────┬───────────────────┬───────────────────┬────────┘
//!          │ dequeue::<T>      │ dequeue::<T>      │ dequeue_payload
//! ┌────────┴──┐          ┌─────┴─────┐       ┌─────┴─────┐
//! │Consumer A │          │Consumer B │       │Consumer C │ (competing)
//! └───────────┘          └───────────┘       └───────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use topicq::queue::{QueueConfig, QueueManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = QueueManager::create(QueueConfig::with_capacity(64))?;
//!
//! let publisher = manager.create_publisher("Events")?;
//! publisher.publish(String::from("started")).await?;
//!
//! let consumer = manager.create_consumer::<String>("events")?;
//! let message = consumer.recv().await?;
//! assert_eq!(message.content, "started");
//! assert_eq!(message.topic(), "Events");
//!
//! let report = manager.dispose();
//! println!("{:?}", report);
//! # Ok(())
//! # }
//! ```

pub mod api;
mod channel;
mod config;
mod consumer;
mod error;
mod manager;
mod message;
mod publisher;
mod registry;
mod types;

pub use config::QueueConfig;
pub use consumer::TopicConsumer;
pub use error::{QueueArgument, QueueError, QueueResult};
pub use manager::QueueManager;
pub use message::{MessageContext, Payload, TypedMessage};
pub use publisher::TopicPublisher;
pub use types::{DisposeReport, QueueStats, TopicStats};

#[cfg(test)]
mod tests;
