//! Public API for the queue system
//!
//! External modules should import from here rather than directly from
//! internal modules. See the module documentation for usage examples.

// Core queue components
pub use crate::queue::config::QueueConfig;
pub use crate::queue::consumer::TopicConsumer;
pub use crate::queue::manager::QueueManager;
pub use crate::queue::publisher::TopicPublisher;

// Message types
pub use crate::queue::message::{MessageContext, Payload, TypedMessage};

// Error handling
pub use crate::queue::error::{QueueArgument, QueueError, QueueResult};

// Statistics and reports
pub use crate::queue::types::{DisposeReport, QueueStats, TopicStats};

// Cancellation tokens accepted by the `*_with_cancel` operations
pub use tokio_util::sync::CancellationToken;
