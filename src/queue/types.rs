//! Status and report types for the queue system

use serde::Serialize;

/// Result of disposing a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisposeReport {
    /// Channels closed by this dispose
    pub topics_closed: usize,
    /// Channels that were already closed, skipped without error
    pub topics_already_closed: usize,
    /// Undelivered messages dropped while draining
    pub messages_discarded: usize,
}

/// Queue depth of one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicStats {
    /// Case-folded topic key
    pub topic: String,
    pub queued: usize,
    pub capacity: usize,
}

/// Snapshot of the whole queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub capacity: usize,
    pub disposed: bool,
    pub topics: Vec<TopicStats>,
}

impl QueueStats {
    pub fn total_queued(&self) -> usize {
        self.topics.iter().map(|t| t.queued).sum()
    }
}
