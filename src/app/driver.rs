//! Load driver: concurrent producers and consumers over one QueueManager
//!
//! Producer `j` sends its `i`-th message to topic `(j + i) mod T`, so the
//! number of messages each topic receives is known before the run starts.
//! Consumer `c` serves topic `c mod T` and claims messages from that topic's
//! budget before dequeuing, so every consumer stops once its topic is
//! exhausted and no consumer waits on a topic that will never be written.

use crate::app::cli::Args;
use crate::core::validation::{validate_topic_list, ValidationError};
use crate::core::version::default_topic_capacity;
use crate::queue::{QueueError, QueueManager, QueueResult};
use colored::Colorize;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const DEFAULT_TOPIC: &str = "events";
const DEFAULT_PRODUCERS: usize = 2;
const DEFAULT_MESSAGES: usize = 1000;

/// Shape of one driver run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverPlan {
    pub topics: Vec<String>,
    pub producers: usize,
    pub consumers: usize,
    /// Messages sent by each producer
    pub messages: usize,
    pub capacity: usize,
}

impl DriverPlan {
    /// Build a plan from parsed arguments, filling defaults for unset values
    ///
    /// Consumers default to one per topic.
    pub fn from_args(args: &Args) -> Result<Self, ValidationError> {
        let topics = if args.topics.is_empty() {
            vec![DEFAULT_TOPIC.to_string()]
        } else {
            validate_topic_list(&args.topics)?
        };

        let plan = Self {
            consumers: args.consumers.unwrap_or(topics.len()),
            producers: args.producers.unwrap_or(DEFAULT_PRODUCERS),
            messages: args.messages.unwrap_or(DEFAULT_MESSAGES),
            capacity: args.capacity.unwrap_or_else(default_topic_capacity),
            topics,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topics.is_empty() {
            return Err(ValidationError::new("At least one topic is required"));
        }
        if self.producers == 0 || self.messages == 0 || self.capacity == 0 {
            return Err(ValidationError::new(
                "Producers, messages and capacity must be greater than 0",
            ));
        }
        if self.producers.checked_mul(self.messages).is_none() {
            return Err(ValidationError::new(format!(
                "{} producers sending {} messages each is too many messages in total",
                self.producers, self.messages
            )));
        }
        if self.consumers < self.topics.len() {
            return Err(ValidationError::new(format!(
                "Need at least one consumer per topic ({} topics, {} consumers)",
                self.topics.len(),
                self.consumers
            )));
        }
        Ok(())
    }

    /// Saturates for plans that failed validation
    pub fn total_messages(&self) -> usize {
        self.producers.saturating_mul(self.messages)
    }

    /// Messages routed to the topic at `index` over the whole run
    pub fn messages_for_topic(&self, index: usize) -> usize {
        let topic_count = self.topics.len();
        (0..self.producers)
            .map(|producer| {
                let first = (index + topic_count - producer % topic_count) % topic_count;
                if first < self.messages {
                    (self.messages - first - 1) / topic_count + 1
                } else {
                    0
                }
            })
            .sum()
    }
}

/// Payload published by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMessage {
    pub producer: usize,
    pub sequence: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicReport {
    pub topic: String,
    pub produced: usize,
    pub consumed: usize,
}

/// Summary of a driver run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub capacity: usize,
    pub producers: usize,
    pub consumers: usize,
    pub produced: usize,
    pub consumed: usize,
    pub topics: Vec<TopicReport>,
    pub elapsed_ms: u64,
    /// True when a shutdown signal stopped the run early
    pub interrupted: bool,
}

impl DriverReport {
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.consumed == self.produced
    }

    pub fn render_text(&self, use_color: bool) -> String {
        let heading = |text: &str| {
            if use_color {
                text.bold().to_string()
            } else {
                text.to_string()
            }
        };
        let status = match (self.interrupted, use_color) {
            (true, true) => "interrupted".yellow().to_string(),
            (true, false) => "interrupted".to_string(),
            (false, true) => "complete".green().to_string(),
            (false, false) => "complete".to_string(),
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{} {} ({} ms)\n",
            heading("Run"),
            status,
            self.elapsed_ms
        ));
        out.push_str(&format!(
            "  producers {}, consumers {}, capacity {}\n",
            self.producers, self.consumers, self.capacity
        ));
        out.push_str(&format!(
            "  produced {}, consumed {}\n",
            self.produced, self.consumed
        ));
        out.push_str(&format!("{}\n", heading("Topics")));
        for topic in &self.topics {
            out.push_str(&format!(
                "  {:<20} produced {:>8}  consumed {:>8}\n",
                topic.topic, topic.produced, topic.consumed
            ));
        }
        out
    }
}

#[derive(Debug, Default)]
struct TopicCounters {
    budget: AtomicUsize,
    produced: AtomicUsize,
    consumed: AtomicUsize,
}

/// Run `plan` against `manager` until all messages are consumed or a
/// shutdown signal arrives
///
/// On shutdown the driver cancels its own tasks; tasks already suspended
/// inside the queue are released by the queue being disposed.
pub async fn run(
    manager: Arc<QueueManager>,
    plan: &DriverPlan,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> QueueResult<DriverReport> {
    let started = Instant::now();
    let cancel = CancellationToken::new();
    let topics: Arc<Vec<String>> = Arc::new(plan.topics.clone());
    let counters: Arc<Vec<TopicCounters>> = Arc::new(
        (0..topics.len())
            .map(|index| TopicCounters {
                budget: AtomicUsize::new(plan.messages_for_topic(index)),
                ..Default::default()
            })
            .collect(),
    );

    log::info!(
        "Driving {} producer(s) and {} consumer(s) over {} topic(s), {} message(s) in total",
        plan.producers,
        plan.consumers,
        topics.len(),
        plan.total_messages()
    );

    let mut tasks: JoinSet<QueueResult<()>> = JoinSet::new();

    for consumer in 0..plan.consumers {
        let index = consumer % topics.len();
        let manager = Arc::clone(&manager);
        let topics = Arc::clone(&topics);
        let counters = Arc::clone(&counters);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let topic = &topics[index];
            let slot = &counters[index];
            while slot
                .budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                let (message, _) = manager
                    .dequeue_with_cancel::<LoadMessage>(topic, &cancel)
                    .await?;
                slot.consumed.fetch_add(1, Ordering::Relaxed);
                log::trace!(
                    "Consumer {} took message {} of producer {} from '{}'",
                    consumer,
                    message.sequence,
                    message.producer,
                    topic
                );
            }
            log::debug!("Consumer {} finished topic '{}'", consumer, topic);
            Ok(())
        });
    }

    for producer in 0..plan.producers {
        let manager = Arc::clone(&manager);
        let topics = Arc::clone(&topics);
        let counters = Arc::clone(&counters);
        let cancel = cancel.clone();
        let messages = plan.messages;
        tasks.spawn(async move {
            for sequence in 0..messages {
                let index = (producer + sequence) % topics.len();
                manager
                    .enqueue_with_cancel(
                        &topics[index],
                        LoadMessage { producer, sequence },
                        &cancel,
                    )
                    .await?;
                counters[index].produced.fetch_add(1, Ordering::Relaxed);
            }
            log::debug!("Producer {} finished", producer);
            Ok(())
        });
    }

    let interrupted = loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                log::warn!("Shutdown requested, stopping producers and consumers");
                cancel.cancel();
                break true;
            }
            joined = tasks.join_next() => match joined {
                Some(result) => {
                    if let Err(e) = flatten(result) {
                        cancel.cancel();
                        tasks.shutdown().await;
                        return Err(e);
                    }
                }
                None => break false,
            },
        }
    };

    if interrupted {
        while let Some(result) = tasks.join_next().await {
            match flatten(result) {
                Ok(()) | Err(QueueError::Cancelled) => {}
                Err(e) if e.is_shutdown() => {}
                Err(e) => return Err(e),
            }
        }
    }

    let topic_reports: Vec<TopicReport> = topics
        .iter()
        .zip(counters.iter())
        .map(|(topic, slot)| TopicReport {
            topic: topic.clone(),
            produced: slot.produced.load(Ordering::Relaxed),
            consumed: slot.consumed.load(Ordering::Relaxed),
        })
        .collect();

    let report = DriverReport {
        capacity: plan.capacity,
        producers: plan.producers,
        consumers: plan.consumers,
        produced: topic_reports.iter().map(|t| t.produced).sum(),
        consumed: topic_reports.iter().map(|t| t.consumed).sum(),
        topics: topic_reports,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        interrupted,
    };

    log::info!(
        "Run {}: produced {}, consumed {} in {} ms",
        if interrupted { "interrupted" } else { "complete" },
        report.produced,
        report.consumed,
        report.elapsed_ms
    );
    Ok(report)
}

fn flatten(result: Result<QueueResult<()>, tokio::task::JoinError>) -> QueueResult<()> {
    result.map_err(|e| QueueError::OperationFailed {
        message: format!("driver task failed: {}", e),
    })?
}
