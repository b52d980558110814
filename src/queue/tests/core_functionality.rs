//! Tests for core enqueue/dequeue behaviour

#[cfg(test)]
mod tests {
    use crate::queue::api::{Payload, QueueManager};
    use std::time::Duration;
    use tokio::time::timeout;

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u32,
        item: String,
    }

    #[tokio::test]
    async fn test_enqueue_dequeue_round_trip_keeps_payload_and_topic() {
        let manager = QueueManager::new(10).unwrap();
        let order = Order {
            id: 7,
            item: "widget".to_string(),
        };

        let id = manager.enqueue("Orders", order.clone()).await.unwrap();
        let (received, context) = manager.dequeue::<Order>("Orders").await.unwrap();

        assert_eq!(received, order);
        assert_eq!(context.id(), id);
        assert_eq!(context.topic(), "Orders");
    }

    #[tokio::test]
    async fn test_fifo_order_within_topic() {
        let manager = QueueManager::new(10).unwrap();
        for value in ["A", "B", "C"] {
            manager.enqueue("t", value.to_string()).await.unwrap();
        }

        let mut received = Vec::new();
        for _ in 0..3 {
            let (value, _) = manager.dequeue::<String>("t").await.unwrap();
            received.push(value);
        }
        assert_eq!(received, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let manager = QueueManager::new(10).unwrap();
        manager.enqueue("x", 1_u32).await.unwrap();

        assert!(manager.try_dequeue::<u32>("y").unwrap().is_none());
        let blocked = timeout(Duration::from_millis(50), manager.dequeue::<u32>("y")).await;
        assert!(blocked.is_err(), "dequeue on 'y' must not see items of 'x'");

        let (value, _) = manager.dequeue::<u32>("x").await.unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_topic_routing_is_case_insensitive() {
        let manager = QueueManager::new(10).unwrap();
        manager.enqueue("Orders", 99_i64).await.unwrap();
        manager.enqueue("ORDERS", 100_i64).await.unwrap();

        let (first, first_ctx) = manager.dequeue::<i64>("orders").await.unwrap();
        let (second, second_ctx) = manager.dequeue::<i64>("oRdErS").await.unwrap();

        assert_eq!((first, second), (99, 100));
        assert_eq!(first_ctx.topic(), "Orders");
        assert_eq!(second_ctx.topic(), "ORDERS");
        assert_eq!(manager.topic_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dequeue_payload_skips_type_validation() {
        let manager = QueueManager::new(10).unwrap();
        manager.enqueue("t", 5_i32).await.unwrap();

        let cancel = crate::queue::api::CancellationToken::new();
        let (payload, context): (Payload, _) = manager.dequeue_payload("t", &cancel).await.unwrap();

        assert!(payload.is::<i32>());
        assert_eq!(payload.downcast_ref::<i32>(), Some(&5));
        assert_eq!(context.topic(), "t");
    }

    #[tokio::test]
    async fn test_heterogeneous_payloads_share_a_topic() {
        let manager = QueueManager::new(10).unwrap();
        manager.enqueue("mixed", 1_u8).await.unwrap();
        manager.enqueue("mixed", "two".to_string()).await.unwrap();

        let (first, _) = manager.dequeue::<u8>("mixed").await.unwrap();
        let (second, _) = manager.dequeue::<String>("mixed").await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, "two");
    }

    #[tokio::test]
    async fn test_context_timestamps_are_monotonic_per_topic() {
        let manager = QueueManager::new(10).unwrap();
        manager.enqueue("t", 1_u32).await.unwrap();
        manager.enqueue("t", 2_u32).await.unwrap();

        let (_, first) = manager.dequeue::<u32>("t").await.unwrap();
        let (_, second) = manager.dequeue::<u32>("t").await.unwrap();
        assert!(first.enqueued_at() <= second.enqueued_at());
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_queued_and_stats_track_depth() {
        let manager = QueueManager::new(10).unwrap();
        assert_eq!(manager.queued("Beta").unwrap(), 0);
        assert_eq!(manager.topic_count().unwrap(), 0);

        manager.enqueue("Beta", 1_u32).await.unwrap();
        manager.enqueue("beta", 2_u32).await.unwrap();
        manager.enqueue("alpha", 3_u32).await.unwrap();

        assert_eq!(manager.queued("BETA").unwrap(), 2);

        let stats = manager.stats().unwrap();
        assert_eq!(stats.capacity, 10);
        assert!(!stats.disposed);
        assert_eq!(stats.total_queued(), 3);
        let topics: Vec<_> = stats.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(topics, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_try_dequeue_returns_none_when_empty() {
        let manager = QueueManager::new(2).unwrap();
        assert!(manager.try_dequeue::<u32>("empty").unwrap().is_none());

        manager.enqueue("empty", 4_u32).await.unwrap();
        let (value, _) = manager.try_dequeue::<u32>("empty").unwrap().unwrap();
        assert_eq!(value, 4);
    }
}
