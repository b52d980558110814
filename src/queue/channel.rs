//! Bounded FIFO channel backing a single topic
//!
//! Items live in a `VecDeque` behind a mutex; producers and consumers that
//! cannot proceed wait on separate `not_full` / `not_empty` notifications.
//! Every state change happens under the lock, so a cancelled or dropped
//! send/recv either completed fully or left the channel untouched.

use crate::core::sync::{lock_or_error, lock_or_recover};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::message::QueuedItem;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct ChannelState {
    items: VecDeque<QueuedItem>,
    closed: bool,
}

/// Outcome of closing and draining one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DrainOutcome {
    /// False when the channel had already been closed
    pub(crate) closed_now: bool,
    pub(crate) discarded: usize,
}

#[derive(Debug)]
pub(crate) struct TopicChannel {
    key: String,
    capacity: usize,
    state: Mutex<ChannelState>,
    not_empty: Notify,
    not_full: Notify,
}

impl TopicChannel {
    /// `capacity` must be non-zero; the registry validates it once up front
    pub(crate) fn new(key: String, capacity: usize) -> Self {
        debug_assert!(capacity > 0, "topic channel capacity must be positive");
        Self {
            key,
            capacity,
            state: Mutex::new(ChannelState {
                items: VecDeque::with_capacity(capacity.min(64)),
                closed: false,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> QueueResult<usize> {
        Ok(self.lock_state()?.items.len())
    }

    /// Append an item, suspending while the channel is full
    ///
    /// Fails with `Closed` once the channel is closed and `Cancelled` if the
    /// token fires first; in both cases the item is dropped, never queued.
    pub(crate) async fn send(
        &self,
        item: QueuedItem,
        cancel: &CancellationToken,
    ) -> QueueResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }

            // Register interest before inspecting state so a slot freed in
            // between is not missed
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock_state()?;
                if state.closed {
                    return Err(self.closed_error());
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(item);
                    drop(state);
                    self.not_empty.notify_one();
                    return Ok(());
                }
            }

            log::trace!("Topic '{}' full, producer waiting", self.key);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Remove the oldest item, suspending while the channel is empty
    pub(crate) async fn recv(&self, cancel: &CancellationToken) -> QueueResult<QueuedItem> {
        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }

            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_recv()? {
                return Ok(item);
            }

            log::trace!("Topic '{}' empty, consumer waiting", self.key);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Remove the oldest item without waiting
    ///
    /// `Ok(None)` means the channel is open but empty.
    pub(crate) fn try_recv(&self) -> QueueResult<Option<QueuedItem>> {
        let mut state = self.lock_state()?;
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                self.not_full.notify_one();
                Ok(Some(item))
            }
            None if state.closed => Err(self.closed_error()),
            None => Ok(None),
        }
    }

    /// Close the channel and discard whatever is still queued
    ///
    /// Wakes every suspended sender and receiver so they observe `Closed`.
    /// Closing twice is harmless. Never fails: a poisoned lock is recovered
    /// because the items are being thrown away regardless.
    pub(crate) fn close_and_drain(&self) -> DrainOutcome {
        let discarded: Vec<QueuedItem>;
        let closed_now;
        {
            let mut state = lock_or_recover(self.state.lock());
            closed_now = !state.closed;
            state.closed = true;
            discarded = state.items.drain(..).collect();
        }

        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();

        // Payloads are dropped outside the lock
        let count = discarded.len();
        drop(discarded);

        DrainOutcome {
            closed_now,
            discarded: count,
        }
    }

    fn lock_state(&self) -> QueueResult<MutexGuard<'_, ChannelState>> {
        lock_or_error(self.state.lock(), "topic channel", |message| {
            QueueError::OperationFailed { message }
        })
    }

    fn closed_error(&self) -> QueueError {
        QueueError::Closed {
            topic: self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::message::{MessageContext, Payload};
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    fn item(value: u32) -> QueuedItem {
        QueuedItem {
            payload: Payload::new(value),
            context: MessageContext::new("test"),
        }
    }

    fn value_of(item: QueuedItem) -> u32 {
        item.payload.downcast::<u32>().unwrap()
    }

    #[tokio::test]
    async fn test_send_recv_preserves_fifo_order() {
        let channel = TopicChannel::new("test".to_string(), 4);
        let token = CancellationToken::new();

        for value in 1..=3 {
            channel.send(item(value), &token).await.unwrap();
        }
        assert_eq!(channel.len().unwrap(), 3);

        for expected in 1..=3 {
            assert_eq!(value_of(channel.recv(&token).await.unwrap()), expected);
        }
        assert_eq!(channel.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_waits_for_free_slot() {
        let channel = Arc::new(TopicChannel::new("test".to_string(), 1));
        let token = CancellationToken::new();
        channel.send(item(1), &token).await.unwrap();

        let sender = {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move { channel.send(item(2), &CancellationToken::new()).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!sender.is_finished(), "send should wait while channel is full");

        assert_eq!(value_of(channel.recv(&token).await.unwrap()), 1);
        timeout(Duration::from_secs(1), sender)
            .await
            .expect("sender should be released")
            .unwrap()
            .unwrap();
        assert_eq!(value_of(channel.recv(&token).await.unwrap()), 2);
    }

    #[tokio::test]
    async fn test_cancelled_send_leaves_channel_untouched() {
        let channel = TopicChannel::new("test".to_string(), 1);
        let token = CancellationToken::new();
        channel.send(item(1), &token).await.unwrap();

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = channel.send(item(2), &cancel).await;
        assert!(matches!(result, Err(QueueError::Cancelled)));
        assert_eq!(channel.len().unwrap(), 1);
        assert_eq!(value_of(channel.recv(&token).await.unwrap()), 1);
    }

    #[tokio::test]
    async fn test_recv_with_cancelled_token_consumes_nothing() {
        let channel = TopicChannel::new("test".to_string(), 2);
        channel.send(item(7), &CancellationToken::new()).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            channel.recv(&cancel).await,
            Err(QueueError::Cancelled)
        ));
        assert_eq!(channel.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_releases_waiting_receiver() {
        let channel = Arc::new(TopicChannel::new("test".to_string(), 1));
        let receiver = {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move { channel.recv(&CancellationToken::new()).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        channel.close_and_drain();

        let result = timeout(Duration::from_secs(1), receiver)
            .await
            .expect("receiver should be released")
            .unwrap();
        assert!(matches!(result, Err(QueueError::Closed { .. })));
    }

    #[tokio::test]
    async fn test_close_releases_waiting_sender() {
        let channel = Arc::new(TopicChannel::new("test".to_string(), 1));
        channel.send(item(1), &CancellationToken::new()).await.unwrap();

        let sender = {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move { channel.send(item(2), &CancellationToken::new()).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let outcome = channel.close_and_drain();
        assert_eq!(
            outcome,
            DrainOutcome {
                closed_now: true,
                discarded: 1
            }
        );

        let result = timeout(Duration::from_secs(1), sender)
            .await
            .expect("sender should be released")
            .unwrap();
        assert!(matches!(result, Err(QueueError::Closed { .. })));
    }

    #[tokio::test]
    async fn test_close_twice_is_benign() {
        let channel = TopicChannel::new("test".to_string(), 3);
        channel.send(item(1), &CancellationToken::new()).await.unwrap();

        assert_eq!(channel.close_and_drain().discarded, 1);
        let second = channel.close_and_drain();
        assert!(!second.closed_now);
        assert_eq!(second.discarded, 0);
        assert!(matches!(channel.try_recv(), Err(QueueError::Closed { .. })));
    }

    #[test]
    fn test_try_recv_on_empty_channel() {
        let channel = TopicChannel::new("test".to_string(), 3);
        assert!(channel.try_recv().unwrap().is_none());
        assert_eq!(channel.capacity(), 3);
        assert_eq!(channel.key(), "test");
    }
}
