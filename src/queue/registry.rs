//! Topic registry: one channel per case-folded topic name
//!
//! Channels are created lazily under a write lock with a double check, so
//! concurrent first use of a topic always agrees on a single channel. Steady
//! state lookups only take the read lock, and channel traffic never touches
//! the registry lock at all.

use crate::core::sync::{lock_or_error, lock_or_recover};
use crate::queue::channel::TopicChannel;
use crate::queue::error::{QueueError, QueueResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
enum RegistryState {
    Active(HashMap<String, Arc<TopicChannel>>),
    Disposed,
}

#[derive(Debug)]
pub(crate) struct TopicRegistry {
    capacity: usize,
    state: RwLock<RegistryState>,
}

impl TopicRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: RwLock::new(RegistryState::Active(HashMap::new())),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the channel for `key`, creating it on first use
    ///
    /// `key` must already be case-folded. Fails with `InvalidState` once
    /// shutdown has begun.
    pub(crate) fn resolve(&self, key: &str) -> QueueResult<Arc<TopicChannel>> {
        {
            let state = lock_or_error(self.state.read(), "topic registry", poisoned)?;
            match &*state {
                RegistryState::Disposed => return Err(QueueError::disposed()),
                RegistryState::Active(channels) => {
                    if let Some(channel) = channels.get(key) {
                        return Ok(Arc::clone(channel));
                    }
                }
            }
        }

        let mut state = lock_or_error(self.state.write(), "topic registry", poisoned)?;
        match &mut *state {
            RegistryState::Disposed => Err(QueueError::disposed()),
            RegistryState::Active(channels) => {
                let capacity = self.capacity;
                let channel = channels.entry(key.to_string()).or_insert_with(|| {
                    log::trace!("Creating topic channel '{}' (capacity {})", key, capacity);
                    Arc::new(TopicChannel::new(key.to_string(), capacity))
                });
                Ok(Arc::clone(channel))
            }
        }
    }

    /// Look up an existing channel without creating one
    pub(crate) fn get(&self, key: &str) -> QueueResult<Option<Arc<TopicChannel>>> {
        let state = lock_or_error(self.state.read(), "topic registry", poisoned)?;
        match &*state {
            RegistryState::Disposed => Err(QueueError::disposed()),
            RegistryState::Active(channels) => Ok(channels.get(key).cloned()),
        }
    }

    /// Channels currently registered, ordered by key
    pub(crate) fn channels(&self) -> QueueResult<Vec<Arc<TopicChannel>>> {
        let state = lock_or_error(self.state.read(), "topic registry", poisoned)?;
        match &*state {
            RegistryState::Disposed => Ok(Vec::new()),
            RegistryState::Active(channels) => {
                let mut list: Vec<_> = channels.values().cloned().collect();
                list.sort_by(|a, b| a.key().cmp(b.key()));
                Ok(list)
            }
        }
    }

    pub(crate) fn topic_count(&self) -> QueueResult<usize> {
        let state = lock_or_error(self.state.read(), "topic registry", poisoned)?;
        Ok(match &*state {
            RegistryState::Disposed => 0,
            RegistryState::Active(channels) => channels.len(),
        })
    }

    pub(crate) fn is_disposed(&self) -> bool {
        matches!(
            *lock_or_recover(self.state.read()),
            RegistryState::Disposed
        )
    }

    /// Switch to `Disposed` and hand back every channel for draining
    ///
    /// Returns `None` if the registry was already disposed. After this call
    /// no new channel can be created, so the returned list is complete.
    pub(crate) fn dispose(&self) -> Option<Vec<Arc<TopicChannel>>> {
        let mut state = lock_or_recover(self.state.write());
        match std::mem::replace(&mut *state, RegistryState::Disposed) {
            RegistryState::Disposed => None,
            RegistryState::Active(mut channels) => {
                Some(channels.drain().map(|(_, channel)| channel).collect())
            }
        }
    }
}

fn poisoned(message: String) -> QueueError {
    QueueError::OperationFailed { message }
}
