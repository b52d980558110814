//! Synchronization helpers for lock poisoning
//!
//! Queue operations turn a poisoned lock into a domain error so the caller
//! gets a definite failure. Teardown paths instead recover the guard, since
//! shutdown must reach every channel even after a panic elsewhere.

use std::sync::{LockResult, PoisonError};

/// Convert a poisoned lock result into an application error
///
/// Works for `Mutex::lock`, `RwLock::read` and `RwLock::write` alike.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use topicq::core::sync::lock_or_error;
/// use topicq::queue::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_or_error(mutex.lock(), "topic channel", |message| {
///     QueueError::OperationFailed { message }
/// })
/// .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn lock_or_error<G, E>(
    result: LockResult<G>,
    lock_name: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<G, E> {
    result.map_err(|_| {
        error_constructor(format!(
            "Internal synchronisation error: {lock_name} lock poisoned by a panic in another task"
        ))
    })
}

/// Take the guard even if the lock was poisoned
///
/// Only for teardown and read-only status checks, where a half-updated
/// value cannot cause further damage.
pub fn lock_or_recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(|poisoned: PoisonError<G>| {
        log::warn!("Recovering poisoned lock");
        poisoned.into_inner()
    })
}
