//! Generic Cleanup Interface
//!
//! Lets the shutdown coordinator release resources it does not own the
//! details of. The queue manager implements it so that a signal-triggered
//! shutdown disposes every topic channel.

/// Resource that can be released on shutdown
///
/// Implementations must be idempotent: the coordinator runs each registered
/// cleanup once, but owners may also release the resource themselves.
pub trait Cleanup: Send + Sync {
    /// Release all resources managed by this instance
    fn cleanup(&self);
}
