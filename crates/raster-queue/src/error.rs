//! Error types for queue construction.

use thiserror::Error;

/// Errors from building a [`BoundedQueue`](crate::BoundedQueue).
///
/// Blocking operations never fail; an expired timed pop is reported as
/// [`Pop::TimedOut`](crate::Pop::TimedOut), not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A queue needs at least one slot.
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}
