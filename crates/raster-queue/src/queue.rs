//! Fixed-capacity blocking ring buffer.
//!
//! One mutex guards the ring; two condition variables signal the not-full
//! and not-empty transitions. Each successful push or pop wakes a single
//! waiter on the opposite side, since one event frees at most one slot or
//! fills at most one.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use raster_core::RasterBuffer;
use tracing::{debug, trace};

use crate::config::QueueConfig;
use crate::error::QueueError;

/// Queue of frames handed from capture to processing threads.
pub type FrameQueue = BoundedQueue<RasterBuffer>;

/// Outcome of [`BoundedQueue::try_pop`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Pop<T> {
    /// An item arrived in time.
    Item(T),
    /// The timeout elapsed with the queue still empty.
    TimedOut,
}

impl<T> Pop<T> {
    /// Returns the item, if any.
    #[inline]
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(item) => Some(item),
            Self::TimedOut => None,
        }
    }

    /// Returns `true` if the wait expired.
    #[inline]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl<T> From<Pop<T>> for Option<T> {
    fn from(pop: Pop<T>) -> Self {
        pop.into_item()
    }
}

/// Ring state. `back == (front + count) % slots.len()` at every unlock.
struct Ring<T> {
    slots: Box<[Option<T>]>,
    front: usize,
    back: usize,
    count: usize,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            front: 0,
            back: 0,
            count: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    fn push_back(&mut self, item: T) {
        debug_assert!(!self.is_full());
        self.slots[self.back] = Some(item);
        self.back = (self.back + 1) % self.slots.len();
        self.count += 1;
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.front].take()?;
        self.front = (self.front + 1) % self.slots.len();
        self.count -= 1;
        Some(item)
    }
}

/// Bounded multi-producer multi-consumer hand-off queue.
///
/// [`push`](Self::push) blocks while the queue is full and
/// [`pop`](Self::pop) blocks while it is empty. Items are moved in and out,
/// never copied. Share the queue between threads with an
/// [`Arc`](std::sync::Arc).
///
/// An untimed `pop` waits forever if producers stop; consumers that need to
/// notice shutdown should loop on [`try_pop`](Self::try_pop).
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// use raster_queue::{BoundedQueue, Pop};
///
/// let queue = Arc::new(BoundedQueue::new(2).unwrap());
/// let producer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || (0..5).for_each(|i| queue.push(i)))
/// };
///
/// let received: Vec<i32> = (0..5).map(|_| queue.pop()).collect();
/// producer.join().unwrap();
/// assert_eq!(received, [0, 1, 2, 3, 4]);
/// assert_eq!(queue.try_pop(Duration::ZERO), Pop::TimedOut);
/// ```
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    label: String,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue with `capacity` slots and the default label.
    ///
    /// # Errors
    ///
    /// [`QueueError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Self::from_config(&QueueConfig::default().with_capacity(capacity))
    }

    /// Creates a queue from a [`QueueConfig`].
    pub fn from_config(config: &QueueConfig) -> Result<Self, QueueError> {
        if config.capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        debug!(queue = %config.label, capacity = config.capacity, "creating bounded queue");
        Ok(Self {
            ring: Mutex::new(Ring::new(config.capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity: config.capacity,
            label: config.label.clone(),
        })
    }

    /// Ring state is consistent whenever the lock is released, so a panic
    /// in another holder cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `item` into the queue, blocking while it is full.
    pub fn push(&self, item: T) {
        let mut ring = self
            .not_full
            .wait_while(self.lock(), |ring| ring.is_full())
            .unwrap_or_else(PoisonError::into_inner);
        ring.push_back(item);
        trace!(queue = %self.label, count = ring.count, capacity = self.capacity, "push");
        drop(ring);
        self.not_empty.notify_one();
    }

    /// Takes the oldest item, blocking while the queue is empty.
    pub fn pop(&self) -> T {
        let mut ring = self.lock();
        loop {
            if let Some(item) = ring.pop_front() {
                trace!(queue = %self.label, count = ring.count, capacity = self.capacity, "pop");
                drop(ring);
                self.not_full.notify_one();
                return item;
            }
            ring = self.not_empty.wait(ring).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Takes the oldest item, waiting at most `timeout` for one to arrive.
    ///
    /// `Duration::ZERO` polls without waiting.
    pub fn try_pop(&self, timeout: Duration) -> Pop<T> {
        let (mut ring, _) = self
            .not_empty
            .wait_timeout_while(self.lock(), timeout, |ring| ring.count == 0)
            .unwrap_or_else(PoisonError::into_inner);
        match ring.pop_front() {
            Some(item) => {
                trace!(queue = %self.label, count = ring.count, capacity = self.capacity, "pop");
                drop(ring);
                self.not_full.notify_one();
                Pop::Item(item)
            }
            None => {
                debug!(queue = %self.label, ?timeout, "pop timed out");
                Pop::TimedOut
            }
        }
    }

    /// Number of queued items at the time of the call.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a push would block.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Label used in trace events.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
