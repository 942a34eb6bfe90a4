//! Queue configuration.

/// Default number of slots.
pub const DEFAULT_CAPACITY: usize = 8;

/// Default label used in log output.
pub const DEFAULT_LABEL: &str = "frames";

/// Settings for a [`BoundedQueue`](crate::BoundedQueue).
///
/// # Example
///
/// ```rust
/// use raster_queue::{FrameQueue, QueueConfig};
///
/// let config = QueueConfig::default().with_capacity(2).with_label("capture");
/// let queue = FrameQueue::from_config(&config).unwrap();
/// assert_eq!(queue.capacity(), 2);
/// assert_eq!(queue.label(), "capture");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    /// Number of slots; the producer blocks once they are all full.
    pub capacity: usize,
    /// Name attached to the queue's trace events.
    pub label: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl QueueConfig {
    /// Sets the slot count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the log label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.label, "frames");
    }

    #[test]
    fn test_builder() {
        let config = QueueConfig::default().with_capacity(3).with_label(String::from("decode"));
        assert_eq!(config, QueueConfig { capacity: 3, label: "decode".into() });
    }
}
