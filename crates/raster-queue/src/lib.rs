//! # raster-queue
//!
//! Bounded blocking hand-off of frames between threads.
//!
//! A capture thread pushes [`RasterBuffer`](raster_core::RasterBuffer)s into
//! a [`FrameQueue`]; processing threads pop them. A full queue blocks the
//! producer, which is the pipeline's backpressure. Frames are moved through
//! the queue, never copied.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use raster_core::{PixelDataType, RasterBuffer, Size2D};
//! use raster_queue::{FrameQueue, Pop};
//!
//! let queue = FrameQueue::new(4).unwrap();
//! queue.push(RasterBuffer::with_size(PixelDataType::U8, Size2D::new(640, 480), 3).unwrap());
//!
//! match queue.try_pop(Duration::from_millis(10)) {
//!     Pop::Item(frame) => assert_eq!(frame.width(), 640),
//!     Pop::TimedOut => unreachable!(),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for [`QueueConfig`]

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod queue;

pub use config::QueueConfig;
pub use error::QueueError;
pub use queue::{BoundedQueue, FrameQueue, Pop};
