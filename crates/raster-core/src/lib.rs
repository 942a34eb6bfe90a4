//! # raster-core
//!
//! Byte-exact raster frame storage for capture and processing pipelines.
//!
//! This crate provides the foundational types used throughout raster-rs:
//!
//! - [`RasterBuffer`] - Owned frame memory with type, depth, size and stride
//! - [`PixelDataType`] - Runtime element type tag
//! - [`Point2D`], [`Size2D`], [`Roi`] - Geometry for addressing frames
//! - [`safe`] - Overflow-checked arithmetic and casts used for every size
//!   and offset computation
//! - [`interop`] - Import, export and zero-copy sharing with foreign matrix
//!   containers
//!
//! ## Design Philosophy
//!
//! A frame is raw bytes plus the metadata needed to read them. Every size,
//! stride and offset is computed with checked arithmetic, because a wrapped
//! size turns into an out-of-bounds copy further down the line:
//!
//! ```rust
//! use raster_core::{PixelDataType, RasterBuffer, Size2D};
//!
//! let err = RasterBuffer::with_size(PixelDataType::F64, Size2D::new(usize::MAX, 1), 1);
//! assert!(err.unwrap_err().is_overflow());
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    |
//!    +-- raster-queue (bounded frame hand-off between threads)
//!    +-- raster-bench (benchmarks)
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Split large line-by-line copies across rayon (enabled by default)
//! - `serde` - Enable serialization for geometry and descriptor types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod frame;
pub mod geometry;
pub mod interop;
pub mod safe;

// Re-exports for convenience
pub use error::*;
pub use format::*;
pub use frame::RasterBuffer;
pub use geometry::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use raster_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{PixelDataType, PixelElement};
    pub use crate::frame::RasterBuffer;
    pub use crate::geometry::{Point2D, RectCenter, RectCorners, RectOrigin, Roi, Size2D};
    pub use crate::interop::{mat_type, FrameDescriptor, MatDepth, SharedFrame, SharedFrameMut};
    pub use crate::safe::{Numeric, NumericKind, SafeArith};
}
