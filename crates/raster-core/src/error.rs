//! Error types for raster-core operations.
//!
//! Every failure is reported to the immediate caller at the point of
//! detection. Nothing is retried internally and nothing is logged globally;
//! the error value itself carries the attempted dimensions or the offending
//! value.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of:
//! - Frame construction and reset (size validation, overflow)
//! - ROI extraction and positional access (bounds checking)
//! - Overflow-checked arithmetic and casts in [`crate::safe`]
//! - The foreign-matrix bridge contract in [`crate::interop`]
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Error, Result};
//!
//! fn check_line(y: usize, height: usize) -> Result<()> {
//!     if y >= height {
//!         return Err(Error::out_of_range((0, y), (1, y + 1), (1, height)));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_line(4, 4).unwrap_err().is_out_of_range());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, addressing or exporting frames.
///
/// # Categories
///
/// - **Size errors**: [`DimensionMismatch`](Error::DimensionMismatch),
///   [`InvalidStride`](Error::InvalidStride), [`InvalidDepth`](Error::InvalidDepth)
/// - **Bounds errors**: [`OutOfRange`](Error::OutOfRange)
/// - **Arithmetic errors**: [`Overflow`](Error::Overflow)
/// - **Type errors**: [`UnsupportedType`](Error::UnsupportedType)
/// - **Bridge errors**: [`PaddingPresent`](Error::PaddingPresent)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Declared frame size does not match the supplied byte length.
    ///
    /// `expected` is `bytes_per_line * height` for the declared layout,
    /// `actual` is the length that was handed in.
    #[error(
        "frame size ({width} x {height} x {depth}) needs {expected} bytes, got {actual}"
    )]
    DimensionMismatch {
        /// Declared width in pixels
        width: usize,
        /// Declared height in lines
        height: usize,
        /// Declared channel depth
        depth: usize,
        /// Bytes required by the declared layout
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// A position or region lies outside the frame.
    ///
    /// The region is reported as `[x, y] ~ (end_x, end_y)` where the end
    /// point is exclusive.
    #[error("[{x}, {y}] ~ ({end_x}, {end_y}) is out of range for frame {width}x{height}")]
    OutOfRange {
        /// Region origin X
        x: usize,
        /// Region origin Y
        y: usize,
        /// Exclusive end X
        end_x: usize,
        /// Exclusive end Y
        end_y: usize,
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
    },

    /// The true result of an arithmetic operation or cast does not fit the
    /// destination type.
    #[error("overflow in {type_name}: {reason}")]
    Overflow {
        /// Destination type name
        type_name: &'static str,
        /// What went out of range
        reason: String,
    },

    /// The element type is undefined or has no counterpart on the other side
    /// of the bridge.
    #[error("unsupported data type: {name}")]
    UnsupportedType {
        /// Type name or foreign type code
        name: String,
    },

    /// Zero-copy shared access was requested on a frame with line padding.
    #[error("cannot share padded frame: {bytes_per_line} bytes per line, tight {tight}")]
    PaddingPresent {
        /// Frame bytes per line
        bytes_per_line: usize,
        /// Tightly packed bytes per line
        tight: usize,
    },

    /// A line stride is smaller than the tightly packed line.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Frame width
        width: usize,
    },

    /// A frame was given no channels per pixel.
    #[error("channel depth {depth} is invalid, frames need at least one channel")]
    InvalidDepth {
        /// Requested depth
        depth: usize,
    },
}

impl Error {
    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(
        (width, height, depth): (usize, usize, usize),
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::DimensionMismatch {
            width,
            height,
            depth,
            expected,
            actual,
        }
    }

    /// Creates an [`Error::OutOfRange`] error from origin, exclusive end and
    /// frame size.
    #[inline]
    pub fn out_of_range(
        (x, y): (usize, usize),
        (end_x, end_y): (usize, usize),
        (width, height): (usize, usize),
    ) -> Self {
        Self::OutOfRange {
            x,
            y,
            end_x,
            end_y,
            width,
            height,
        }
    }

    /// Creates an [`Error::Overflow`] error.
    #[inline]
    pub fn overflow(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Overflow {
            type_name,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedType`] error.
    #[inline]
    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self::UnsupportedType { name: name.into() }
    }

    /// Creates an [`Error::PaddingPresent`] error.
    #[inline]
    pub fn padding_present(bytes_per_line: usize, tight: usize) -> Self {
        Self::PaddingPresent {
            bytes_per_line,
            tight,
        }
    }

    /// Creates an [`Error::InvalidStride`] error.
    #[inline]
    pub fn invalid_stride(stride: usize, min_stride: usize, width: usize) -> Self {
        Self::InvalidStride {
            stride,
            min_stride,
            width,
        }
    }

    /// Creates an [`Error::InvalidDepth`] error.
    #[inline]
    pub fn invalid_depth(depth: usize) -> Self {
        Self::InvalidDepth { depth }
    }

    /// Returns `true` if this is a bounds error.
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Returns `true` if this is an arithmetic or cast overflow.
    #[inline]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }

    /// Returns `true` if the declared size did not match the data.
    #[inline]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = Error::out_of_range((3, 4), (11, 12), (10, 10));
        let msg = err.to_string();
        assert!(msg.contains("[3, 4] ~ (11, 12)"));
        assert!(msg.contains("10x10"));
        assert!(err.is_out_of_range());
        assert!(!err.is_overflow());
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = Error::dimension_mismatch((4, 2, 3), 24, 23);
        let msg = err.to_string();
        assert!(msg.contains("4 x 2 x 3"));
        assert!(msg.contains("24"));
        assert!(msg.contains("23"));
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_overflow_message() {
        let err = Error::overflow("i32", "2147483647 + 1");
        assert_eq!(err.to_string(), "overflow in i32: 2147483647 + 1");
        assert!(err.is_overflow());
    }

    #[test]
    fn test_invalid_depth_message() {
        let err = Error::invalid_depth(0);
        assert!(err.to_string().contains("channel depth 0"));
        assert!(!err.is_dimension_mismatch());
    }

    #[test]
    fn test_padding_present_message() {
        let err = Error::padding_present(64, 60);
        assert!(err.to_string().contains("64 bytes per line"));
    }
}
