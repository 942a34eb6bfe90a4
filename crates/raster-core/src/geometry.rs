//! Point, size and rectangle value types.
//!
//! This module provides the 2-D primitives used to address frames:
//! - [`Point2D`] - A pixel position `(x, y)`
//! - [`Size2D`] - An extent `(width, height)`
//! - [`RectCorners`] - A rectangle given by two corner points
//! - [`RectOrigin`] - A rectangle given by an origin and an extent ([`Roi`])
//! - [`RectCenter`] - A rectangle given by a center and an extent
//!
//! # Coordinate System
//!
//! Origin (0, 0) is the **top-left** corner, X grows to the right and Y grows
//! downward. Region end points are exclusive.
//!
//! # Arithmetic
//!
//! Points and sizes combine component-wise. The `checked_*` methods go
//! through [`crate::safe`] and return an error on overflow; the operator
//! impls (`+ - * += -= *=`) are built on them and panic on overflow, the
//! same way `std::time::Duration` arithmetic does.
//!
//! ```rust
//! use raster_core::{Point2D, Size2D};
//!
//! let origin = Point2D::new(10usize, 20);
//! let end = origin.offset_by(Size2D::new(5usize, 5)).unwrap();
//! assert_eq!(end, Point2D::new(15, 25));
//!
//! let doubled = Size2D::new(3u32, 4) * Size2D::new(2, 2);
//! assert_eq!(doubled, Size2D::new(6, 8));
//! ```

use std::ops::{Add, AddAssign, Index, Mul, MulAssign, Sub, SubAssign};

use crate::safe::{self, Numeric, SafeArith};
use crate::Result;

#[inline]
#[track_caller]
fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("geometry arithmetic failed: {err}"),
    }
}

macro_rules! impl_vector2 {
    ($name:ident, $a:ident, $b:ident) => {
        impl<T> $name<T> {
            /// Creates a new value from its two components.
            #[inline]
            pub const fn new($a: T, $b: T) -> Self {
                Self { $a, $b }
            }
        }

        impl<T: Numeric> $name<T> {
            /// Both components zero.
            pub const ZERO: Self = Self::new(T::ZERO, T::ZERO);

            /// Returns the components as an array.
            #[inline]
            pub fn to_array(self) -> [T; 2] {
                [self.$a, self.$b]
            }
        }

        impl<T: SafeArith> $name<T> {
            /// Component-wise checked addition.
            pub fn checked_add(self, rhs: Self) -> Result<Self> {
                Ok(Self::new(self.$a.safe_add(rhs.$a)?, self.$b.safe_add(rhs.$b)?))
            }

            /// Component-wise checked subtraction.
            pub fn checked_sub(self, rhs: Self) -> Result<Self> {
                Ok(Self::new(self.$a.safe_sub(rhs.$a)?, self.$b.safe_sub(rhs.$b)?))
            }

            /// Component-wise checked multiplication.
            pub fn checked_mul(self, rhs: Self) -> Result<Self> {
                Ok(Self::new(self.$a.safe_mul(rhs.$a)?, self.$b.safe_mul(rhs.$b)?))
            }

            /// Adds `value` to both components.
            pub fn checked_add_scalar(self, value: T) -> Result<Self> {
                Ok(Self::new(self.$a.safe_add(value)?, self.$b.safe_add(value)?))
            }

            /// Subtracts `value` from both components.
            pub fn checked_sub_scalar(self, value: T) -> Result<Self> {
                Ok(Self::new(self.$a.safe_sub(value)?, self.$b.safe_sub(value)?))
            }

            /// Multiplies both components by `value`.
            pub fn checked_mul_scalar(self, value: T) -> Result<Self> {
                Ok(Self::new(self.$a.safe_mul(value)?, self.$b.safe_mul(value)?))
            }

            /// Adds one to both components (`++`). Unchanged on error.
            pub fn increment(&mut self) -> Result<()> {
                let (mut a, mut b) = (self.$a, self.$b);
                safe::increment(&mut a)?;
                safe::increment(&mut b)?;
                *self = Self::new(a, b);
                Ok(())
            }

            /// Subtracts one from both components (`--`). Unchanged on error.
            pub fn decrement(&mut self) -> Result<()> {
                let (mut a, mut b) = (self.$a, self.$b);
                safe::decrement(&mut a)?;
                safe::decrement(&mut b)?;
                *self = Self::new(a, b);
                Ok(())
            }
        }

        impl<T> From<[T; 2]> for $name<T> {
            fn from([$a, $b]: [T; 2]) -> Self {
                Self { $a, $b }
            }
        }

        impl<T> From<$name<T>> for [T; 2] {
            fn from(value: $name<T>) -> Self {
                [value.$a, value.$b]
            }
        }

        impl<T> From<(T, T)> for $name<T> {
            fn from(($a, $b): (T, T)) -> Self {
                Self { $a, $b }
            }
        }

        impl<T> Index<usize> for $name<T> {
            type Output = T;

            fn index(&self, index: usize) -> &T {
                match index {
                    0 => &self.$a,
                    1 => &self.$b,
                    _ => panic!("index {index} out of range for a 2-component value"),
                }
            }
        }

        impl<T: SafeArith> Add for $name<T> {
            type Output = Self;

            /// # Panics
            ///
            /// Panics if a component overflows.
            #[track_caller]
            fn add(self, rhs: Self) -> Self {
                or_panic(self.checked_add(rhs))
            }
        }

        impl<T: SafeArith> Sub for $name<T> {
            type Output = Self;

            /// # Panics
            ///
            /// Panics if a component overflows.
            #[track_caller]
            fn sub(self, rhs: Self) -> Self {
                or_panic(self.checked_sub(rhs))
            }
        }

        impl<T: SafeArith> Mul for $name<T> {
            type Output = Self;

            /// # Panics
            ///
            /// Panics if a component overflows.
            #[track_caller]
            fn mul(self, rhs: Self) -> Self {
                or_panic(self.checked_mul(rhs))
            }
        }

        impl<T: SafeArith> Add<T> for $name<T> {
            type Output = Self;

            #[track_caller]
            fn add(self, rhs: T) -> Self {
                or_panic(self.checked_add_scalar(rhs))
            }
        }

        impl<T: SafeArith> Sub<T> for $name<T> {
            type Output = Self;

            #[track_caller]
            fn sub(self, rhs: T) -> Self {
                or_panic(self.checked_sub_scalar(rhs))
            }
        }

        impl<T: SafeArith> Mul<T> for $name<T> {
            type Output = Self;

            #[track_caller]
            fn mul(self, rhs: T) -> Self {
                or_panic(self.checked_mul_scalar(rhs))
            }
        }

        impl<T: SafeArith> AddAssign for $name<T> {
            #[track_caller]
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl<T: SafeArith> SubAssign for $name<T> {
            #[track_caller]
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl<T: SafeArith> MulAssign for $name<T> {
            #[track_caller]
            fn mul_assign(&mut self, rhs: Self) {
                *self = *self * rhs;
            }
        }
    };
}

/// A pixel position.
///
/// # Example
///
/// ```rust
/// use raster_core::Point2D;
///
/// let mut p = Point2D::new(1u8, 2);
/// p.increment().unwrap();
/// assert_eq!(p, Point2D::new(2, 3));
/// assert_eq!(p[1], 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D<T> {
    /// Column
    pub x: T,
    /// Line
    pub y: T,
}

impl_vector2!(Point2D, x, y);

impl<T> Point2D<T> {
    /// Returns the point offset by an extent, i.e. the exclusive end of the
    /// region `{self, size}`.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`](crate::Error::Overflow) if a component overflows.
    pub fn offset_by<U>(self, size: Size2D<U>) -> Result<Self>
    where
        T: SafeArith<U>,
    {
        Ok(Self::new(
            self.x.safe_add(size.width)?,
            self.y.safe_add(size.height)?,
        ))
    }
}

/// An extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size2D<T> {
    /// Pixels per line
    pub width: T,
    /// Number of lines
    pub height: T,
}

impl_vector2!(Size2D, width, height);

impl<T: Numeric> Size2D<T> {
    /// Returns `true` if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == T::ZERO || self.height == T::ZERO
    }
}

impl std::fmt::Display for Size2D<usize> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle given by two corner points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectCorners<T> {
    /// First corner
    pub point1: Point2D<T>,
    /// Second corner
    pub point2: Point2D<T>,
}

impl<T> RectCorners<T> {
    /// Creates a rectangle from two corners.
    #[inline]
    pub const fn new(point1: Point2D<T>, point2: Point2D<T>) -> Self {
        Self { point1, point2 }
    }
}

/// A rectangle given by its top-left origin and an extent.
///
/// This is the representation used for regions of interest; see [`Roi`].
///
/// # Example
///
/// ```rust
/// use raster_core::{Point2D, RectOrigin, Size2D};
///
/// let rect = RectOrigin::new(Point2D::new(10usize, 20), Size2D::new(100usize, 50));
/// assert_eq!(rect.end().unwrap(), Point2D::new(110, 70));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectOrigin<T, U = T> {
    /// Top-left corner (inclusive)
    pub origin: Point2D<T>,
    /// Extent
    pub size: Size2D<U>,
}

impl<T, U> RectOrigin<T, U> {
    /// Creates a rectangle from origin and extent.
    #[inline]
    pub const fn new(origin: Point2D<T>, size: Size2D<U>) -> Self {
        Self { origin, size }
    }
}

impl<T: Numeric, U> RectOrigin<T, U> {
    /// Creates a rectangle at (0, 0) covering `size`.
    #[inline]
    pub fn from_size(size: Size2D<U>) -> Self {
        Self::new(Point2D::ZERO, size)
    }
}

impl<T: SafeArith<U>, U: Copy> RectOrigin<T, U> {
    /// Returns the exclusive bottom-right corner.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`](crate::Error::Overflow) if `origin + size`
    /// overflows.
    #[inline]
    pub fn end(&self) -> Result<Point2D<T>> {
        self.origin.offset_by(self.size)
    }

    /// Converts to the corner-pair representation (second corner exclusive).
    pub fn to_corners(&self) -> Result<RectCorners<T>> {
        Ok(RectCorners::new(self.origin, self.end()?))
    }
}

impl std::fmt::Display for RectOrigin<usize, usize> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Roi({}, {}, {})",
            self.origin.x, self.origin.y, self.size
        )
    }
}

/// A rectangle given by its center and an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectCenter<T, U = T> {
    /// Center point
    pub center: Point2D<T>,
    /// Extent around the center
    pub extent: Size2D<U>,
}

impl<T, U> RectCenter<T, U> {
    /// Creates a rectangle from center and extent.
    #[inline]
    pub const fn new(center: Point2D<T>, extent: Size2D<U>) -> Self {
        Self { center, extent }
    }
}

/// Region of interest in pixel units: origin plus extent.
pub type Roi = RectOrigin<usize, usize>;

impl Roi {
    /// Creates a region from `x, y, width, height`.
    #[inline]
    pub const fn from_xywh(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::new(Point2D::new(x, y), Size2D::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_checked_ops() {
        let a = Point2D::new(3i32, 4);
        let b = Point2D::new(1i32, 2);
        assert_eq!(a.checked_add(b).unwrap(), Point2D::new(4, 6));
        assert_eq!(a.checked_sub(b).unwrap(), Point2D::new(2, 2));
        assert_eq!(a.checked_mul(b).unwrap(), Point2D::new(3, 8));
        assert_eq!(a.checked_mul_scalar(3).unwrap(), Point2D::new(9, 12));
        assert!(Point2D::new(i32::MAX, 0).checked_add(Point2D::new(1, 0)).is_err());
    }

    #[test]
    fn test_operators() {
        let mut s = Size2D::new(2usize, 3);
        s += Size2D::new(1, 1);
        assert_eq!(s, Size2D::new(3, 4));
        s *= Size2D::new(2, 2);
        assert_eq!(s, Size2D::new(6, 8));
        s -= Size2D::new(6, 0);
        assert_eq!(s, Size2D::new(0, 8));
        assert_eq!(s + 1usize, Size2D::new(1, 9));
        assert_eq!(Point2D::new(5u16, 5) - 5u16, Point2D::new(0, 0));
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn test_operator_overflow_panics() {
        let _ = Point2D::new(0usize, 0) - Point2D::new(1, 0);
    }

    #[test]
    fn test_increment_is_atomic() {
        let mut p = Point2D::new(0u8, 255);
        assert!(p.increment().is_err());
        assert_eq!(p, Point2D::new(0, 255));
        let mut q = Point2D::new(1.5f32, -1.0);
        q.decrement().unwrap();
        assert_eq!(q, Point2D::new(0.5, -2.0));
    }

    #[test]
    fn test_array_conversions() {
        let p: Point2D<i64> = [7, 9].into();
        assert_eq!(p.x, 7);
        assert_eq!(p[0], 7);
        let arr: [i64; 2] = p.into();
        assert_eq!(arr, [7, 9]);
        assert_eq!(Size2D::from((4u32, 5u32)).to_array(), [4, 5]);
    }

    #[test]
    fn test_rect_origin_end() {
        let roi = Roi::from_xywh(2, 3, 4, 5);
        assert_eq!(roi.end().unwrap(), Point2D::new(6, 8));
        let corners = roi.to_corners().unwrap();
        assert_eq!(corners, RectCorners::new(Point2D::new(2, 3), Point2D::new(6, 8)));
        let huge = Roi::from_xywh(usize::MAX, 0, 1, 0);
        assert!(huge.end().unwrap_err().is_overflow());
    }

    #[test]
    fn test_rect_equality() {
        let a = RectCenter::new(Point2D::new(1.0f64, 1.0), Size2D::new(2.0f64, 2.0));
        let b = RectCenter::new(Point2D::new(1.0f64, 1.0), Size2D::new(2.0f64, 2.0));
        assert_eq!(a, b);
        assert_ne!(Roi::from_size(Size2D::new(4, 4)), Roi::from_xywh(1, 0, 4, 4));
        assert_eq!(Roi::from_size(Size2D::new(4, 4)), Roi::from_xywh(0, 0, 4, 4));
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size2D::new(0usize, 5).is_empty());
        assert!(!Size2D::new(1usize, 1).is_empty());
        assert_eq!(Size2D::new(3usize, 2).to_string(), "3x2");
    }
}
