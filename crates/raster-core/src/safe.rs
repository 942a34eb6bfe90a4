//! Overflow-checked arithmetic and casts across mixed numeric types.
//!
//! Every size and offset a [`RasterBuffer`](crate::RasterBuffer) computes goes
//! through this module. A silently wrapped product here would become an
//! out-of-bounds copy further down, so integer results that do not fit the
//! destination type are reported as [`Error::Overflow`].
//!
//! # Numeric kinds
//!
//! Scalars fall into the closed set [`NumericKind`]: integral or floating.
//! Which operand combinations are allowed depends only on the two kinds and
//! their widths:
//!
//! | result    | operand   | allowed when                      | checked |
//! |-----------|-----------|-----------------------------------|---------|
//! | integral  | integral  | always                            | yes     |
//! | floating  | integral  | result strictly wider than operand| no      |
//! | floating  | floating  | result same width or wider        | no      |
//! | integral  | floating  | never                             | -       |
//!
//! The allowed pairs implement [`SafeArith`]; the rest have no impl, so a
//! forbidden combination is a compile error rather than a runtime surprise.
//!
//! ```rust
//! use raster_core::safe;
//!
//! assert_eq!(safe::add(40u8, 2i64).unwrap(), 42u8);
//! assert!(safe::add(i32::MAX, 1i32).is_err());
//! assert_eq!(safe::multiply(1.5f64, 2u32).unwrap(), 3.0);
//! ```
//!
//! ```compile_fail
//! use raster_core::safe;
//! // integral result with a floating operand is rejected
//! let _ = safe::add(1i32, 0.5f32);
//! ```
//!
//! Casts are dispatched at runtime on the `(source, destination)` kinds by
//! [`cast`] and range-checked in both directions.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::{Error, Result};

/// The closed set of numeric kinds the arithmetic rules are defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// Signed or unsigned integer.
    Integral,
    /// IEEE 754 binary floating point.
    Floating,
}

/// A primitive scalar that takes part in checked arithmetic.
///
/// Implemented for `i8..i64`, `u8..u64`, `isize`, `usize`, `f32` and `f64`.
pub trait Numeric:
    Copy
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + 'static
{
    /// Integral or floating.
    const KIND: NumericKind;
    /// Width in bits.
    const BITS: u32;
    /// Whether negative values are representable.
    const SIGNED: bool;
    /// Type name used in error messages.
    const NAME: &'static str;
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Lossless widening to `i128`. `None` for floating types.
    fn to_i128(self) -> Option<i128>;

    /// Narrowing from `i128`. `None` if the value does not fit, or for
    /// floating types.
    fn from_i128(value: i128) -> Option<Self>;

    /// Conversion to `f64` (may round for 64-bit integers).
    fn to_f64(self) -> f64;

    /// Plain `as` conversion from `f64`.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_numeric_int {
    ($($t:ty),* $(,)?) => {$(
        impl Numeric for $t {
            const KIND: NumericKind = NumericKind::Integral;
            const BITS: u32 = <$t>::BITS;
            const SIGNED: bool = <$t>::MIN != 0;
            const NAME: &'static str = stringify!($t);
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn to_i128(self) -> Option<i128> {
                Some(self as i128)
            }

            #[inline]
            fn from_i128(value: i128) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }
        }
    )*};
}

macro_rules! impl_numeric_float {
    ($($t:ty => $bits:expr),* $(,)?) => {$(
        impl Numeric for $t {
            const KIND: NumericKind = NumericKind::Floating;
            const BITS: u32 = $bits;
            const SIGNED: bool = true;
            const NAME: &'static str = stringify!($t);
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn to_i128(self) -> Option<i128> {
                None
            }

            #[inline]
            fn from_i128(_value: i128) -> Option<Self> {
                None
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }
        }
    )*};
}

impl_numeric_int!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);
impl_numeric_float!(f32 => 32, f64 => 64);

/// Binary operations whose result takes the type of the left operand.
///
/// Only implemented for the permitted `(Self, Rhs)` combinations listed in
/// the [module documentation](self).
pub trait SafeArith<Rhs = Self>: Numeric {
    /// `self + rhs`.
    fn safe_add(self, rhs: Rhs) -> Result<Self>;
    /// `self - rhs`.
    fn safe_sub(self, rhs: Rhs) -> Result<Self>;
    /// `self * rhs`.
    fn safe_mul(self, rhs: Rhs) -> Result<Self>;
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
        })
    }
}

/// Integer arithmetic in `i128`, narrowed back into `T`.
///
/// `i128` holds every sum and difference of two 64-bit operands; a product
/// that overflows `i128` cannot fit a 64-bit destination either.
fn checked_integral<T: Numeric, U: Numeric>(lhs: T, rhs: U, op: Op) -> Result<T> {
    let overflow = || {
        Error::overflow(
            T::NAME,
            format!("the result of {lhs} {op} {rhs} exceeds the limit"),
        )
    };
    let (a, b) = match (lhs.to_i128(), rhs.to_i128()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(overflow()),
    };
    let wide = match op {
        Op::Add => a.checked_add(b),
        Op::Sub => a.checked_sub(b),
        Op::Mul => a.checked_mul(b),
    };
    wide.and_then(T::from_i128).ok_or_else(overflow)
}

macro_rules! impl_int_arith {
    ($($t:ty),* $(,)?) => {
        impl_int_arith!(@outer [$($t),*] [$($t),*]);
    };
    (@outer [$($t:ty),*] $rhs:tt) => {
        $( impl_int_arith!(@inner $t $rhs); )*
    };
    (@inner $t:ty [$($u:ty),*]) => {$(
        impl SafeArith<$u> for $t {
            #[inline]
            fn safe_add(self, rhs: $u) -> Result<Self> {
                checked_integral(self, rhs, Op::Add)
            }

            #[inline]
            fn safe_sub(self, rhs: $u) -> Result<Self> {
                checked_integral(self, rhs, Op::Sub)
            }

            #[inline]
            fn safe_mul(self, rhs: $u) -> Result<Self> {
                checked_integral(self, rhs, Op::Mul)
            }
        }
    )*};
}

// Floating results are unchecked; the impl list is the width rule.
macro_rules! impl_float_arith {
    ($($t:ty: [$($u:ty),*]);* $(;)?) => {$($(
        impl SafeArith<$u> for $t {
            #[inline]
            fn safe_add(self, rhs: $u) -> Result<Self> {
                Ok(self + rhs as $t)
            }

            #[inline]
            fn safe_sub(self, rhs: $u) -> Result<Self> {
                Ok(self - rhs as $t)
            }

            #[inline]
            fn safe_mul(self, rhs: $u) -> Result<Self> {
                Ok(self * rhs as $t)
            }
        }
    )*)*};
}

impl_int_arith!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

impl_float_arith! {
    f32: [i8, u8, i16, u16, f32];
    f64: [i8, u8, i16, u16, i32, u32, f32, f64];
}

/// Returns `a + b` in the type of `a`.
///
/// # Errors
///
/// [`Error::Overflow`] if an integer result does not fit `T`.
#[inline]
pub fn add<T: SafeArith<U>, U>(a: T, b: U) -> Result<T> {
    a.safe_add(b)
}

/// Returns `a - b` in the type of `a`.
///
/// # Errors
///
/// [`Error::Overflow`] if an integer result does not fit `T`.
#[inline]
pub fn subtract<T: SafeArith<U>, U>(a: T, b: U) -> Result<T> {
    a.safe_sub(b)
}

/// Returns `a * b` in the type of `a`.
///
/// # Errors
///
/// [`Error::Overflow`] if an integer result does not fit `T`.
#[inline]
pub fn multiply<T: SafeArith<U>, U>(a: T, b: U) -> Result<T> {
    a.safe_mul(b)
}

fn step<T: Numeric>(value: T, op: Op) -> Result<T> {
    match T::KIND {
        NumericKind::Integral => checked_integral(value, T::ONE, op),
        NumericKind::Floating => Ok(match op {
            Op::Add => value + T::ONE,
            Op::Sub => value - T::ONE,
            Op::Mul => value * T::ONE,
        }),
    }
}

/// Adds one in place. Checked for integers, plain for floats.
///
/// On error `value` is left unchanged.
#[inline]
pub fn increment<T: Numeric>(value: &mut T) -> Result<()> {
    *value = step(*value, Op::Add)?;
    Ok(())
}

/// Subtracts one in place. Checked for integers, plain for floats.
///
/// On error `value` is left unchanged.
#[inline]
pub fn decrement<T: Numeric>(value: &mut T) -> Result<()> {
    *value = step(*value, Op::Sub)?;
    Ok(())
}

/// Converts `src` into `T`, failing when the value lies outside the range of
/// `T`.
///
/// | source   | destination | behaviour                                    |
/// |----------|-------------|----------------------------------------------|
/// | integral | integral    | exact, range-checked both ways               |
/// | floating | integral    | truncated toward zero, range-checked, NaN rejected |
/// | integral | floating    | nearest representable value                  |
/// | floating | floating    | finite values beyond the destination range rejected |
///
/// # Example
///
/// ```rust
/// use raster_core::safe::cast;
///
/// assert_eq!(cast::<u8, i32>(200).unwrap(), 200u8);
/// assert!(cast::<u8, i32>(256).is_err());
/// assert!(cast::<u8, i32>(-1).is_err());
/// assert_eq!(cast::<i32, f64>(-3.9).unwrap(), -3);
/// ```
pub fn cast<T: Numeric, U: Numeric>(src: U) -> Result<T> {
    match (U::KIND, T::KIND) {
        (NumericKind::Integral, NumericKind::Integral) => {
            let wide = src
                .to_i128()
                .ok_or_else(|| Error::overflow(T::NAME, format!("{src} is not integral")))?;
            T::from_i128(wide).ok_or_else(|| range_error::<T>(src, wide > 0))
        }
        (NumericKind::Floating, NumericKind::Integral) => float_to_integral(src),
        (NumericKind::Integral, NumericKind::Floating) => Ok(T::from_f64(src.to_f64())),
        (NumericKind::Floating, NumericKind::Floating) => {
            let wide = src.to_f64();
            let narrowed = T::from_f64(wide);
            if wide.is_finite() && !narrowed.to_f64().is_finite() {
                return Err(range_error::<T>(src, wide > 0.0));
            }
            Ok(narrowed)
        }
    }
}

fn float_to_integral<T: Numeric, U: Numeric>(src: U) -> Result<T> {
    let value = src.to_f64();
    if value.is_nan() {
        return Err(Error::overflow(T::NAME, "source value is not a number"));
    }
    let truncated = value.trunc();
    // Both bounds are powers of two and therefore exact in f64.
    let upper = 2f64.powi((T::BITS - u32::from(T::SIGNED)) as i32);
    let lower = if T::SIGNED { -upper } else { 0.0 };
    if truncated >= upper {
        return Err(range_error::<T>(src, true));
    }
    if truncated < lower {
        return Err(range_error::<T>(src, false));
    }
    T::from_i128(truncated as i128).ok_or_else(|| range_error::<T>(src, truncated > 0.0))
}

fn range_error<T: Numeric>(src: impl fmt::Display, too_high: bool) -> Error {
    let side = if too_high { "too high" } else { "too low" };
    Error::overflow(T::NAME, format!("source value {src} is {side}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_overflow_i32() {
        let err = add(i32::MAX, 1i32).unwrap_err();
        assert!(err.is_overflow());
        assert!(err.to_string().contains("i32"));
    }

    #[test]
    fn test_add_mixed_integers() {
        assert_eq!(add(250u8, 5u64).unwrap(), 255u8);
        assert!(add(250u8, 6u64).is_err());
        assert_eq!(add(10u8, -3i8).unwrap(), 7u8);
        assert!(add(2u8, -3i8).is_err());
    }

    #[test]
    fn test_subtract_unsigned_underflow() {
        assert_eq!(subtract(5usize, 5usize).unwrap(), 0);
        assert!(subtract(0usize, 1usize).is_err());
        assert_eq!(subtract(i64::MIN, -1i64).unwrap(), i64::MIN + 1);
    }

    #[test]
    fn test_multiply_overflow() {
        assert_eq!(multiply(65535u32, 65537u32).unwrap(), u32::MAX);
        assert!(multiply(65536u32, 65536u32).is_err());
        assert!(multiply(u64::MAX, u64::MAX).is_err());
        assert_eq!(multiply(-4i16, 8u8).unwrap(), -32i16);
    }

    #[test]
    fn test_float_arith_unchecked() {
        assert_relative_eq!(add(1.5f32, 2u8).unwrap(), 3.5f32);
        assert_relative_eq!(multiply(0.5f64, 7u32).unwrap(), 3.5f64);
        assert_relative_eq!(subtract(1.0f64, 0.25f32).unwrap(), 0.75f64);
        assert!(add(f32::MAX, f32::MAX).unwrap().is_infinite());
    }

    #[test]
    fn test_increment_decrement() {
        let mut v = 254u8;
        increment(&mut v).unwrap();
        assert_eq!(v, 255);
        assert!(increment(&mut v).is_err());
        assert_eq!(v, 255);

        let mut s = i8::MIN;
        assert!(decrement(&mut s).is_err());
        assert_eq!(s, i8::MIN);

        let mut f = 0.5f32;
        increment(&mut f).unwrap();
        decrement(&mut f).unwrap();
        decrement(&mut f).unwrap();
        assert_relative_eq!(f, -0.5f32);
    }

    #[test]
    fn test_cast_integral() {
        assert_eq!(cast::<u16, u64>(65535).unwrap(), 65535u16);
        let high = cast::<u16, u64>(65536).unwrap_err();
        assert!(high.to_string().contains("too high"));
        let low = cast::<u32, i8>(-1).unwrap_err();
        assert!(low.to_string().contains("too low"));
        assert_eq!(cast::<i64, u32>(u32::MAX).unwrap(), u32::MAX as i64);
    }

    #[test]
    fn test_cast_float_to_integral() {
        assert_eq!(cast::<u8, f32>(255.9).unwrap(), 255u8);
        assert!(cast::<u8, f32>(256.0).is_err());
        assert_eq!(cast::<u8, f64>(-0.5).unwrap(), 0u8);
        assert!(cast::<u8, f64>(-1.0).is_err());
        assert_eq!(cast::<i8, f64>(-128.7).unwrap(), -128i8);
        assert!(cast::<i8, f64>(-129.0).is_err());
        assert!(cast::<u64, f64>(18446744073709551616.0).is_err());
        assert!(cast::<i32, f64>(f64::NAN).is_err());
        assert!(cast::<i32, f32>(f32::INFINITY).is_err());
        assert!(cast::<i32, f32>(f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_cast_to_float() {
        assert_relative_eq!(cast::<f32, i32>(-7).unwrap(), -7.0f32);
        assert_relative_eq!(cast::<f64, f32>(0.25).unwrap(), 0.25f64);
        assert_relative_eq!(cast::<f32, f64>(1.0e30).unwrap(), 1.0e30f32, max_relative = 1e-6);
        assert!(cast::<f32, f64>(1.0e300).is_err());
        assert!(cast::<f32, f64>(-1.0e300).is_err());
        assert!(cast::<f32, f64>(f64::INFINITY).unwrap().is_infinite());
        assert!(cast::<f32, f64>(f64::NAN).unwrap().is_nan());
    }

    #[test]
    fn test_numeric_kind_constants() {
        assert_eq!(<u8 as Numeric>::KIND, NumericKind::Integral);
        assert_eq!(<f64 as Numeric>::KIND, NumericKind::Floating);
        assert!(!<u32 as Numeric>::SIGNED);
        assert!(<i16 as Numeric>::SIGNED);
        assert_eq!(<usize as Numeric>::NAME, "usize");
    }
}
