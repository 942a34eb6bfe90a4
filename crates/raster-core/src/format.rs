//! Pixel element types.
//!
//! A frame stores raw bytes; [`PixelDataType`] records how those bytes are
//! to be read. The type is a runtime value because it is usually only known
//! after a frame has been decoded or received.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::format::{PixelDataType, PixelElement};
//!
//! assert_eq!(PixelDataType::U16.element_size().unwrap(), 2);
//! assert_eq!(f64::DATA_TYPE, PixelDataType::F64);
//! assert!(PixelDataType::Undefined.element_size().is_err());
//! ```

use crate::{Error, Result};

/// Element type of the samples in a frame.
///
/// `Undefined` marks an empty frame. Asking it for a size fails instead of
/// returning zero, so an empty frame can never silently produce zero-length
/// copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelDataType {
    /// No data; the empty-frame sentinel.
    #[default]
    Undefined,
    /// Plain 8-bit character data.
    Char,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit IEEE 754 float.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
}

impl PixelDataType {
    /// Every defined element type.
    pub const ALL: [PixelDataType; 11] = [
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Number of bytes per element.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for [`PixelDataType::Undefined`].
    #[inline]
    pub fn element_size(&self) -> Result<usize> {
        match self {
            Self::Undefined => Err(Error::unsupported_type(self.name())),
            Self::Char | Self::I8 | Self::U8 => Ok(1),
            Self::I16 | Self::U16 => Ok(2),
            Self::I32 | Self::U32 | Self::F32 => Ok(4),
            Self::I64 | Self::U64 | Self::F64 => Ok(8),
        }
    }

    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether the type can hold negative values.
    #[inline]
    pub const fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64
        )
    }

    /// Whether this is the empty-frame sentinel.
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl std::fmt::Display for PixelDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust scalar types that can be stored in a frame.
///
/// Maps a type to its [`PixelDataType`], so typed call sites such as
/// [`RasterBuffer::reset_as`](crate::RasterBuffer::reset_as) do not have to
/// spell the tag out.
pub trait PixelElement: Copy + Send + Sync + 'static {
    /// The runtime tag for this type.
    const DATA_TYPE: PixelDataType;
}

macro_rules! impl_pixel_element {
    ($($t:ty => $tag:ident),* $(,)?) => {$(
        impl PixelElement for $t {
            const DATA_TYPE: PixelDataType = PixelDataType::$tag;
        }
    )*};
}

impl_pixel_element! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes_match_rust_types() {
        assert_eq!(PixelDataType::I8.element_size().unwrap(), size_of::<i8>());
        assert_eq!(PixelDataType::Char.element_size().unwrap(), 1);
        assert_eq!(PixelDataType::U16.element_size().unwrap(), size_of::<u16>());
        assert_eq!(PixelDataType::I32.element_size().unwrap(), size_of::<i32>());
        assert_eq!(PixelDataType::F32.element_size().unwrap(), size_of::<f32>());
        assert_eq!(PixelDataType::U64.element_size().unwrap(), size_of::<u64>());
        assert_eq!(PixelDataType::F64.element_size().unwrap(), size_of::<f64>());
    }

    #[test]
    fn test_undefined_fails() {
        let err = PixelDataType::Undefined.element_size().unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { .. }));
        assert!(err.to_string().contains("undefined"));
    }

    #[test]
    fn test_flags() {
        assert!(PixelDataType::F32.is_float());
        assert!(!PixelDataType::U8.is_float());
        assert!(PixelDataType::I16.is_signed());
        assert!(!PixelDataType::U64.is_signed());
        assert!(PixelDataType::default().is_undefined());
        assert!(PixelDataType::ALL.iter().all(|t| t.element_size().is_ok()));
    }

    #[test]
    fn test_pixel_element_tags() {
        assert_eq!(u8::DATA_TYPE, PixelDataType::U8);
        assert_eq!(i64::DATA_TYPE, PixelDataType::I64);
        assert_eq!(f32::DATA_TYPE.to_string(), "f32");
    }
}
