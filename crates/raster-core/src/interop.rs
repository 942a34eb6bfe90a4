//! Bridge to foreign matrix containers.
//!
//! A foreign image container describes its memory with a five-tuple of
//! element type, channel count, width, height and stride, plus a pointer.
//! This module converts between that description and [`RasterBuffer`]:
//!
//! - [`FrameDescriptor`] and [`RasterBuffer::import`] copy foreign memory in,
//!   dropping padding on the way
//! - [`RasterBuffer::export_into`] copies a frame out to any stride
//! - [`SharedFrame`] / [`SharedFrameMut`] lend a padding-free frame's storage
//!   without copying
//! - [`MatDepth`] and [`mat_type`] map element types to the foreign type codes
//!
//! Shared views borrow the frame, so the frame cannot be cleared, reset or
//! dropped while a view is alive.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::interop::{mat_type, FrameDescriptor};
//! use raster_core::{PixelDataType, RasterBuffer, Size2D};
//!
//! // 3 x 2 RGB frame with 4 bytes of padding per line
//! let foreign = [1u8; 13 * 2];
//! let desc = FrameDescriptor::new(PixelDataType::U8, 3, 3, 2, 13);
//! let frame = unsafe { RasterBuffer::import(&desc, foreign.as_ptr()) }.unwrap();
//! assert!(frame.has_zero_padding());
//!
//! let view = frame.shared().unwrap();
//! assert_eq!(view.mat_type().unwrap(), mat_type(PixelDataType::U8, 3).unwrap());
//! ```

use tracing::trace;

use crate::format::PixelDataType;
use crate::frame::{copy_lines, strided_len, RasterBuffer};
use crate::geometry::Size2D;
use crate::{Error, Result};

/// Largest channel count a foreign type code can carry.
pub const MAX_CHANNELS: usize = 512;

const CHANNEL_SHIFT: u32 = 3;

/// Foreign element depth codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum MatDepth {
    /// Unsigned 8-bit
    U8 = 0,
    /// Signed 8-bit
    I8 = 1,
    /// Unsigned 16-bit
    U16 = 2,
    /// Signed 16-bit
    I16 = 3,
    /// Signed 32-bit
    I32 = 4,
    /// 32-bit float
    F32 = 5,
    /// 64-bit float
    F64 = 6,
}

impl MatDepth {
    /// Numeric code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Parses a depth code.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for codes outside `0..=6`.
    pub fn from_code(code: i32) -> Result<Self> {
        Ok(match code {
            0 => Self::U8,
            1 => Self::I8,
            2 => Self::U16,
            3 => Self::I16,
            4 => Self::I32,
            5 => Self::F32,
            6 => Self::F64,
            _ => return Err(Error::unsupported_type(format!("foreign depth code {code}"))),
        })
    }

    /// Foreign depth for an element type. Plain 8-bit characters map to the
    /// signed code.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for `Undefined`, `U32`, `I64` and `U64`,
    /// which have no foreign counterpart.
    pub fn from_data_type(data_type: PixelDataType) -> Result<Self> {
        Ok(match data_type {
            PixelDataType::U8 => Self::U8,
            PixelDataType::I8 | PixelDataType::Char => Self::I8,
            PixelDataType::U16 => Self::U16,
            PixelDataType::I16 => Self::I16,
            PixelDataType::I32 => Self::I32,
            PixelDataType::F32 => Self::F32,
            PixelDataType::F64 => Self::F64,
            PixelDataType::Undefined
            | PixelDataType::U32
            | PixelDataType::I64
            | PixelDataType::U64 => return Err(Error::unsupported_type(data_type.name())),
        })
    }

    /// Element type for this depth.
    pub const fn data_type(self) -> PixelDataType {
        match self {
            Self::U8 => PixelDataType::U8,
            Self::I8 => PixelDataType::I8,
            Self::U16 => PixelDataType::U16,
            Self::I16 => PixelDataType::I16,
            Self::I32 => PixelDataType::I32,
            Self::F32 => PixelDataType::F32,
            Self::F64 => PixelDataType::F64,
        }
    }
}

impl PixelDataType {
    /// Element type for a foreign depth code.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for an unknown code.
    pub fn from_mat_depth(code: i32) -> Result<Self> {
        MatDepth::from_code(code).map(MatDepth::data_type)
    }
}

/// Combined foreign type code: `depth + ((channels - 1) << 3)`.
///
/// # Errors
///
/// - [`Error::UnsupportedType`] if the element type has no foreign depth
/// - [`Error::OutOfRange`] if `channels` is not in `1..=512`
///
/// # Example
///
/// ```rust
/// use raster_core::interop::mat_type;
/// use raster_core::PixelDataType;
///
/// assert_eq!(mat_type(PixelDataType::U8, 3).unwrap(), 16);
/// assert_eq!(mat_type(PixelDataType::F32, 1).unwrap(), 5);
/// ```
pub fn mat_type(data_type: PixelDataType, channels: usize) -> Result<i32> {
    let depth = MatDepth::from_data_type(data_type)?;
    if !(1..=MAX_CHANNELS).contains(&channels) {
        return Err(Error::out_of_range(
            (channels, 0),
            (channels.saturating_add(1), 1),
            (MAX_CHANNELS + 1, 1),
        ));
    }
    // channels <= 512, so the shifted value fits easily
    Ok(depth.code() + (((channels - 1) as i32) << CHANNEL_SHIFT))
}

/// Memory description supplied by a foreign container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameDescriptor {
    /// Element type
    pub data_type: PixelDataType,
    /// Channels per pixel
    pub depth: usize,
    /// Pixels per line
    pub width: usize,
    /// Number of lines
    pub height: usize,
    /// Bytes between line starts
    pub stride: usize,
}

impl FrameDescriptor {
    /// Creates a descriptor.
    #[inline]
    pub const fn new(
        data_type: PixelDataType,
        depth: usize,
        width: usize,
        height: usize,
        stride: usize,
    ) -> Self {
        Self {
            data_type,
            depth,
            width,
            height,
            stride,
        }
    }

    /// Describes the memory of an existing frame.
    pub fn of(frame: &RasterBuffer) -> Self {
        Self::new(
            frame.data_type(),
            frame.depth(),
            frame.width(),
            frame.height(),
            frame.bytes_per_line(),
        )
    }

    /// Frame size in pixels.
    #[inline]
    pub fn size(&self) -> Size2D<usize> {
        Size2D::new(self.width, self.height)
    }

    /// Foreign type code for this description.
    pub fn mat_type(&self) -> Result<i32> {
        mat_type(self.data_type, self.depth)
    }
}

impl RasterBuffer {
    /// Copies foreign memory described by `desc` into a new padding-free
    /// frame.
    ///
    /// # Safety
    ///
    /// `ptr` must be readable for the region `desc` describes; see
    /// [`RasterBuffer::copy_from_raw`].
    pub unsafe fn import(desc: &FrameDescriptor, ptr: *const u8) -> Result<Self> {
        let mut frame = Self::new();
        // SAFETY: forwarded from the caller.
        unsafe { frame.copy_from_raw(ptr, desc.data_type, desc.size(), desc.depth, desc.stride)? };
        Ok(frame)
    }

    fn check_shareable(&self) -> Result<()> {
        let tight = Self::compute_bytes_per_line(self.data_type(), self.width(), self.depth())?;
        if !self.has_zero_padding() {
            return Err(Error::padding_present(self.bytes_per_line(), tight));
        }
        Ok(())
    }

    /// Lends the storage of a padding-free frame without copying.
    ///
    /// # Errors
    ///
    /// - [`Error::PaddingPresent`] if lines carry padding; copy with
    ///   [`export_into`](Self::export_into) instead
    /// - [`Error::UnsupportedType`] on an empty frame
    pub fn shared(&self) -> Result<SharedFrame<'_>> {
        self.check_shareable()?;
        Ok(SharedFrame { frame: self })
    }

    /// Mutable form of [`shared`](Self::shared).
    pub fn shared_mut(&mut self) -> Result<SharedFrameMut<'_>> {
        self.check_shareable()?;
        Ok(SharedFrameMut { frame: self })
    }

    /// Copies the frame into `dst`, whose lines start `dst_stride` bytes
    /// apart.
    ///
    /// Padding-free frames going to a tight destination are copied in one
    /// pass. Destination padding bytes are left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedType`] on an empty frame
    /// - [`Error::InvalidStride`] if `dst_stride` is below the tight line
    /// - [`Error::DimensionMismatch`] if `dst` is too short
    pub fn export_into(&self, dst: &mut [u8], dst_stride: usize) -> Result<()> {
        let tight = Self::compute_bytes_per_line(self.data_type(), self.width(), self.depth())?;
        if dst_stride < tight {
            return Err(Error::invalid_stride(dst_stride, tight, self.width()));
        }
        let needed = strided_len(dst_stride, tight, self.height())?;
        if dst.len() < needed {
            return Err(Error::dimension_mismatch(
                (self.width(), self.height(), self.depth()),
                needed,
                dst.len(),
            ));
        }

        if self.has_zero_padding() && dst_stride == tight {
            trace!(len = needed, "exporting frame in one pass");
            dst[..needed].copy_from_slice(self.data());
        } else {
            copy_lines(self.data(), self.bytes_per_line(), &mut dst[..needed], dst_stride, tight);
        }
        Ok(())
    }
}

/// Read-only view of a padding-free frame's storage.
#[derive(Debug, Clone, Copy)]
pub struct SharedFrame<'a> {
    frame: &'a RasterBuffer,
}

impl<'a> SharedFrame<'a> {
    /// The frame's bytes.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.frame.data()
    }

    /// Pointer to the first byte, for handing to foreign code.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.frame.data().as_ptr()
    }

    /// Memory description; the stride is always the tight line.
    #[inline]
    pub fn descriptor(&self) -> FrameDescriptor {
        FrameDescriptor::of(self.frame)
    }

    /// Foreign type code.
    pub fn mat_type(&self) -> Result<i32> {
        self.descriptor().mat_type()
    }
}

/// Mutable view of a padding-free frame's storage.
#[derive(Debug)]
pub struct SharedFrameMut<'a> {
    frame: &'a mut RasterBuffer,
}

impl SharedFrameMut<'_> {
    /// The frame's bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.frame.data()
    }

    /// Mutable frame bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.frame.data_mut()
    }

    /// Pointer to the first byte, for handing to foreign code.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.frame.data_mut().as_mut_ptr()
    }

    /// Memory description; the stride is always the tight line.
    #[inline]
    pub fn descriptor(&self) -> FrameDescriptor {
        FrameDescriptor::of(&*self.frame)
    }

    /// Foreign type code.
    pub fn mat_type(&self) -> Result<i32> {
        self.descriptor().mat_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Roi;

    fn sample(width: usize, height: usize) -> RasterBuffer {
        let data = (0..width * height).map(|i| i as u8).collect();
        RasterBuffer::from_vec(data, PixelDataType::U8, Size2D::new(width, height), 1).unwrap()
    }

    #[test]
    fn test_mat_depth_codes() {
        assert_eq!(MatDepth::from_data_type(PixelDataType::U8).unwrap().code(), 0);
        assert_eq!(MatDepth::from_data_type(PixelDataType::Char).unwrap().code(), 1);
        assert_eq!(MatDepth::from_data_type(PixelDataType::U16).unwrap().code(), 2);
        assert_eq!(MatDepth::from_data_type(PixelDataType::I16).unwrap().code(), 3);
        assert_eq!(MatDepth::from_data_type(PixelDataType::I32).unwrap().code(), 4);
        assert_eq!(MatDepth::from_data_type(PixelDataType::F32).unwrap().code(), 5);
        assert_eq!(MatDepth::from_data_type(PixelDataType::F64).unwrap().code(), 6);

        for ty in [
            PixelDataType::Undefined,
            PixelDataType::U32,
            PixelDataType::I64,
            PixelDataType::U64,
        ] {
            assert!(matches!(
                MatDepth::from_data_type(ty),
                Err(Error::UnsupportedType { .. })
            ));
        }
    }

    #[test]
    fn test_from_mat_depth() {
        for code in 0..=6 {
            let ty = PixelDataType::from_mat_depth(code).unwrap();
            assert_eq!(MatDepth::from_data_type(ty).unwrap().code(), code);
        }
        assert!(PixelDataType::from_mat_depth(7).is_err());
        assert!(PixelDataType::from_mat_depth(-1).is_err());
    }

    #[test]
    fn test_mat_type() {
        assert_eq!(mat_type(PixelDataType::U8, 1).unwrap(), 0);
        assert_eq!(mat_type(PixelDataType::U8, 4).unwrap(), 24);
        assert_eq!(mat_type(PixelDataType::F64, 2).unwrap(), 14);
        assert_eq!(mat_type(PixelDataType::I16, 512).unwrap(), 3 + (511 << 3));
        assert!(mat_type(PixelDataType::U8, 0).unwrap_err().is_out_of_range());
        assert!(mat_type(PixelDataType::U8, 513).unwrap_err().is_out_of_range());
        assert!(mat_type(PixelDataType::U64, 1).is_err());
    }

    #[test]
    fn test_import_drops_padding() {
        let stride = 7;
        let mut foreign = vec![0xFF; stride * 3];
        for y in 0..3 {
            for x in 0..4 {
                foreign[y * stride + x] = (y * 4 + x) as u8;
            }
        }
        let desc = FrameDescriptor::new(PixelDataType::U8, 1, 4, 3, stride);
        let frame = unsafe { RasterBuffer::import(&desc, foreign.as_ptr()) }.unwrap();
        assert_eq!(frame, sample(4, 3));
    }

    #[test]
    fn test_import_rejects_zero_depth() {
        let foreign = [0u8; 16];
        let desc = FrameDescriptor::new(PixelDataType::U8, 0, 4, 4, 4);
        let err = unsafe { RasterBuffer::import(&desc, foreign.as_ptr()) }.unwrap_err();
        assert_eq!(err, Error::invalid_depth(0));
    }

    #[test]
    fn test_shared_requires_zero_padding() {
        let mut frame = sample(4, 3);
        {
            let view = frame.shared().unwrap();
            assert_eq!(view.data(), sample(4, 3).data());
            assert_eq!(view.descriptor(), FrameDescriptor::new(PixelDataType::U8, 1, 4, 3, 4));
        }
        {
            let mut view = frame.shared_mut().unwrap();
            view.data_mut()[0] = 42;
            assert!(!view.as_mut_ptr().is_null());
        }
        assert_eq!(frame.data()[0], 42);

        frame.set_line_padding(8).unwrap();
        assert_eq!(frame.shared().unwrap_err(), Error::padding_present(8, 4));
        assert!(frame.shared_mut().is_err());
        assert!(matches!(
            RasterBuffer::new().shared(),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_export_into_tight_and_padded() {
        let frame = sample(3, 2);
        let mut tight = [0u8; 6];
        frame.export_into(&mut tight, 3).unwrap();
        assert_eq!(tight, [0, 1, 2, 3, 4, 5]);

        // Last line needs no padding
        let mut padded = [9u8; 8];
        frame.export_into(&mut padded, 5).unwrap();
        assert_eq!(padded, [0, 1, 2, 9, 9, 3, 4, 5]);

        let err = frame.export_into(&mut [0u8; 7], 5).unwrap_err();
        assert!(err.is_dimension_mismatch());
        assert!(matches!(
            frame.export_into(&mut [0u8; 6], 2),
            Err(Error::InvalidStride { .. })
        ));
    }

    #[test]
    fn test_export_from_padded_frame() {
        let mut frame = sample(3, 2);
        frame.set_line_padding(6).unwrap();
        let mut out = [0u8; 6];
        frame.export_into(&mut out, 3).unwrap();
        assert_eq!(out, [0, 1, 2, 3, 4, 5]);

        let desc = FrameDescriptor::of(&frame);
        let roundtrip = unsafe { RasterBuffer::import(&desc, frame.data().as_ptr()) }.unwrap();
        assert_eq!(roundtrip, frame.copy_to(&Roi::from_size(frame.size())).unwrap());
    }
}
