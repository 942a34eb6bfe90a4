//! Owned frame storage.
//!
//! [`RasterBuffer`] owns one contiguous byte store together with the
//! metadata needed to read it: element type, channel depth, size and
//! bytes per line.
//!
//! # Memory Layout
//!
//! Samples are ordered channel, then pixel, then line. Lines start
//! `bytes_per_line` bytes apart; any bytes past the last pixel of a line are
//! padding and carry no pixel data:
//!
//! ```text
//! line 0: [c0 c1 c2 | c0 c1 c2 | ... | pad pad]
//! line 1: [c0 c1 c2 | c0 c1 c2 | ... | pad pad]
//! ```
//!
//! The store is always exactly `bytes_per_line * height` bytes long.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{PixelDataType, RasterBuffer, Roi, Size2D};
//!
//! let pixels: Vec<u8> = (0..48).collect();
//! let frame = RasterBuffer::from_vec(pixels, PixelDataType::U8, Size2D::new(4, 4), 3).unwrap();
//! assert!(frame.has_zero_padding());
//!
//! let crop = frame.copy_to(&Roi::from_xywh(1, 1, 2, 2)).unwrap();
//! assert_eq!(crop.line(0).unwrap(), &[15, 16, 17, 18, 19, 20]);
//! ```

use tracing::trace;

use crate::format::{PixelDataType, PixelElement};
use crate::geometry::{Point2D, Roi, Size2D};
use crate::safe;
use crate::{Error, Result};

/// Line copies over this many destination bytes are split across the rayon
/// pool.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_BYTES: usize = 1 << 20;

/// Copies `len` bytes from each source line into each destination line.
///
/// Source line `i` starts at `i * src_stride`; the number of lines is taken
/// from `dst`, whose last line may be cut short to `len` bytes.
pub(crate) fn copy_lines(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    len: usize,
) {
    if len == 0 || dst.is_empty() {
        return;
    }
    trace!(src_stride, dst_stride, len, "copying line by line");

    let copy_line = |(i, line): (usize, &mut [u8])| {
        let start = i * src_stride;
        line[..len].copy_from_slice(&src[start..start + len]);
    };

    #[cfg(feature = "parallel")]
    {
        if dst.len() >= PARALLEL_MIN_BYTES {
            use rayon::prelude::*;
            dst.par_chunks_mut(dst_stride).enumerate().for_each(copy_line);
            return;
        }
    }

    dst.chunks_mut(dst_stride).enumerate().for_each(copy_line);
}

/// Source bytes a strided read of `height` lines touches.
pub(crate) fn strided_len(stride: usize, tight: usize, height: usize) -> Result<usize> {
    match height {
        0 => Ok(0),
        h => safe::add(safe::multiply(stride, h - 1)?, tight),
    }
}

/// Owned raster image memory.
///
/// A buffer starts out empty (`PixelDataType::Undefined`, zero size) and
/// takes a shape through [`reset`](Self::reset), one of the `copy_from*`
/// methods or [`move_from`](Self::move_from). Every one of them validates
/// the declared shape against the data before touching `self`, so a failed
/// call leaves the buffer unchanged.
///
/// Cloning duplicates the store; [`take`](Self::take) moves it out and
/// leaves an empty buffer behind.
///
/// # Example
///
/// ```rust
/// use raster_core::{Point2D, RasterBuffer, Size2D};
///
/// let mut frame = RasterBuffer::new();
/// frame.reset_as::<u16>(Size2D::new(8, 2), 1).unwrap();
/// assert_eq!(frame.bytes_per_line(), 16);
///
/// frame.pixel_mut(Point2D::new(3, 1)).unwrap().copy_from_slice(&[0xAB, 0xCD]);
/// assert_eq!(frame.offset_of(Point2D::new(3, 1)).unwrap(), 22);
/// ```
#[derive(Default, PartialEq, Eq)]
pub struct RasterBuffer {
    data: Vec<u8>,
    data_type: PixelDataType,
    depth: usize,
    size: Size2D<usize>,
    bytes_per_line: usize,
}

impl RasterBuffer {
    /// Creates an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zero-filled buffer of the given shape.
    pub fn with_size(data_type: PixelDataType, size: Size2D<usize>, depth: usize) -> Result<Self> {
        let mut frame = Self::new();
        frame.reset(data_type, size, depth)?;
        Ok(frame)
    }

    /// Creates a buffer holding a copy of tightly packed `src`.
    pub fn from_slice(
        src: &[u8],
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<Self> {
        let mut frame = Self::new();
        frame.copy_from(src, data_type, size, depth)?;
        Ok(frame)
    }

    /// Creates a buffer that takes ownership of tightly packed `data`.
    pub fn from_vec(
        data: Vec<u8>,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<Self> {
        let mut frame = Self::new();
        frame.move_from(data, data_type, size, depth)?;
        Ok(frame)
    }

    /// Creates a buffer that adopts `data` laid out with `bytes_per_line`
    /// bytes per line, padding included.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if `bytes_per_line` is below the tight line
    /// - [`Error::DimensionMismatch`] if `data` is not `bytes_per_line * height` long
    pub fn from_padded_vec(
        data: Vec<u8>,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
        bytes_per_line: usize,
    ) -> Result<Self> {
        let tight = Self::compute_bytes_per_line(data_type, size.width, depth)?;
        if bytes_per_line < tight {
            return Err(Error::invalid_stride(bytes_per_line, tight, size.width));
        }
        let expected = safe::multiply(bytes_per_line, size.height)?;
        if data.len() != expected {
            return Err(Error::dimension_mismatch(
                (size.width, size.height, depth),
                expected,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            data_type,
            depth,
            size,
            bytes_per_line,
        })
    }

    /// Bytes in one tightly packed line: `width * depth * element_size`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedType`] for [`PixelDataType::Undefined`]
    /// - [`Error::InvalidDepth`] if `depth` is zero
    /// - [`Error::Overflow`] if the product does not fit `usize`
    pub fn compute_bytes_per_line(
        data_type: PixelDataType,
        width: usize,
        depth: usize,
    ) -> Result<usize> {
        let element = data_type.element_size()?;
        if depth == 0 {
            return Err(Error::invalid_depth(depth));
        }
        safe::multiply(safe::multiply(width, depth)?, element)
    }

    /// Tight bytes per line and total store length for a shape.
    fn layout(
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<(usize, usize)> {
        let bytes_per_line = Self::compute_bytes_per_line(data_type, size.width, depth)?;
        let len = safe::multiply(bytes_per_line, size.height)?;
        Ok((bytes_per_line, len))
    }

    fn set_shape(
        &mut self,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
        bytes_per_line: usize,
    ) {
        self.data_type = data_type;
        self.size = size;
        self.depth = depth;
        self.bytes_per_line = bytes_per_line;
    }

    /// Reshapes the buffer without padding.
    ///
    /// The store is reallocated (zero-filled) only when its length changes;
    /// otherwise the old bytes are kept. The metadata is always replaced.
    pub fn reset(
        &mut self,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<()> {
        let (bytes_per_line, len) = Self::layout(data_type, size, depth)?;
        if self.data.len() != len {
            trace!(len, %size, depth, %data_type, "allocating frame storage");
            self.data = vec![0; len];
        }
        self.set_shape(data_type, size, depth, bytes_per_line);
        Ok(())
    }

    /// [`reset`](Self::reset) with the element type taken from `T`.
    #[inline]
    pub fn reset_as<T: PixelElement>(&mut self, size: Size2D<usize>, depth: usize) -> Result<()> {
        self.reset(T::DATA_TYPE, size, depth)
    }

    /// Replaces the contents with a copy of tightly packed `src`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `src.len()` differs from the length
    /// the shape needs; the buffer is left untouched.
    pub fn copy_from(
        &mut self,
        src: &[u8],
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<()> {
        let (bytes_per_line, len) = Self::layout(data_type, size, depth)?;
        if src.len() != len {
            return Err(Error::dimension_mismatch((size.width, size.height, depth), len, src.len()));
        }
        self.data.clear();
        self.data.extend_from_slice(src);
        self.set_shape(data_type, size, depth, bytes_per_line);
        Ok(())
    }

    /// Replaces the contents with a copy of a strided source behind a raw
    /// pointer, dropping any source padding.
    ///
    /// Lines are read `stride` bytes apart. When `stride` equals the tight
    /// line length the block is copied in one pass.
    ///
    /// # Safety
    ///
    /// There is no way to check the source length here. `src` must be valid
    /// for reads of `stride * (height - 1) + width * depth * element_size`
    /// bytes (nothing when `height` is zero) and must not overlap this
    /// buffer. Use [`copy_from_strided`](Self::copy_from_strided) when the
    /// source is a slice.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStride`] if `stride` is below the tight line length.
    pub unsafe fn copy_from_raw(
        &mut self,
        src: *const u8,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
        stride: usize,
    ) -> Result<()> {
        let (bytes_per_line, len) = Self::layout(data_type, size, depth)?;
        if stride < bytes_per_line {
            return Err(Error::invalid_stride(stride, bytes_per_line, size.width));
        }
        let src_len = strided_len(stride, bytes_per_line, size.height)?;
        let src: &[u8] = if src_len == 0 {
            &[]
        } else {
            // SAFETY: the caller guarantees `src` is readable for `src_len` bytes.
            unsafe { std::slice::from_raw_parts(src, src_len) }
        };
        self.copy_lines_from(src, stride, bytes_per_line, len);
        self.set_shape(data_type, size, depth, bytes_per_line);
        Ok(())
    }

    /// Checked form of [`copy_from_raw`](Self::copy_from_raw) for a strided
    /// slice.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if `stride` is below the tight line length
    /// - [`Error::DimensionMismatch`] if `src` is shorter than the strided read
    pub fn copy_from_strided(
        &mut self,
        src: &[u8],
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
        stride: usize,
    ) -> Result<()> {
        let (bytes_per_line, len) = Self::layout(data_type, size, depth)?;
        if stride < bytes_per_line {
            return Err(Error::invalid_stride(stride, bytes_per_line, size.width));
        }
        let src_len = strided_len(stride, bytes_per_line, size.height)?;
        if src.len() < src_len {
            return Err(Error::dimension_mismatch(
                (size.width, size.height, depth),
                src_len,
                src.len(),
            ));
        }
        self.copy_lines_from(src, stride, bytes_per_line, len);
        self.set_shape(data_type, size, depth, bytes_per_line);
        Ok(())
    }

    /// Fills the store with `len` tight bytes read from `src` at `stride`.
    fn copy_lines_from(&mut self, src: &[u8], stride: usize, bytes_per_line: usize, len: usize) {
        if stride == bytes_per_line {
            self.data.clear();
            self.data.extend_from_slice(&src[..len]);
        } else {
            self.data.resize(len, 0);
            copy_lines(src, stride, &mut self.data, bytes_per_line, bytes_per_line);
        }
    }

    /// Takes ownership of tightly packed `data` without copying.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] as for [`copy_from`](Self::copy_from).
    pub fn move_from(
        &mut self,
        data: Vec<u8>,
        data_type: PixelDataType,
        size: Size2D<usize>,
        depth: usize,
    ) -> Result<()> {
        let (bytes_per_line, len) = Self::layout(data_type, size, depth)?;
        if data.len() != len {
            return Err(Error::dimension_mismatch(
                (size.width, size.height, depth),
                len,
                data.len(),
            ));
        }
        self.data = data;
        self.set_shape(data_type, size, depth, bytes_per_line);
        Ok(())
    }

    /// Validates that `roi` lies inside the frame.
    fn check_roi(&self, roi: &Roi) -> Result<()> {
        let Roi { origin, size } = *roi;
        let out_of_range = |end: Point2D<usize>| {
            Error::out_of_range((origin.x, origin.y), (end.x, end.y), (self.width(), self.height()))
        };
        let end = roi.end().map_err(|_| {
            out_of_range(Point2D::new(
                origin.x.saturating_add(size.width),
                origin.y.saturating_add(size.height),
            ))
        })?;
        if end.x > self.width() || end.y > self.height() {
            return Err(out_of_range(end));
        }
        Ok(())
    }

    /// Bytes of one pixel. Empty frames have none.
    #[inline]
    fn pixel_bytes(&self) -> usize {
        self.data_type.element_size().map_or(0, |e| e * self.depth)
    }

    /// Bytes of pixel data in one line, padding excluded.
    #[inline]
    fn tight_bytes_per_line(&self) -> usize {
        self.pixel_bytes() * self.size.width
    }

    /// Offset of `point` with no range check.
    fn byte_offset(&self, point: Point2D<usize>) -> Result<usize> {
        safe::add(
            safe::multiply(self.bytes_per_line, point.y)?,
            safe::multiply(self.pixel_bytes(), point.x)?,
        )
    }

    /// Copies a region into a new tightly packed buffer.
    ///
    /// A region covering the whole of a zero-padding frame is a single clone
    /// of the store; anything else goes line by line. The result never has
    /// padding, so a whole-frame copy of a padded frame matches the original
    /// in its pixel data and shape but not byte for byte: the padding bytes
    /// are dropped and `bytes_per_line` shrinks to the tight line.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `origin + size` exceeds the frame in either
    /// direction.
    pub fn copy_to(&self, roi: &Roi) -> Result<RasterBuffer> {
        self.check_roi(roi)?;
        if roi.origin == Point2D::ZERO && roi.size == self.size && self.has_zero_padding() {
            return Ok(self.clone());
        }

        let mut out = Self::with_size(self.data_type, roi.size, self.depth)?;
        if out.data.is_empty() {
            return Ok(out);
        }
        let start = self.byte_offset(roi.origin)?;
        let len = out.bytes_per_line;
        copy_lines(&self.data[start..], self.bytes_per_line, &mut out.data, len, len);
        Ok(out)
    }

    /// Re-lays out the store with `bytes_per_line` bytes per line.
    ///
    /// Pixel data is kept; new padding bytes are zero. Passing the tight
    /// line length removes padding.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedType`] on an empty buffer
    /// - [`Error::InvalidStride`] if `bytes_per_line` is below the tight line
    pub fn set_line_padding(&mut self, bytes_per_line: usize) -> Result<()> {
        self.data_type.element_size()?;
        let tight = self.tight_bytes_per_line();
        if bytes_per_line < tight {
            return Err(Error::invalid_stride(bytes_per_line, tight, self.width()));
        }
        if bytes_per_line == self.bytes_per_line {
            return Ok(());
        }
        let len = safe::multiply(bytes_per_line, self.height())?;
        let mut data = vec![0; len];
        copy_lines(&self.data, self.bytes_per_line, &mut data, bytes_per_line, tight);
        self.data = data;
        self.bytes_per_line = bytes_per_line;
        Ok(())
    }

    /// Byte offset of the pixel at `point`: `bytes_per_line * y + pixel_bytes * x`.
    ///
    /// `(0, 0)` is returned without a range check; any other point must lie
    /// inside the frame.
    pub fn offset_of(&self, point: Point2D<usize>) -> Result<usize> {
        if point == Point2D::ZERO {
            return Ok(0);
        }
        self.check_roi(&Roi::new(point, Size2D::new(1, 1)))?;
        self.byte_offset(point)
    }

    /// The store from the pixel at `point` to the end.
    pub fn data_at(&self, point: Point2D<usize>) -> Result<&[u8]> {
        let offset = self.offset_of(point)?;
        Ok(&self.data[offset..])
    }

    /// Mutable form of [`data_at`](Self::data_at).
    pub fn data_at_mut(&mut self, point: Point2D<usize>) -> Result<&mut [u8]> {
        let offset = self.offset_of(point)?;
        Ok(&mut self.data[offset..])
    }

    fn pixel_range(&self, point: Point2D<usize>) -> Result<std::ops::Range<usize>> {
        let pixel = safe::multiply(self.data_type.element_size()?, self.depth)?;
        let offset = self.offset_of(point)?;
        let end = offset + pixel;
        if end > self.data.len() {
            return Err(Error::out_of_range(
                (point.x, point.y),
                (point.x + 1, point.y + 1),
                (self.width(), self.height()),
            ));
        }
        Ok(offset..end)
    }

    /// The `depth` samples of the pixel at `point`.
    pub fn pixel(&self, point: Point2D<usize>) -> Result<&[u8]> {
        let range = self.pixel_range(point)?;
        Ok(&self.data[range])
    }

    /// Mutable form of [`pixel`](Self::pixel).
    pub fn pixel_mut(&mut self, point: Point2D<usize>) -> Result<&mut [u8]> {
        let range = self.pixel_range(point)?;
        Ok(&mut self.data[range])
    }

    fn line_range(&self, y: usize) -> Result<std::ops::Range<usize>> {
        if y >= self.height() {
            return Err(Error::out_of_range(
                (0, y),
                (self.width(), y.saturating_add(1)),
                (self.width(), self.height()),
            ));
        }
        let start = y * self.bytes_per_line;
        Ok(start..start + self.tight_bytes_per_line())
    }

    /// Pixel bytes of line `y`, padding excluded.
    pub fn line(&self, y: usize) -> Result<&[u8]> {
        let range = self.line_range(y)?;
        Ok(&self.data[range])
    }

    /// Mutable form of [`line`](Self::line).
    pub fn line_mut(&mut self, y: usize) -> Result<&mut [u8]> {
        let range = self.line_range(y)?;
        Ok(&mut self.data[range])
    }

    /// Iterates the pixel bytes of every line, top to bottom.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        let (stride, tight) = (self.bytes_per_line, self.tight_bytes_per_line());
        (0..self.height()).map(move |y| &self.data[y * stride..y * stride + tight])
    }

    /// Returns `true` if lines carry no padding.
    #[inline]
    pub fn has_zero_padding(&self) -> bool {
        self.bytes_per_line == self.tight_bytes_per_line()
    }

    /// Releases the store and returns to the empty state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Moves the contents out, leaving an empty buffer.
    #[inline]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Consumes the buffer and returns its store, padding included.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The whole store, padding included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the store. Its length cannot change through this.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Element type.
    #[inline]
    pub fn data_type(&self) -> PixelDataType {
        self.data_type
    }

    /// Channels per pixel.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Frame size in pixels.
    #[inline]
    pub fn size(&self) -> Size2D<usize> {
        self.size
    }

    /// Pixels per line.
    #[inline]
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Number of lines.
    #[inline]
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Distance in bytes between line starts.
    #[inline]
    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Returns `true` if the store holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Clone for RasterBuffer {
    fn clone(&self) -> Self {
        debug_assert_eq!(
            self.data.len(),
            self.bytes_per_line * self.size.height,
            "frame store does not match its layout"
        );
        Self {
            data: self.data.clone(),
            ..*self
        }
    }

    fn clone_from(&mut self, source: &Self) {
        debug_assert_eq!(
            source.data.len(),
            source.bytes_per_line * source.size.height,
            "frame store does not match its layout"
        );
        self.data.clone_from(&source.data);
        self.set_shape(source.data_type, source.size, source.depth, source.bytes_per_line);
    }
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("data_type", &self.data_type)
            .field("depth", &self.depth)
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .field("bytes_per_line", &self.bytes_per_line)
            .field("len", &self.data.len())
            .finish()
    }
}
