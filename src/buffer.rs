//! RGBA pixel buffer shared by every stage of the engine.
//!
//! A [`PixelBuffer`] is a tightly packed, row-major raster of 8-bit RGBA
//! pixels with a top-left origin. The byte length is always
//! `width * height * 4`, and both dimensions are always non-zero.

use image::RgbaImage;

use crate::error::{Error, Result};

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// An owned RGBA raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zero-filled (transparent black) buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero and
    /// [`Error::Allocation`] if the backing storage cannot be reserved.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        let data = try_alloc(len).ok_or(Error::Allocation { width, height })?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate a buffer where every pixel equals `rgba`.
    ///
    /// # Errors
    ///
    /// Same as [`PixelBuffer::new`].
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let mut buf = Self::new(width, height)?;
        for px in buf.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
        Ok(buf)
    }

    /// Wrap existing RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a zero dimension and
    /// [`Error::BufferSize`] when `data.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of a decoded `image` crate raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty image.
    pub fn from_rgba_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }

    /// Convert back into an `image` crate raster for encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if the raster cannot be rebuilt, which
    /// only happens if the length invariant was broken.
    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let (width, height) = (self.width, self.height);
        let actual = self.data.len();
        RgbaImage::from_raw(width, height, self.data).ok_or(Error::BufferSize {
            expected: width as usize * height as usize * CHANNELS,
            actual,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bytes in one row.
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes, row-major.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Byte offset of the pixel at `(x, y)`.
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Copy the current pixel data into a read-only snapshot.
    ///
    /// Passes that read neighbours while writing take one of these first so
    /// they never observe their own partial output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the copy cannot be reserved.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let mut copy = Vec::new();
        copy.try_reserve_exact(self.data.len())
            .map_err(|_| Error::Allocation {
                width: self.width,
                height: self.height,
            })?;
        copy.extend_from_slice(&self.data);
        Ok(copy)
    }
}

/// Round and clamp a channel value into `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Checked `width * height * 4`.
fn byte_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(Error::Allocation { width, height })
}

/// Zeroed allocation that reports failure instead of aborting.
fn try_alloc(len: usize) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).ok()?;
    data.resize(len, 0);
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_zeroed_with_exact_length() {
        let buf = PixelBuffer::new(7, 3).unwrap();
        assert_eq!(buf.dimensions(), (7, 3));
        assert_eq!(buf.as_raw().len(), 7 * 3 * 4);
        assert!(buf.as_raw().iter().all(|&b| b == 0));
        assert_eq!(buf.row_len(), 28);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 10),
            Err(Error::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(10, 0, Vec::new()),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn from_raw_checks_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn oversized_request_reports_allocation_failure() {
        let err = PixelBuffer::new(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, Error::Allocation { .. }));
    }

    #[test]
    fn pixel_access_is_row_major_rgba() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.put_pixel(2, 1, [1, 2, 3, 4]);
        assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
        assert_eq!(&buf.as_raw()[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn filled_sets_every_pixel() {
        let buf = PixelBuffer::filled(4, 4, [9, 8, 7, 6]).unwrap();
        for px in buf.as_raw().chunks_exact(CHANNELS) {
            assert_eq!(px, &[9, 8, 7, 6]);
        }
    }

    #[test]
    fn rgba_image_round_trip_preserves_pixels() {
        let mut img = RgbaImage::new(5, 4);
        img.put_pixel(3, 2, image::Rgba([10, 20, 30, 40]));
        let buf = PixelBuffer::from_rgba_image(img.clone()).unwrap();
        assert_eq!(buf.pixel(3, 2), [10, 20, 30, 40]);
        assert_eq!(buf.into_rgba_image().unwrap(), img);
    }

    #[test]
    fn snapshot_is_independent_copy() {
        let mut buf = PixelBuffer::filled(2, 2, [5, 5, 5, 255]).unwrap();
        let snap = buf.snapshot().unwrap();
        buf.put_pixel(0, 0, [0, 0, 0, 0]);
        assert_eq!(&snap[0..4], &[5, 5, 5, 255]);
    }

    #[test]
    fn to_channel_rounds_and_clamps() {
        assert_eq!(to_channel(-3.0), 0);
        assert_eq!(to_channel(300.0), 255);
        assert_eq!(to_channel(127.5), 128);
        assert_eq!(to_channel(127.4), 127);
    }
}
