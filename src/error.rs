//! Error types for the image-toolbox crate.

/// Errors that can occur while preparing, processing, or saving pixel buffers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The output buffer could not be allocated.
    #[error("failed to allocate {width}x{height} RGBA buffer")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Raw pixel data does not match the declared dimensions.
    #[error("pixel data is {actual} bytes, expected {expected}")]
    BufferSize {
        /// Expected length (`width * height * 4`).
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },

    /// A buffer dimension is zero.
    #[error("invalid buffer dimensions {width}x{height}")]
    InvalidDimensions {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// A region has a non-positive extent or does not intersect the buffer.
    #[error("invalid region ({x}, {y}, {width}x{height}) for {buffer_width}x{buffer_height} buffer")]
    InvalidRegion {
        /// Region left edge.
        x: i32,
        /// Region top edge.
        y: i32,
        /// Region width.
        width: i32,
        /// Region height.
        height: i32,
        /// Width of the buffer the region was applied to.
        buffer_width: u32,
        /// Height of the buffer the region was applied to.
        buffer_height: u32,
    },

    /// The scale factor is not a finite positive number.
    #[error("invalid scale factor {0}")]
    InvalidScale(f64),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while encoding or saving an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
