//! Pixel engine for watermark inpainting and high-quality upscaling.
//!
//! Everything operates on a decoded [`PixelBuffer`] (8-bit RGBA, row-major)
//! and returns a buffer; no state is kept between calls.
//!
//! - **Watermark removal** proposes regions from the image dimensions alone
//!   (bottom-right, top-right, bottom-left corners and a bottom band), fills
//!   each by distance-weighted sampling of its surroundings, then blends the
//!   seams with one 3x3 smoothing pass.
//! - **Text watermark removal** uses a smaller, denser set of regions that
//!   adds a top band.
//! - **Upscaling** resamples with a Lanczos-3 kernel, then sharpens and adds
//!   a fraction of the Sobel edge magnitude.
//!
//! # Quick Start
//!
//! ```no_run
//! use image_toolbox::{remove_watermark, upscale, PixelBuffer, UpscaleOptions, WatermarkOptions};
//!
//! let img = image::open("photo.png").unwrap().to_rgba8();
//! let buffer = PixelBuffer::from_rgba_image(img).unwrap();
//!
//! let cleaned = remove_watermark(buffer, &WatermarkOptions::default()).unwrap();
//! let bigger = upscale(&cleaned, 2.0, &UpscaleOptions::default()).unwrap();
//! bigger.into_rgba_image().unwrap().save("photo_x2.png").unwrap();
//! ```
//!
//! # Explicit regions
//!
//! ```
//! use image_toolbox::{remove_watermark, PixelBuffer, Region, WatermarkOptions};
//!
//! let buffer = PixelBuffer::filled(64, 64, [30, 30, 30, 255]).unwrap();
//! let opts = WatermarkOptions {
//!     region: Some(Region::new(40, 50, 20, 10)),
//!     ..WatermarkOptions::default()
//! };
//! let out = remove_watermark(buffer, &opts).unwrap();
//! assert_eq!(out.pixel(45, 55), [30, 30, 30, 255]);
//! ```

#![deny(missing_docs)]

pub mod buffer;
pub mod detection;
mod engine;
pub mod error;
pub mod filter;
pub mod inpaint;
mod parallel;
pub mod region;
pub mod resample;

pub use buffer::PixelBuffer;
pub use detection::{detect_regions, DetectionMode};
pub use engine::{
    apply, default_output_path, is_supported_image, load_image, process_directory, process_file,
    remove_text_watermark, remove_watermark, save_image, upscale, FillOptions, Operation,
    ProcessOptions, ProcessResult, UpscaleOptions, WatermarkOptions,
};
pub use error::{Error, Result};
pub use inpaint::{inpaint, InpaintMode, InpaintOptions};
pub use region::{Bounds, Region};
pub use resample::{resample, Interpolation};
