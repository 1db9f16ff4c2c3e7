//! Pipelines over whole buffers, plus file-level glue.
//!
//! The pipelines are pure: each takes one [`PixelBuffer`] and returns one,
//! holding no state between calls.
//!
//! - watermark removal: region heuristic (or an explicit region), inpaint
//!   each region, one global smoothing pass
//! - text watermark removal: the denser text heuristic, same fill
//! - upscale: resample, sharpen, edge enhancement
//!
//! Decoding and encoding go through the `image` crate and are only used by
//! [`process_file`] and [`process_directory`].

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::buffer::PixelBuffer;
use crate::detection::{detect_regions, DetectionMode};
use crate::error::{Error, Result};
use crate::filter::{self, DEFAULT_EDGE_STRENGTH};
use crate::inpaint::{inpaint_regions, InpaintOptions};
use crate::region::Region;
use crate::resample::{resample, Interpolation};

/// How detected regions are filled. Shared by both watermark pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// Fill parameters applied to every region.
    pub inpaint: InpaintOptions,
    /// Run the global 3x3 smoothing pass after filling.
    pub smooth: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            inpaint: InpaintOptions::default(),
            smooth: true,
        }
    }
}

/// Options for [`remove_watermark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatermarkOptions {
    /// Explicit region to repair instead of the placement heuristic.
    pub region: Option<Region>,
    /// Fill parameters.
    pub fill: FillOptions,
}

/// Options for [`upscale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpscaleOptions {
    /// Resampling kernel.
    pub interpolation: Interpolation,
    /// Run the sharpen pass after resampling.
    pub sharpen: bool,
    /// Run the Sobel edge-enhancement pass after sharpening.
    pub enhance_edges: bool,
    /// Multiplier applied to the gradient magnitude when enhancing edges.
    pub edge_strength: f32,
}

impl Default for UpscaleOptions {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Lanczos3,
            sharpen: true,
            enhance_edges: true,
            edge_strength: DEFAULT_EDGE_STRENGTH,
        }
    }
}

impl UpscaleOptions {
    /// Resampling only, no post filters.
    #[must_use]
    pub fn resample_only() -> Self {
        Self {
            sharpen: false,
            enhance_edges: false,
            ..Self::default()
        }
    }
}

/// Which pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Generic watermark removal.
    RemoveWatermark,
    /// Text watermark removal.
    RemoveTextWatermark,
    /// Upscale by the given factor.
    Upscale(f64),
}

/// Options controlling file processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessOptions {
    /// The pipeline to run.
    pub operation: Operation,
    /// Parameters for the watermark pipelines.
    pub watermark: WatermarkOptions,
    /// Parameters for the upscale pipeline.
    pub upscale: UpscaleOptions,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            operation: Operation::RemoveWatermark,
            watermark: WatermarkOptions::default(),
            upscale: UpscaleOptions::default(),
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Output dimensions when processing succeeded.
    pub output_size: Option<(u32, u32)>,
    /// Human-readable status message.
    pub message: String,
}

/// Remove a watermark by inpainting heuristic (or explicit) regions.
///
/// # Errors
///
/// Returns [`Error::InvalidRegion`] if an explicit region has a non-positive
/// extent or misses the buffer, and [`Error::Allocation`] if a working
/// snapshot cannot be allocated.
pub fn remove_watermark(mut buffer: PixelBuffer, options: &WatermarkOptions) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    let regions = match options.region {
        Some(region) => {
            if region.clip(width, height).is_none() {
                return Err(Error::InvalidRegion {
                    x: region.x,
                    y: region.y,
                    width: region.width,
                    height: region.height,
                    buffer_width: width,
                    buffer_height: height,
                });
            }
            vec![region]
        }
        None => detect_regions(width, height, DetectionMode::Generic),
    };

    let fill = &options.fill;
    let applied = inpaint_regions(&mut buffer, &regions, &fill.inpaint, fill.smooth)?;
    tracing::debug!(width, height, regions = applied, "watermark removed");
    Ok(buffer)
}

/// Remove a text watermark using the text placement heuristic.
///
/// Regions always come from the heuristic; there is no explicit override.
///
/// # Errors
///
/// Returns [`Error::Allocation`] if a working snapshot cannot be allocated.
pub fn remove_text_watermark(mut buffer: PixelBuffer, options: &FillOptions) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    let regions = detect_regions(width, height, DetectionMode::Text);
    let applied = inpaint_regions(&mut buffer, &regions, &options.inpaint, options.smooth)?;
    tracing::debug!(width, height, regions = applied, "text watermark removed");
    Ok(buffer)
}

/// Scale up (or down) and optionally sharpen and enhance edges.
///
/// # Errors
///
/// Returns [`Error::InvalidScale`], [`Error::InvalidDimensions`] or
/// [`Error::Allocation`] as described for [`resample`].
pub fn upscale(buffer: &PixelBuffer, scale: f64, options: &UpscaleOptions) -> Result<PixelBuffer> {
    let mut out = resample(buffer, scale, options.interpolation)?;
    if options.sharpen {
        filter::sharpen(&mut out)?;
    }
    if options.enhance_edges {
        filter::enhance_edges(&mut out, options.edge_strength)?;
    }
    tracing::debug!(
        scale,
        width = out.width(),
        height = out.height(),
        sharpen = options.sharpen,
        edges = options.enhance_edges,
        "upscaled"
    );
    Ok(out)
}

/// Run the pipeline selected by `options.operation`.
///
/// # Errors
///
/// Propagates the errors of the selected pipeline.
pub fn apply(buffer: PixelBuffer, options: &ProcessOptions) -> Result<PixelBuffer> {
    match options.operation {
        Operation::RemoveWatermark => remove_watermark(buffer, &options.watermark),
        Operation::RemoveTextWatermark => remove_text_watermark(buffer, &options.watermark.fill),
        Operation::Upscale(scale) => upscale(&buffer, scale, &options.upscale),
    }
}

/// Decode an image file into an RGBA buffer.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).map_err(Error::Decode)?;
    PixelBuffer::from_rgba_image(img.to_rgba8())
}

/// Process a single image file: load, run the pipeline, save.
///
/// Returns a [`ProcessResult`] indicating success or failure.
#[must_use]
pub fn process_file(input: &Path, output: &Path, opts: &ProcessOptions) -> ProcessResult {
    let mut result = ProcessResult {
        path: input.to_path_buf(),
        success: false,
        output_size: None,
        message: String::new(),
    };

    let buffer = match load_image(input) {
        Ok(b) => b,
        Err(e) => {
            result.message = format!("Failed to load: {e}");
            return result;
        }
    };

    let processed = match apply(buffer, opts) {
        Ok(b) => b,
        Err(e) => {
            result.message = format!("Failed to process: {e}");
            return result;
        }
    };
    let size = processed.dimensions();

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                result.message = format!("Failed to create output directory: {e}");
                return result;
            }
        }
    }

    match save_image(processed, output) {
        Ok(()) => {
            result.success = true;
            result.output_size = Some(size);
            result.message = match opts.operation {
                Operation::Upscale(scale) => format!("Upscaled x{scale} to {}x{}", size.0, size.1),
                _ => "Watermark removed".to_string(),
            };
        }
        Err(e) => {
            result.message = format!("Failed to save: {e}");
        }
    }

    result
}

/// Process all supported images in a directory.
///
/// Files are independent; with the `parallel` feature they are processed
/// concurrently (via rayon). Results come back in directory order.
#[must_use]
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    opts: &ProcessOptions,
) -> Vec<ProcessResult> {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
        Ok(rd) => rd
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| is_supported_image(p))
            .collect(),
        Err(e) => {
            return vec![ProcessResult {
                path: input_dir.to_path_buf(),
                success: false,
                output_size: None,
                message: format!("Failed to read directory: {e}"),
            }];
        }
    };
    entries.sort();

    if !output_dir.exists() {
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            return vec![ProcessResult {
                path: output_dir.to_path_buf(),
                success: false,
                output_size: None,
                message: format!("Failed to create output directory: {e}"),
            }];
        }
    }

    let run = |input_path: &PathBuf| {
        let output_path = input_path
            .file_name()
            .map_or_else(|| output_dir.to_path_buf(), |name| output_dir.join(name));
        process_file(input_path, &output_path, opts)
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        entries.par_iter().map(run).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        entries.iter().map(run).collect()
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Encode a buffer by file extension.
///
/// PNG, WebP and BMP keep alpha. JPEG drops alpha and is written at
/// quality 100. Nothing from the source file's metadata is carried over.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(buffer: PixelBuffer, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgba8(buffer.into_rgba_image()?);

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(dyn_img.to_rgb8()))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// `"photo.jpg"` becomes `"photo_cleaned.jpg"` for watermark removal and
/// `"photo_x4.jpg"` for a 4x upscale.
#[must_use]
pub fn default_output_path(input: &Path, operation: Operation) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    let suffix = match operation {
        Operation::Upscale(scale) => format!("x{scale}"),
        Operation::RemoveWatermark | Operation::RemoveTextWatermark => "cleaned".to_string(),
    };
    parent.join(format!("{stem}_{suffix}.{ext}"))
}
