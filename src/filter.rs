//! 3x3 convolution passes: sharpening, Sobel edge enhancement, box smoothing.
//!
//! Every pass reads from a snapshot and writes into the live buffer, so no
//! output pixel sees another's new value. Only R, G and B are filtered;
//! alpha is left as is. The one-pixel border is never convolved: border
//! pixels keep their input values rather than being computed from wrapped or
//! clamped neighbours.

use crate::buffer::{to_channel, PixelBuffer, CHANNELS};
use crate::error::Result;
use crate::parallel;

/// Strength used by [`enhance_edges`] when upscaling.
pub const DEFAULT_EDGE_STRENGTH: f32 = 0.15;

/// An integer 3x3 kernel with a normalising divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    /// Row-major weights, `weights[ky][kx]` applied at offset `(kx - 1, ky - 1)`.
    pub weights: [[i32; 3]; 3],
    /// The weighted sum is divided by this before rounding.
    pub divisor: i32,
}

impl Kernel {
    /// Strong sharpen: eight negative neighbours, centre 9. Sums to 1.
    pub const SHARPEN: Self = Self {
        weights: [[-1, -1, -1], [-1, 9, -1], [-1, -1, -1]],
        divisor: 1,
    };

    /// Mild sharpen on the 4-neighbourhood, centre 5. Sums to 1.
    pub const SHARPEN_MILD: Self = Self {
        weights: [[0, -1, 0], [-1, 5, -1], [0, -1, 0]],
        divisor: 1,
    };

    /// Unweighted mean of the 3x3 neighbourhood.
    pub const BOX: Self = Self {
        weights: [[1, 1, 1], [1, 1, 1], [1, 1, 1]],
        divisor: 9,
    };

    /// Horizontal Sobel gradient.
    pub const SOBEL_X: Self = Self {
        weights: [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]],
        divisor: 1,
    };

    /// Vertical Sobel gradient.
    pub const SOBEL_Y: Self = Self {
        weights: [[-1, -2, -1], [0, 0, 0], [1, 2, 1]],
        divisor: 1,
    };

    /// Sum of all weights divided by the divisor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gain(&self) -> f32 {
        let sum: i32 = self.weights.iter().flatten().sum();
        sum as f32 / self.divisor as f32
    }
}

/// One channel's 3x3 neighbourhood, gathered from a snapshot.
struct Window([[i32; 3]; 3]);

impl Window {
    fn gather(src: &[u8], row_len: usize, x: usize, y: usize, channel: usize) -> Self {
        let mut samples = [[0i32; 3]; 3];
        for (ky, row) in samples.iter_mut().enumerate() {
            let base = (y + ky - 1) * row_len + channel;
            for (kx, s) in row.iter_mut().enumerate() {
                *s = i32::from(src[base + (x + kx - 1) * CHANNELS]);
            }
        }
        Self(samples)
    }

    fn centre(&self) -> i32 {
        self.0[1][1]
    }

    /// Raw weighted sum, before the kernel's divisor.
    fn apply(&self, kernel: &Kernel) -> i32 {
        self.0
            .iter()
            .flatten()
            .zip(kernel.weights.iter().flatten())
            .map(|(s, w)| s * w)
            .sum()
    }
}

/// Recompute every interior R, G, B sample with `f` applied to its window.
fn map_interior<F>(buffer: &mut PixelBuffer, f: F) -> Result<()>
where
    F: Fn(&Window) -> f32 + Send + Sync,
{
    let (width, height) = buffer.dimensions();
    if width < 3 || height < 3 {
        return Ok(());
    }

    let src = buffer.snapshot()?;
    let row_len = buffer.row_len();
    let w = width as usize;
    let last_row = height as usize - 1;
    let interior = &mut buffer.as_raw_mut()[row_len..last_row * row_len];

    parallel::for_each_row(interior, row_len, 1, |y, row| {
        for x in 1..w - 1 {
            for c in 0..3 {
                let window = Window::gather(&src, row_len, x, y, c);
                row[x * CHANNELS + c] = to_channel(f(&window));
            }
        }
    });
    Ok(())
}

/// Convolve the interior with `kernel`.
///
/// # Errors
///
/// Returns [`Error::Allocation`](crate::Error::Allocation) if the snapshot
/// cannot be allocated.
#[allow(clippy::cast_precision_loss)]
pub fn convolve(buffer: &mut PixelBuffer, kernel: &Kernel) -> Result<()> {
    let divisor = kernel.divisor as f32;
    map_interior(buffer, |w| w.apply(kernel) as f32 / divisor)
}

/// Sharpen with [`Kernel::SHARPEN`].
///
/// # Errors
///
/// See [`convolve`].
pub fn sharpen(buffer: &mut PixelBuffer) -> Result<()> {
    convolve(buffer, &Kernel::SHARPEN)
}

/// Blend Sobel edge magnitude into the image.
///
/// Per channel: `out = original + sqrt(gx^2 + gy^2) * strength`, clamped.
/// Edges brighten; flat areas are untouched.
///
/// # Errors
///
/// See [`convolve`].
#[allow(clippy::cast_precision_loss)]
pub fn enhance_edges(buffer: &mut PixelBuffer, strength: f32) -> Result<()> {
    map_interior(buffer, |w| {
        let gx = w.apply(&Kernel::SOBEL_X) as f32;
        let gy = w.apply(&Kernel::SOBEL_Y) as f32;
        let gradient = (gx * gx + gy * gy).sqrt();
        w.centre() as f32 + gradient * strength
    })
}

/// 3x3 box mean over the whole interior, used to blend inpainted seams.
///
/// This softens every interior pixel, not just repaired ones.
///
/// # Errors
///
/// See [`convolve`].
pub fn box_smooth(buffer: &mut PixelBuffer) -> Result<()> {
    convolve(buffer, &Kernel::BOX)
}
