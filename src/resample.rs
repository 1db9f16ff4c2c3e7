//! Geometric rescaling with windowed-sinc (Lanczos) interpolation.
//!
//! Destination pixel `(dx, dy)` maps to source coordinate
//! `(dx * w / w', dy * h / h')`. The 2D weight of a source pixel is the
//! product of the 1D kernel evaluated on each axis. Source samples that fall
//! outside the image are skipped, not clamped, so the total weight shrinks
//! near the borders and the result is renormalised by it. All four channels,
//! alpha included, are interpolated.

use std::f64::consts::PI;

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::error::{Error, Result};
use crate::parallel;

/// Lanczos window radius `a`.
pub const LANCZOS_RADIUS: i64 = 3;

/// Interpolation kernel used by [`resample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Lanczos with `a = 3`, a 6x6 source neighbourhood.
    #[default]
    Lanczos3,
    /// 2x2 bilinear blend, clamping the far tap to the last row/column.
    Bilinear,
}

/// The Lanczos kernel `L(t)` with window radius `a`.
///
/// `L(0) = 1`, `L(t) = 0` for `|t| >= a` and for every other integer `t`,
/// otherwise `a * sin(pi t) * sin(pi t / a) / (pi t)^2`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn lanczos(t: f64, a: f64) -> f64 {
    if t == 0.0 {
        return 1.0;
    }
    if t.abs() >= a || t.fract() == 0.0 {
        return 0.0;
    }
    let pt = PI * t;
    a * pt.sin() * (pt / a).sin() / (pt * pt)
}

/// Source taps `(index, weight)` for one destination coordinate on one axis.
type Taps = Vec<(usize, f64)>;

/// Per-destination taps along an axis of `src_len` pixels scaled to `dst_len`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::float_cmp
)]
fn axis_taps(src_len: u32, dst_len: u32, interpolation: Interpolation) -> Vec<Taps> {
    let ratio = f64::from(src_len) / f64::from(dst_len);
    let len = i64::from(src_len);

    (0..dst_len)
        .map(|d| {
            let s = f64::from(d) * ratio;
            let s0 = s.floor() as i64;
            match interpolation {
                Interpolation::Lanczos3 => (1 - LANCZOS_RADIUS..=LANCZOS_RADIUS)
                    .map(|i| s0 + i)
                    .filter(|p| (0..len).contains(p))
                    .map(|p| (p as usize, lanczos(s - p as f64, LANCZOS_RADIUS as f64)))
                    .filter(|&(_, w)| w != 0.0)
                    .collect(),
                Interpolation::Bilinear => {
                    let frac = s - s0 as f64;
                    let p0 = s0.clamp(0, len - 1) as usize;
                    let p1 = (s0 + 1).clamp(0, len - 1) as usize;
                    vec![(p0, 1.0 - frac), (p1, frac)]
                }
            }
        })
        .collect()
}

/// Output dimensions `floor(w * scale) x floor(h * scale)`.
///
/// # Errors
///
/// Returns [`Error::InvalidScale`] for a non-finite or non-positive scale,
/// [`Error::InvalidDimensions`] if either result is zero, and
/// [`Error::Allocation`] if either exceeds `u32::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> Result<(u32, u32)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidScale(scale));
    }
    let w = (f64::from(width) * scale).floor();
    let h = (f64::from(height) * scale).floor();
    let limit = f64::from(u32::MAX);
    if w > limit || h > limit {
        return Err(Error::Allocation {
            width: w.min(limit) as u32,
            height: h.min(limit) as u32,
        });
    }
    let (w, h) = (w as u32, h as u32);
    if w == 0 || h == 0 {
        return Err(Error::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

/// Produce a new buffer scaled by `scale` on both axes.
///
/// Any positive scale is accepted; downscaling works but only upscaling
/// (`scale >= 1`) guarantees that every destination pixel has a source
/// sample. A destination pixel whose total weight is zero is left as
/// transparent black.
///
/// # Errors
///
/// See [`scaled_dimensions`]; also [`Error::Allocation`] if the output
/// buffer cannot be allocated.
pub fn resample(
    buffer: &PixelBuffer,
    scale: f64,
    interpolation: Interpolation,
) -> Result<PixelBuffer> {
    let (src_w, src_h) = buffer.dimensions();
    let (dst_w, dst_h) = scaled_dimensions(src_w, src_h, scale)?;
    let mut out = PixelBuffer::new(dst_w, dst_h)?;

    let x_taps = axis_taps(src_w, dst_w, interpolation);
    let y_taps = axis_taps(src_h, dst_h, interpolation);
    let src = buffer.as_raw();
    let src_row = buffer.row_len();
    let dst_row = out.row_len();

    let empty: usize = parallel::map_rows(out.as_raw_mut(), dst_row, 0, |y, row| {
        let mut empty = 0usize;
        for (x, xt) in x_taps.iter().enumerate() {
            let mut acc = [0.0f64; CHANNELS];
            let mut total = 0.0f64;
            for &(sy, wy) in &y_taps[y] {
                let line = &src[sy * src_row..(sy + 1) * src_row];
                for &(sx, wx) in xt {
                    let w = wx * wy;
                    let px = &line[sx * CHANNELS..(sx + 1) * CHANNELS];
                    for (a, &v) in acc.iter_mut().zip(px) {
                        *a += f64::from(v) * w;
                    }
                    total += w;
                }
            }
            if total.abs() < f64::EPSILON {
                empty += 1;
                continue;
            }
            let dst = &mut row[x * CHANNELS..(x + 1) * CHANNELS];
            for (d, a) in dst.iter_mut().zip(acc) {
                *d = to_channel_f64(a / total);
            }
        }
        empty
    })
    .into_iter()
    .sum();

    if empty > 0 {
        tracing::warn!(empty, scale, "destination pixels had no source weight");
    }
    tracing::debug!(src_w, src_h, dst_w, dst_h, ?interpolation, "resampled");
    Ok(out)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel_f64(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
