//! Region inpainting by distance-weighted sampling of the surroundings.
//!
//! Each pixel inside the target region is replaced by a weighted mean of the
//! pixels within `radius` (a square window) that lie *outside* the region.
//! The weight of a neighbour at offset `(dx, dy)` is
//! `1 / (1 + sqrt(dx^2 + dy^2))` in [`InpaintMode::Weighted`], or `1` in
//! [`InpaintMode::Uniform`]. Alpha is never modified.
//!
//! The pass is repeated `iterations` times, each against a fresh snapshot.
//! When several regions are filled together, every pass refills all of them
//! in order, so a region sees its neighbours' values from the current pass.
//! A pixel that has at least one exterior neighbour is always computed from
//! the exterior only, so it settles on the first pass. A pixel deeper than
//! `radius` inside the region has no exterior neighbour; it is filled from
//! region pixels that received a value on an earlier pass, so the fill grows
//! inward by `radius` per iteration. A pixel with neither is left as is.

use crate::buffer::{to_channel, PixelBuffer, CHANNELS};
use crate::error::{Error, Result};
use crate::filter;
use crate::parallel;
use crate::region::{Bounds, Region};

/// How neighbours are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InpaintMode {
    /// Inverse-distance weights, `1 / (1 + distance)`.
    #[default]
    Weighted,
    /// Plain mean of all usable neighbours.
    Uniform,
}

/// Parameters for [`inpaint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InpaintOptions {
    /// Half-size of the square sampling window.
    pub radius: u32,
    /// Number of passes over the region.
    pub iterations: u32,
    /// Neighbour weighting.
    pub mode: InpaintMode,
}

impl Default for InpaintOptions {
    fn default() -> Self {
        Self {
            radius: 8,
            iterations: 3,
            mode: InpaintMode::Weighted,
        }
    }
}

impl InpaintOptions {
    /// The cheap variant: radius 5, uniform mean, single pass.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            radius: 5,
            iterations: 1,
            mode: InpaintMode::Uniform,
        }
    }
}

/// Precomputed `(dx, dy, weight)` for every offset in the window.
///
/// The window is capped at the larger side of a `width x height` buffer;
/// offsets past that are always off the buffer.
fn window_weights(
    radius: u32,
    mode: InpaintMode,
    width: u32,
    height: u32,
) -> Result<Vec<(i64, i64, f32)>> {
    let r = i64::from(radius.min(width.max(height)));
    let len = usize::try_from(2 * r + 1)
        .ok()
        .and_then(|side| side.checked_mul(side))
        .ok_or(Error::Allocation { width, height })?;
    let mut taps = Vec::new();
    taps.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { width, height })?;
    for dy in -r..=r {
        for dx in -r..=r {
            let weight = match mode {
                InpaintMode::Uniform => 1.0,
                #[allow(clippy::cast_precision_loss)]
                InpaintMode::Weighted => {
                    let dist = ((dx * dx + dy * dy) as f32).sqrt();
                    1.0 / (1.0 + dist)
                }
            };
            taps.push((dx, dy, weight));
        }
    }
    Ok(taps)
}

/// Running weighted RGB sum.
#[derive(Default)]
struct Accum {
    rgb: [f32; 3],
    weight: f32,
}

impl Accum {
    fn add(&mut self, px: &[u8], weight: f32) {
        for (sum, &v) in self.rgb.iter_mut().zip(px) {
            *sum += f32::from(v) * weight;
        }
        self.weight += weight;
    }

    fn mean(&self) -> Option<[u8; 3]> {
        (self.weight > 0.0).then(|| self.rgb.map(|s| to_channel(s / self.weight)))
    }
}

/// A clipped region and which of its pixels already hold a filled value.
struct RegionFill {
    bounds: Bounds,
    /// Row-major within `bounds`.
    filled: Vec<bool>,
}

impl RegionFill {
    fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            filled: vec![false; bounds.width() as usize * bounds.height() as usize],
        }
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn is_filled(&self, x: i64, y: i64) -> bool {
        let b = &self.bounds;
        let i = (y as usize - b.y0 as usize) * b.width() as usize + (x as usize - b.x0 as usize);
        self.filled[i]
    }
}

/// Fill `region` in place from its surroundings.
///
/// The region is clipped to the buffer first; a region that misses the
/// buffer entirely is ignored. Pixels outside the region are never written.
///
/// # Errors
///
/// Returns [`Error::Allocation`] if the sampling window or a snapshot cannot
/// be allocated.
pub fn inpaint(buffer: &mut PixelBuffer, region: Region, options: &InpaintOptions) -> Result<()> {
    let Some(bounds) = region.clip(buffer.width(), buffer.height()) else {
        tracing::trace!(?region, "region misses buffer, skipped");
        return Ok(());
    };
    fill_regions(buffer, &mut [RegionFill::new(bounds)], options)
}

/// Run `options.iterations` passes; each pass refills every region in order.
fn fill_regions(
    buffer: &mut PixelBuffer,
    fills: &mut [RegionFill],
    options: &InpaintOptions,
) -> Result<()> {
    let taps = window_weights(options.radius, options.mode, buffer.width(), buffer.height())?;
    for pass in 0..options.iterations {
        for fill in fills.iter_mut() {
            fill_pass(buffer, fill, &taps)?;
        }
        tracing::trace!(pass, regions = fills.len(), "inpaint pass");
    }
    Ok(())
}

/// One snapshot-based pass over a single region.
fn fill_pass(buffer: &mut PixelBuffer, fill: &mut RegionFill, taps: &[(i64, i64, f32)]) -> Result<()> {
    let src = buffer.snapshot()?;
    let (width, height) = (i64::from(buffer.width()), i64::from(buffer.height()));
    let row_len = buffer.row_len();
    let bounds = fill.bounds;
    let region_w = bounds.width() as usize;
    let known = &*fill;
    let rows =
        &mut buffer.as_raw_mut()[bounds.y0 as usize * row_len..bounds.y1 as usize * row_len];

    let next: Vec<Vec<bool>> = parallel::map_rows(rows, row_len, bounds.y0 as usize, |y, row| {
        #[allow(clippy::cast_possible_wrap)]
        let y = y as i64;
        let mut row_filled = vec![false; region_w];
        for x in bounds.x0..bounds.x1 {
            let x = i64::from(x);
            let mut exterior = Accum::default();
            let mut interior = Accum::default();

            for &(dx, dy, weight) in taps {
                let (nx, ny) = (x + dx, y + dy);
                if !(0..width).contains(&nx) || !(0..height).contains(&ny) {
                    continue;
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let offset = (ny as usize * width as usize + nx as usize) * CHANNELS;
                let px = &src[offset..offset + 3];
                if !bounds.contains(nx, ny) {
                    exterior.add(px, weight);
                } else if known.is_filled(nx, ny) {
                    interior.add(px, weight);
                }
            }

            if let Some(rgb) = exterior.mean().or_else(|| interior.mean()) {
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let i = x as usize * CHANNELS;
                row[i..i + 3].copy_from_slice(&rgb);
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                {
                    row_filled[(x - i64::from(bounds.x0)) as usize] = true;
                }
            }
        }
        row_filled
    });

    fill.filled = next.concat();
    Ok(())
}

/// Inpaint every region, then optionally run one global 3x3 box smoothing
/// pass to blend the seams.
///
/// Each of the `options.iterations` passes refills all regions in order
/// against the current buffer, so adjacent or overlapping regions see each
/// other's latest values and the result depends on both order and pass
/// count. Returns how many regions intersected the buffer.
///
/// # Errors
///
/// Returns [`Error::Allocation`] if the sampling window or a snapshot cannot
/// be allocated.
pub fn inpaint_regions(
    buffer: &mut PixelBuffer,
    regions: &[Region],
    options: &InpaintOptions,
    smooth: bool,
) -> Result<usize> {
    let mut fills: Vec<RegionFill> = regions
        .iter()
        .filter_map(|region| {
            let bounds = region.clip(buffer.width(), buffer.height());
            if bounds.is_none() {
                tracing::warn!(?region, "region dropped after clipping");
            }
            bounds.map(RegionFill::new)
        })
        .collect();
    fill_regions(buffer, &mut fills, options)?;
    if smooth {
        filter::box_smooth(buffer)?;
    }
    Ok(fills.len())
}
