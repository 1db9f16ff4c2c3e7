//! Placement heuristic for watermark regions.
//!
//! No pixel content is inspected. Candidate regions are derived from the
//! image dimensions alone, sized as a fraction of `min(width, height)` and
//! placed where overlay marks usually sit:
//!
//! - **Generic** (25%): bottom-right, top-right, bottom-left squares and a
//!   bottom-centre band.
//! - **Text** (20%): the same four plus a top-centre band, since text marks
//!   tend to be thin strips rather than square logos.
//!
//! Regions may overhang the buffer; callers clip them with
//! [`Region::clip`](crate::region::Region::clip) and drop the empty ones.

use crate::region::Region;

/// Corner size for generic logo marks, as a fraction of the short side.
const GENERIC_FRACTION: f64 = 0.25;
/// Corner size for text marks, as a fraction of the short side.
const TEXT_FRACTION: f64 = 0.20;

/// Which placement set to propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// Square logo marks in three corners plus a bottom band.
    #[default]
    Generic,
    /// Thinner text marks: corners plus bottom and top bands.
    Text,
}

impl DetectionMode {
    /// Fraction of `min(width, height)` used as the square side.
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Generic => GENERIC_FRACTION,
            Self::Text => TEXT_FRACTION,
        }
    }
}

/// Propose candidate regions for a `width x height` image.
///
/// Order is stable: bottom-right, top-right, bottom-left, bottom-centre,
/// then (text mode only) top-centre. Returns an empty list when the image is
/// too small for the fraction to cover a single pixel.
#[must_use]
pub fn detect_regions(width: u32, height: u32, mode: DetectionMode) -> Vec<Region> {
    let side = corner_side(width, height, mode);
    if side == 0 {
        return Vec::new();
    }

    let w = to_i32(width);
    let h = to_i32(height);

    let band_w = side.saturating_mul(2);
    let band_h = (side / 2).max(1);
    let band_x = (w - band_w) / 2;

    let mut regions = vec![
        Region::new(w - side, h - side, side, side),
        Region::new(w - side, 0, side, side),
        Region::new(0, h - side, side, side),
        Region::new(band_x, h - band_h, band_w, band_h),
    ];
    if mode == DetectionMode::Text {
        regions.push(Region::new(band_x, 0, band_w, band_h));
    }

    tracing::trace!(width, height, ?mode, side, count = regions.len(), "proposed regions");
    regions
}

/// Side length of the corner squares: `floor(min(w, h) * fraction)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn corner_side(width: u32, height: u32, mode: DetectionMode) -> i32 {
    let short = f64::from(width.min(height));
    to_i32((short * mode.fraction()).floor() as u32)
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
