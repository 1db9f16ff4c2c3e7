//! Rectangular regions in pixel coordinates.

/// An axis-aligned rectangle `{x, y, width, height}`.
///
/// Coordinates are signed so that heuristically placed regions may hang off
/// the buffer edge; they are clipped with [`Region::clip`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels. Must be positive to be usable.
    pub width: i32,
    /// Height in pixels. Must be positive to be usable.
    pub height: i32,
}

/// A region clipped to a buffer: half-open pixel bounds `[x0, x1) x [y0, y1)`.
///
/// Always non-empty and always within the buffer it was clipped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// First column inside the region.
    pub x0: u32,
    /// First row inside the region.
    pub y0: u32,
    /// One past the last column.
    pub x1: u32,
    /// One past the last row.
    pub y1: u32,
}

impl Region {
    /// Create a region.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether both extents are positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Intersect with a `buffer_width x buffer_height` buffer.
    ///
    /// Returns `None` for a region with a non-positive extent or one that
    /// lies entirely outside the buffer.
    #[must_use]
    pub fn clip(&self, buffer_width: u32, buffer_height: u32) -> Option<Bounds> {
        if !self.is_valid() {
            return None;
        }
        let (x0, x1) = clip_span(self.x, self.width, buffer_width)?;
        let (y0, y1) = clip_span(self.y, self.height, buffer_height)?;
        Some(Bounds { x0, y0, x1, y1 })
    }
}

/// Clip `[start, start + len)` to `[0, limit)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clip_span(start: i32, len: i32, limit: u32) -> Option<(u32, u32)> {
    let lo = i64::from(start).max(0);
    let hi = (i64::from(start) + i64::from(len)).min(i64::from(limit));
    (lo < hi).then_some((lo as u32, hi as u32))
}

impl Bounds {
    /// Width of the clipped region.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height of the clipped region.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Whether `(x, y)` lies inside. Accepts signed coordinates so callers can
    /// probe neighbours that fall off the buffer.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (i64::from(self.x0)..i64::from(self.x1)).contains(&x)
            && (i64::from(self.y0)..i64::from(self.y1)).contains(&y)
    }
}
