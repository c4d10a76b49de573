//! Axis-aligned bounding rectangles in source pixel coordinates.

/// An axis-aligned rectangle with **inclusive** bounds.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`, so a rectangle is never
/// empty and its width/height are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Leftmost column, inclusive.
    pub min_x: u32,
    /// Rightmost column, inclusive.
    pub max_x: u32,
    /// Topmost row, inclusive.
    pub min_y: u32,
    /// Bottommost row, inclusive.
    pub max_y: u32,
}

impl Rect {
    /// A 1x1 rectangle at the given pixel.
    #[must_use]
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    /// Width in pixels (inclusive bounds).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Height in pixels (inclusive bounds).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Grow the bounds to include the given pixel.
    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Axis-aligned gap in X: zero when the projections overlap or touch.
    #[must_use]
    pub fn gap_x(&self, other: &Rect) -> u32 {
        axis_gap(self.min_x, self.max_x, other.min_x, other.max_x)
    }

    /// Axis-aligned gap in Y: zero when the projections overlap or touch.
    #[must_use]
    pub fn gap_y(&self, other: &Rect) -> u32 {
        axis_gap(self.min_y, self.max_y, other.min_y, other.max_y)
    }

    /// Whether both axis gaps are strictly below `gap`.
    #[must_use]
    pub fn is_near(&self, other: &Rect, gap: u32) -> bool {
        self.gap_x(other) < gap && self.gap_y(other) < gap
    }

    /// Bounding union: min of mins, max of maxes.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// `max(0, b_min - a_max, a_min - b_max)` on one axis.
fn axis_gap(a_min: u32, a_max: u32, b_min: u32, b_max: u32) -> u32 {
    if b_min > a_max {
        b_min - a_max
    } else if a_min > b_max {
        a_min - b_max
    } else {
        0
    }
}
