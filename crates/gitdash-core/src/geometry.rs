#![forbid(unsafe_code)]

//! Geometric primitives.

/// Panel bounds in terminal cells, expressed as two corners.
///
/// `(x0, y0)` is the origin and `(x1, y1)` the extent, both inclusive, which
/// is how a rendering backend draws a framed panel: the frame sits on the
/// edges and content occupies the cells strictly between them.
///
/// Coordinates are signed. Centering a tall panel on a short screen yields a
/// negative top edge; backends clip, the geometry does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl Bounds {
    /// Create bounds from two corners.
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal span between the edges.
    #[inline]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Vertical span between the edges.
    #[inline]
    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Rows available for content between the top and bottom frame edges.
    #[inline]
    pub const fn inner_rows(&self) -> i32 {
        let rows = self.height() - 1;
        if rows < 0 { 0 } else { rows }
    }

    /// Columns available for content between the left and right frame edges.
    #[inline]
    pub const fn inner_cols(&self) -> i32 {
        let cols = self.width() - 1;
        if cols < 0 { 0 } else { cols }
    }

    /// Same horizontal extent, new vertical extent.
    #[inline]
    #[must_use]
    pub const fn with_rows(self, y0: i32, y1: i32) -> Self {
        Self {
            x0: self.x0,
            y0,
            x1: self.x1,
            y1,
        }
    }

    /// Grow the bottom edge by `rows`.
    #[inline]
    #[must_use]
    pub const fn extend_bottom(self, rows: i32) -> Self {
        Self {
            y1: self.y1 + rows,
            ..self
        }
    }

    /// Whether a cell lies on or inside the edges.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Whether the bounds describe something a backend could draw.
    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        self.x1 < self.x0 || self.y1 < self.y0
    }
}

/// Size of the terminal screen in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenSize {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

impl ScreenSize {
    /// Create a new screen size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u16, u16)> for ScreenSize {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(width, height)
    }
}
