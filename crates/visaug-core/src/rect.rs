//! Crop rectangles in signed pixel coordinates.
//!
//! A [`Rect`] may describe a region partially or entirely outside an image;
//! the parts that fall outside are padded with zeros when cropped.
//!
//! ```text
//! (0,0) ────────► x (left)
//!   │   ┌──────────┐
//!   │   │   rect   │ height
//!   │   └──────────┘
//!   ▼       width
//!   y (top)
//! ```
//!
//! ```rust
//! use visaug_core::Rect;
//!
//! let r = Rect::new(-2, 3, 10, 4);
//! assert_eq!(r.bottom(), 8);
//! assert_eq!(r.right(), 7);
//! let inside = r.clip(6, 6).unwrap();
//! assert_eq!(inside, Rect::new(0, 3, 6, 3));
//! ```

use std::fmt;

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Row of the top edge (inclusive).
    pub top: i64,
    /// Column of the left edge (inclusive).
    pub left: i64,
    /// Rows covered.
    pub height: i64,
    /// Columns covered.
    pub width: i64,
}

impl Rect {
    /// Creates a rectangle. No validation against any image is done.
    pub const fn new(top: i64, left: i64, height: i64, width: i64) -> Self {
        Self { top, left, height, width }
    }

    /// Row just below the rectangle.
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.top + self.height
    }

    /// Column just right of the rectangle.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.left + self.width
    }

    /// Pixel count, zero for degenerate rectangles.
    #[inline]
    pub fn area(&self) -> i64 {
        self.height.max(0) * self.width.max(0)
    }

    /// Whether the rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height <= 0 || self.width <= 0
    }

    /// Whether `(y, x)` lies inside.
    #[inline]
    pub fn contains(&self, y: i64, x: i64) -> bool {
        y >= self.top && y < self.bottom() && x >= self.left && x < self.right()
    }

    /// Part of the rectangle inside an `height x width` image.
    pub fn clip(&self, height: usize, width: usize) -> Option<Rect> {
        let top = self.top.max(0);
        let left = self.left.max(0);
        let bottom = self.bottom().min(height as i64);
        let right = self.right().min(width as i64);
        if bottom <= top || right <= left {
            return None;
        }
        Some(Rect::new(top, left, bottom - top, right - left))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }
}
