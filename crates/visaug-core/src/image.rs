//! The unified image type accepted by functional entry points.
//!
//! Every functional operation takes an [`Image`] and returns an [`Image`] of
//! the same encoding: a packed input yields a packed output, a grid yields a
//! grid (batched or not).

use crate::dtype::DType;
use crate::error::Result;
use crate::grid::{Grid, Shape};
use crate::packed::PackedImage;

/// Either of the two supported image encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// Interleaved 8-bit image.
    Packed(PackedImage),
    /// Planar numeric grid, optionally batched.
    Grid(Grid),
}

impl Image {
    /// Channel count.
    pub fn channels(&self) -> usize {
        match self {
            Self::Packed(p) => p.channels(),
            Self::Grid(g) => g.channels(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        match self {
            Self::Packed(p) => p.height(),
            Self::Grid(g) => g.height(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        match self {
            Self::Packed(p) => p.width(),
            Self::Grid(g) => g.width(),
        }
    }

    /// Sample type; packed images are always `u8`.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Packed(_) => DType::U8,
            Self::Grid(g) => g.dtype(),
        }
    }

    /// Grid-equivalent shape.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Packed(p) => Shape::image(p.channels(), p.height(), p.width()),
            Self::Grid(g) => g.shape(),
        }
    }

    /// Whether this is a batched grid.
    pub fn is_batched(&self) -> bool {
        matches!(self, Self::Grid(g) if g.is_batched())
    }

    /// Whether this is a packed image.
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::Packed(_))
    }

    /// Borrows the grid, if this is one.
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Self::Grid(g) => Some(g),
            Self::Packed(_) => None,
        }
    }

    /// Borrows the packed image, if this is one.
    pub fn as_packed(&self) -> Option<&PackedImage> {
        match self {
            Self::Packed(p) => Some(p),
            Self::Grid(_) => None,
        }
    }

    /// Planar view of the image; packed images are converted.
    pub fn to_grid(&self) -> Grid {
        match self {
            Self::Packed(p) => p.to_grid(),
            Self::Grid(g) => g.clone(),
        }
    }

    /// Consumes the image, returning a planar grid.
    pub fn into_grid(self) -> Grid {
        match self {
            Self::Packed(p) => p.to_grid(),
            Self::Grid(g) => g,
        }
    }

    /// Wraps a grid result in the same encoding as `self`.
    pub fn rewrap(&self, grid: Grid) -> Result<Image> {
        match self {
            Self::Packed(_) => Ok(Self::Packed(PackedImage::from_grid(&grid)?)),
            Self::Grid(_) => Ok(Self::Grid(grid)),
        }
    }
}

impl From<Grid> for Image {
    fn from(grid: Grid) -> Self {
        Self::Grid(grid)
    }
}

impl From<PackedImage> for Image {
    fn from(packed: PackedImage) -> Self {
        Self::Packed(packed)
    }
}
