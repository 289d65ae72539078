//! Mirror operations on planar grids.

use tracing::trace;
use visaug_core::{Grid, Result};

use crate::driver::gather_pixels;

/// Mirrors left to right.
pub fn hflip(grid: &Grid) -> Result<Grid> {
    let w = grid.width();
    trace!(width = w, height = grid.height(), "hflip");
    gather_pixels(grid, grid.shape().element(), &[], |c, y, x| Some((c, y, w - 1 - x)))
}

/// Mirrors top to bottom.
pub fn vflip(grid: &Grid) -> Result<Grid> {
    let h = grid.height();
    trace!(width = grid.width(), height = h, "vflip");
    gather_pixels(grid, grid.shape().element(), &[], |c, y, x| Some((c, h - 1 - y, x)))
}
