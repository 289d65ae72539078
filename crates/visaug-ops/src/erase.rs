//! Rectangle erasing.

use tracing::trace;
use visaug_core::{Cast, Error, Grid, Rect, Result};

use crate::driver::map_images;

/// Overwrites the `rect` window of every image with `values`.
///
/// `values` holds `C * height * width` samples in planar order and is
/// broadcast over a batch. Integer images truncate the written values.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `rect` is empty or leaves the image
/// - [`Error::ShapeMismatch`] if `values` has the wrong length
pub fn erase(grid: &Grid, rect: Rect, values: &[f64]) -> Result<Grid> {
    let shape = grid.shape();
    let (h, w) = (shape.height, shape.width);
    if rect.is_empty() || rect.top < 0 || rect.left < 0 || rect.bottom() > h as i64 || rect.right() > w as i64 {
        return Err(Error::InvalidArgument(format!(
            "erase window {rect} does not lie inside a {h}x{w} image"
        )));
    }
    let (eh, ew) = (rect.height as usize, rect.width as usize);
    if values.len() != shape.channels * eh * ew {
        return Err(Error::ShapeMismatch(format!(
            "erase needs {} values for a {eh}x{ew} window, got {}",
            shape.channels * eh * ew,
            values.len()
        )));
    }
    trace!(%rect, "erase");

    let (top, left) = (rect.top as usize, rect.left as usize);
    map_images(grid, shape.element(), grid.dtype(), Cast::Truncate, |src, dst| {
        dst.copy_from_slice(src);
        for c in 0..shape.channels {
            for y in 0..eh {
                let d = c * h * w + (top + y) * w + left;
                let s = (c * eh + y) * ew;
                dst[d..d + ew].copy_from_slice(&values[s..s + ew]);
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use visaug_core::{DType, Shape};

    #[test]
    fn test_erase_window() {
        let grid = Grid::from_fn(Shape::image(1, 3, 3), DType::U8, |_, _, _| 9.0).unwrap();
        let out = erase(&grid, Rect::new(1, 1, 2, 1), &[1.7, 2.2]).unwrap();
        assert_eq!(out.as_slice::<u8>().unwrap(), &[9, 9, 9, 9, 1, 9, 9, 2, 9]);
    }

    #[test]
    fn test_erase_validation() {
        let grid = Grid::zeros(Shape::image(2, 3, 3), DType::F32).unwrap();
        assert!(matches!(erase(&grid, Rect::new(2, 2, 2, 2), &[0.0; 8]), Err(Error::InvalidArgument(_))));
        assert!(matches!(erase(&grid, Rect::new(0, 0, 1, 1), &[0.0; 3]), Err(Error::ShapeMismatch(_))));
    }
}
