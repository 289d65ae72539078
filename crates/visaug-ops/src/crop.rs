//! Cropping: plain, centred, five-crop and ten-crop.
//!
//! Crop windows may extend past the image; uncovered pixels are zero.

use tracing::{debug, trace};
use visaug_core::{Error, Fill, Grid, Rect, Result};

use crate::driver::gather_pixels;
use crate::flip::{hflip, vflip};
use crate::pad::{pad, PaddingMode};

/// Copies the `rect` window out of every image.
///
/// A window with zero or negative height or width returns the input
/// unchanged.
pub fn crop(grid: &Grid, rect: Rect) -> Result<Grid> {
    if rect.is_empty() {
        debug!(%rect, "empty crop window, returning input");
        return Ok(grid.clone());
    }
    trace!(top = rect.top, left = rect.left, height = rect.height, width = rect.width, "crop");
    let shape = grid.shape();
    let (h, w) = (shape.height as i64, shape.width as i64);
    let zeros = vec![0.0; shape.channels];
    let out = shape.element().with_size(rect.height as usize, rect.width as usize);
    gather_pixels(grid, out, &zeros, |c, y, x| {
        let sy = rect.top + y as i64;
        let sx = rect.left + x as i64;
        if sy < 0 || sx < 0 || sy >= h || sx >= w {
            None
        } else {
            Some((c, sy as usize, sx as usize))
        }
    })
}

/// Crops `size = (height, width)` from the centre.
///
/// An image smaller than `size` is zero-padded first. Offsets round half
/// to even.
pub fn center_crop(grid: &Grid, size: (usize, usize)) -> Result<Grid> {
    let (ch, cw) = (size.0 as i64, size.1 as i64);
    if ch <= 0 || cw <= 0 {
        return Err(Error::InvalidArgument(format!("crop size must be positive, got {ch}x{cw}")));
    }
    let (h, w) = (grid.height() as i64, grid.width() as i64);

    if ch > h || cw > w {
        let dx = (cw - w).max(0);
        let dy = (ch - h).max(0);
        let padding = [dx / 2, dy / 2, (dx + 1) / 2, (dy + 1) / 2];
        let padded = pad(grid, &padding, &Fill::default(), PaddingMode::Constant)?;
        if padded.height() as i64 == ch && padded.width() as i64 == cw {
            return Ok(padded);
        }
        return center_crop(&padded, size);
    }

    let top = ((h - ch) as f64 / 2.0).round_ties_even() as i64;
    let left = ((w - cw) as f64 / 2.0).round_ties_even() as i64;
    crop(grid, Rect::new(top, left, ch, cw))
}

fn check_fits(grid: &Grid, size: (usize, usize)) -> Result<()> {
    if size.0 == 0 || size.1 == 0 || size.0 > grid.height() || size.1 > grid.width() {
        return Err(Error::InvalidArgument(format!(
            "crop size {}x{} does not fit a {}x{} image",
            size.0,
            size.1,
            grid.height(),
            grid.width()
        )));
    }
    Ok(())
}

/// The four corner crops and the centre crop.
///
/// Order: top-left, top-right, bottom-left, bottom-right, centre.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `size` is larger than the image.
pub fn five_crop(grid: &Grid, size: (usize, usize)) -> Result<Vec<Grid>> {
    check_fits(grid, size)?;
    let (ch, cw) = (size.0 as i64, size.1 as i64);
    let (h, w) = (grid.height() as i64, grid.width() as i64);
    Ok(vec![
        crop(grid, Rect::new(0, 0, ch, cw))?,
        crop(grid, Rect::new(0, w - cw, ch, cw))?,
        crop(grid, Rect::new(h - ch, 0, ch, cw))?,
        crop(grid, Rect::new(h - ch, w - cw, ch, cw))?,
        center_crop(grid, size)?,
    ])
}

/// [`five_crop`] of the image followed by [`five_crop`] of its mirror.
///
/// The mirror is horizontal unless `vertical_flip` is set.
pub fn ten_crop(grid: &Grid, size: (usize, usize), vertical_flip: bool) -> Result<Vec<Grid>> {
    let mut crops = five_crop(grid, size)?;
    let mirrored = if vertical_flip { vflip(grid)? } else { hflip(grid)? };
    crops.extend(five_crop(&mirrored, size)?);
    Ok(crops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use visaug_core::{DType, Shape};

    fn numbered(h: usize, w: usize) -> Grid {
        Grid::from_fn(Shape::image(1, h, w), DType::I32, |_, y, x| (y * w + x) as f64).unwrap()
    }

    #[test]
    fn test_crop_out_of_bounds_zero() {
        let grid = numbered(3, 3);
        let out = crop(&grid, Rect::new(-1, 1, 2, 3)).unwrap();
        assert_eq!(out.as_slice::<i32>().unwrap(), &[0, 0, 0, 1, 2, 0]);
    }

    #[test]
    fn test_empty_crop_is_identity() {
        let grid = numbered(3, 3);
        assert_eq!(crop(&grid, Rect::new(0, 0, 0, 2)).unwrap(), grid);
    }

    #[test]
    fn test_center_crop() {
        let grid = numbered(5, 5);
        let out = center_crop(&grid, (3, 3)).unwrap();
        assert_eq!(out.get(0, 0, 0, 0), 6.0);
        // (4 - 1) / 2 = 1.5 rounds to 2
        let out = center_crop(&numbered(4, 4), (1, 1)).unwrap();
        assert_eq!(out.get(0, 0, 0, 0), 10.0);
    }

    #[test]
    fn test_center_crop_pads() {
        let grid = numbered(2, 2);
        let out = center_crop(&grid, (4, 5)).unwrap();
        assert_eq!(out.shape(), Shape::image(1, 4, 5));
        assert_eq!(out.get(0, 0, 1, 1), 0.0);
        assert_eq!(out.get(0, 0, 1, 2), 1.0);
        assert_eq!(out.get(0, 0, 2, 1), 2.0);
        assert_eq!(out.get(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_five_crop_order() {
        let grid = numbered(4, 6);
        let crops = five_crop(&grid, (2, 2)).unwrap();
        assert_eq!(crops.len(), 5);
        let corners: Vec<f64> = crops.iter().map(|c| c.get(0, 0, 0, 0)).collect();
        assert_eq!(corners, vec![0.0, 4.0, 12.0, 16.0, 8.0]);
        assert!(crops.iter().all(|c| c.shape() == Shape::image(1, 2, 2)));
    }

    #[test]
    fn test_ten_crop() {
        let grid = numbered(4, 6);
        let crops = ten_crop(&grid, (2, 2), false).unwrap();
        assert_eq!(crops.len(), 10);
        assert_eq!(crops[5], hflip(&crops[1]).unwrap());
        let crops = ten_crop(&grid, (2, 2), true).unwrap();
        assert_eq!(crops[5], vflip(&crops[2]).unwrap());
    }

    #[test]
    fn test_five_crop_too_large() {
        assert!(matches!(five_crop(&numbered(3, 3), (4, 2)), Err(Error::InvalidArgument(_))));
    }
}
