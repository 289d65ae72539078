//! Per-image execution over single images and batches.
//!
//! Every grid operation in this crate is written against one `(C, H, W)`
//! image widened to `f64`. [`map_images`] runs such a kernel over each
//! element of a batch and narrows the result back to the requested dtype.
//!
//! When the `parallel` feature is enabled, batch elements are processed on
//! the rayon thread pool. Results never depend on the thread count.

use visaug_core::{Cast, DType, Grid, Result, Shape};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `kernel` on every image of `grid`.
///
/// `kernel(src, dst)` receives one input image (`C * H * W` samples) and
/// fills one output image of `out` element shape. The batch dimension of
/// `grid` is carried over to the result.
#[cfg(feature = "parallel")]
pub fn map_images<F>(grid: &Grid, out: Shape, dtype: DType, cast: Cast, kernel: F) -> Result<Grid>
where
    F: Fn(&[f64], &mut [f64]) -> Result<()> + Sync,
{
    let src = grid.to_f64_vec();
    let in_len = grid.shape().image_len();
    let shape = Shape { batch: grid.shape().batch, ..out };
    let mut dst = vec![0.0f64; shape.len()];

    dst.par_chunks_mut(out.image_len())
        .zip(src.par_chunks(in_len))
        .try_for_each(|(d, s)| kernel(s, d))?;

    Grid::from_f64(shape, dtype, &dst, cast)
}

/// Runs `kernel` on every image of `grid` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub fn map_images<F>(grid: &Grid, out: Shape, dtype: DType, cast: Cast, kernel: F) -> Result<Grid>
where
    F: Fn(&[f64], &mut [f64]) -> Result<()>,
{
    let src = grid.to_f64_vec();
    let in_len = grid.shape().image_len();
    let shape = Shape { batch: grid.shape().batch, ..out };
    let mut dst = vec![0.0f64; shape.len()];

    for (d, s) in dst.chunks_mut(out.image_len()).zip(src.chunks(in_len)) {
        kernel(s, d)?;
    }

    Grid::from_f64(shape, dtype, &dst, cast)
}

/// Applies `f` to every sample, keeping shape and dtype.
pub fn map_samples<F>(grid: &Grid, cast: Cast, f: F) -> Result<Grid>
where
    F: Fn(f64) -> f64 + Sync,
{
    let elem = grid.shape().element();
    map_images(grid, elem, grid.dtype(), cast, |src, dst| {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = f(s);
        }
        Ok(())
    })
}

/// Index map for a pure re-arrangement of pixels.
///
/// `source(c, y, x)` returns the input `(c, y, x)` feeding output pixel
/// `(c, y, x)`, or `None` to take the fill value of channel `c`. The copy
/// goes through [`Grid::gather`] and is exact for every dtype.
pub fn gather_pixels<F>(grid: &Grid, out: Shape, fill: &[f64], source: F) -> Result<Grid>
where
    F: Fn(usize, usize, usize) -> Option<(usize, usize, usize)>,
{
    let in_shape = grid.shape();
    let shape = Shape { batch: in_shape.batch, ..out };
    let mut index = Vec::with_capacity(shape.len());
    let mut fills = Vec::with_capacity(shape.num_images() * shape.channels);

    for b in 0..shape.num_images() {
        let base = b * in_shape.image_len();
        for c in 0..shape.channels {
            fills.push(fill.get(c).copied().unwrap_or(0.0));
            for y in 0..shape.height {
                for x in 0..shape.width {
                    index.push(source(c, y, x).map(|(sc, sy, sx)| {
                        base + (sc * in_shape.height + sy) * in_shape.width + sx
                    }));
                }
            }
        }
    }

    grid.gather(shape, &index, &fills)
}

/// Rounding rule for results written back to `dtype`.
///
/// Interpolated and filtered values are rounded for integer outputs, while
/// blends truncate; float outputs ignore the mode.
#[inline]
pub fn rounding(dtype: DType) -> Cast {
    if dtype.is_float() { Cast::Truncate } else { Cast::Round }
}
