//! Inverse-mapped grid sampling.
//!
//! [`sample`] fills every output pixel by mapping it through an
//! [`AffineMatrix`] into the input and reading the input at that point with
//! one of the [`Interpolation`] kernels.
//!
//! # Interpolation
//!
//! - [`Interpolation::Nearest`] - Nearest pixel, ties to even; exact copy for every dtype
//! - [`Interpolation::Bilinear`] - 2x2 neighbourhood
//! - [`Interpolation::Bicubic`] - 4x4 cubic convolution, `a = -0.5`
//!
//! Source points outside `[-0.5, dim - 0.5)` on either axis take the fill
//! value. Neighbour taps that fall outside the image also read the fill
//! value, so edges blend towards it.

use serde::{Deserialize, Serialize};
use tracing::trace;
use visaug_core::{DType, Error, Fill, Grid, Result};

use crate::driver::{gather_pixels, map_images, rounding};
use crate::geometry::AffineMatrix;

/// Cubic convolution coefficient.
pub const CUBIC_A: f64 = -0.5;

/// Sampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    #[default]
    Bilinear,
    /// Bicubic.
    Bicubic,
}

impl Interpolation {
    /// Lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cubic convolution weights for the 4 taps around a fractional offset `t`.
#[inline]
pub fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let near = |x: f64| ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0;
    let far = |x: f64| ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a;
    [far(t + 1.0), near(t), near(1.0 - t), far(2.0 - t)]
}

#[inline]
fn inside(v: f64, dim: usize) -> bool {
    v >= -0.5 && v < dim as f64 - 0.5
}

/// Samples `grid` through `matrix` into an `out_size` canvas.
///
/// # Arguments
///
/// * `grid` - input image or batch
/// * `matrix` - output pixel to input pixel map
/// * `out_size` - output `(height, width)`
/// * `mode` - interpolation kernel
/// * `fill` - value for samples outside the input
///
/// # Errors
///
/// [`Error::ShapeMismatch`] if `fill` does not match the channel count,
/// [`Error::InvalidArgument`] for an empty output size.
pub fn sample(
    grid: &Grid,
    matrix: &AffineMatrix,
    out_size: (usize, usize),
    mode: Interpolation,
    fill: &Fill,
) -> Result<Grid> {
    let (oh, ow) = out_size;
    if oh == 0 || ow == 0 {
        return Err(Error::InvalidArgument(format!("cannot sample into a {oh}x{ow} canvas")));
    }
    let shape = grid.shape();
    let fill = fill.resolve(shape.channels)?;
    trace!(
        width = shape.width,
        height = shape.height,
        out_width = ow,
        out_height = oh,
        mode = %mode,
        "sample"
    );

    // Precompute source coordinates once; they are shared by every channel and batch element.
    let coords: Vec<(f64, f64)> = (0..oh)
        .flat_map(|i| (0..ow).map(move |j| (i, j)))
        .map(|(i, j)| matrix.apply(j as f64, i as f64))
        .collect();

    let out = shape.element().with_size(oh, ow);
    let (h, w) = (shape.height, shape.width);

    match mode {
        Interpolation::Nearest => gather_pixels(grid, out, &fill, |c, y, x| {
            let (sx, sy) = coords[y * ow + x];
            if !inside(sx, w) || !inside(sy, h) {
                return None;
            }
            let ix = (sx.round_ties_even().max(0.0) as usize).min(w - 1);
            let iy = (sy.round_ties_even().max(0.0) as usize).min(h - 1);
            Some((c, iy, ix))
        }),
        Interpolation::Bilinear | Interpolation::Bicubic => {
            let dtype = grid.dtype();
            let (lo, hi) = value_range(dtype);
            map_images(grid, out, dtype, rounding(dtype), |src, dst| {
                for c in 0..shape.channels {
                    let plane = &src[c * h * w..(c + 1) * h * w];
                    let fv = fill[c];
                    let read = |y: i64, x: i64| -> f64 {
                        if y < 0 || x < 0 || y >= h as i64 || x >= w as i64 {
                            fv
                        } else {
                            plane[y as usize * w + x as usize]
                        }
                    };
                    for (k, &(sx, sy)) in coords.iter().enumerate() {
                        let d = &mut dst[c * oh * ow + k];
                        if !inside(sx, w) || !inside(sy, h) {
                            *d = fv;
                            continue;
                        }
                        let x0 = sx.floor();
                        let y0 = sy.floor();
                        let (tx, ty) = (sx - x0, sy - y0);
                        let (x0, y0) = (x0 as i64, y0 as i64);
                        *d = match mode {
                            Interpolation::Bilinear => {
                                let top = read(y0, x0) * (1.0 - tx) + read(y0, x0 + 1) * tx;
                                let bottom = read(y0 + 1, x0) * (1.0 - tx) + read(y0 + 1, x0 + 1) * tx;
                                top * (1.0 - ty) + bottom * ty
                            }
                            _ => {
                                let wx = cubic_weights(tx);
                                let wy = cubic_weights(ty);
                                let mut acc = 0.0;
                                for (m, wyv) in wy.iter().enumerate() {
                                    let row: f64 = wx
                                        .iter()
                                        .enumerate()
                                        .map(|(n, wxv)| wxv * read(y0 - 1 + m as i64, x0 - 1 + n as i64))
                                        .sum();
                                    acc += wyv * row;
                                }
                                acc.clamp(lo, hi)
                            }
                        };
                    }
                }
                Ok(())
            })
        }
    }
}

/// Range a cubic result is clamped to: the integer bounds, unbounded for floats.
fn value_range(dtype: DType) -> (f64, f64) {
    match dtype.int_max() {
        None => (f64::NEG_INFINITY, f64::INFINITY),
        Some(max) if dtype == DType::U8 => (0.0, max as f64),
        Some(max) => (-(max as f64) - 1.0, max as f64),
    }
}
