//! Tensor-level statistics transforms.

use tracing::trace;
use visaug_core::{Cast, DType, Error, Grid, Result};

use crate::driver::map_images;

fn per_channel(name: &str, values: &[f64], channels: usize) -> Result<Vec<f64>> {
    match values.len() {
        1 => Ok(vec![values[0]; channels]),
        n if n == channels => Ok(values.to_vec()),
        n => Err(Error::ShapeMismatch(format!(
            "{name} has {n} values but the image has {channels} channels"
        ))),
    }
}

/// `(x - mean[c]) / std[c]` per channel.
///
/// # Errors
///
/// - [`Error::TypeMismatch`] for integer input
/// - [`Error::InvalidArgument`] if any `std` is zero
/// - [`Error::ShapeMismatch`] if `mean` or `std` has neither 1 nor `C` values
pub fn normalize(grid: &Grid, mean: &[f64], std: &[f64]) -> Result<Grid> {
    if !grid.dtype().is_float() {
        return Err(Error::TypeMismatch(format!(
            "normalize needs a float grid, got {}",
            grid.dtype()
        )));
    }
    let c = grid.channels();
    let mean = per_channel("mean", mean, c)?;
    let std = per_channel("std", std, c)?;
    if std.iter().any(|s| *s == 0.0) {
        return Err(Error::InvalidArgument(format!(
            "std evaluated to zero after conversion to {}, leading to division by zero",
            grid.dtype()
        )));
    }
    trace!(?mean, ?std, "normalize");

    let plane = grid.shape().plane_len();
    map_images(grid, grid.shape().element(), grid.dtype(), Cast::Truncate, |src, dst| {
        for (k, (d, s)) in dst.iter_mut().zip(src).enumerate() {
            let ch = k / plane;
            *d = (s - mean[ch]) / std[ch];
        }
        Ok(())
    })
}

/// Whitening-style linear map of the flattened image.
///
/// Each image is flattened to `n = C * H * W` values, `mean` is subtracted
/// and the row vector is multiplied by the `n x n` `matrix`. Integer input
/// produces an `f32` result.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] if the matrix is not square, its side differs
/// from `n`, or `mean` does not hold `n` values.
pub fn linear_transformation(grid: &Grid, matrix: &[Vec<f64>], mean: &[f64]) -> Result<Grid> {
    let side = matrix.len();
    if matrix.iter().any(|row| row.len() != side) {
        return Err(Error::ShapeMismatch(format!(
            "transformation matrix must be square, got {side} rows of unequal length"
        )));
    }
    if mean.len() != side {
        return Err(Error::ShapeMismatch(format!(
            "mean vector has {} values but the matrix side is {side}",
            mean.len()
        )));
    }
    let n = grid.shape().image_len();
    if n != side {
        return Err(Error::ShapeMismatch(format!(
            "image of {} flattens to {n} values but the matrix side is {side}",
            grid.shape().element()
        )));
    }
    trace!(side, "linear_transformation");

    let dtype = if grid.dtype().is_float() { grid.dtype() } else { DType::F32 };
    map_images(grid, grid.shape().element(), dtype, Cast::Truncate, |src, dst| {
        let centred: Vec<f64> = src.iter().zip(mean).map(|(s, m)| s - m).collect();
        for (j, d) in dst.iter_mut().enumerate() {
            *d = centred.iter().zip(matrix).map(|(v, row)| v * row[j]).sum();
        }
        Ok(())
    })
}
