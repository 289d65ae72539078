//! Image resizing with half-pixel (align-corners-off) sampling.
//!
//! # Sizing
//!
//! [`output_size`] turns a size request into a concrete `(height, width)`:
//!
//! - one value: the shorter edge becomes that value, the longer edge keeps
//!   the aspect ratio (truncated), optionally capped by `max_size`
//! - two values: exact `(height, width)`
//!
//! # Example
//!
//! ```rust
//! use visaug_ops::resize::output_size;
//!
//! assert_eq!(output_size(32, 46, &[32], None).unwrap(), (32, 46));
//! assert_eq!(output_size(64, 92, &[32], None).unwrap(), (32, 46));
//! assert_eq!(output_size(10, 40, &[20], Some(50)).unwrap(), (12, 50));
//! ```

use tracing::trace;
use visaug_core::{Error, Grid, Rect, Result};

use crate::crop::crop;
use crate::driver::{gather_pixels, map_images, rounding};
use crate::resample::{cubic_weights, Interpolation};

/// Resolves a size request against an `h x w` image.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when:
/// - `size` is empty, longer than 2 or holds a zero
/// - `max_size` is combined with a two-value `size`
/// - `max_size` is not larger than the requested shorter edge
pub fn output_size(h: usize, w: usize, size: &[usize], max_size: Option<usize>) -> Result<(usize, usize)> {
    if size.is_empty() || size.len() > 2 || size.contains(&0) {
        return Err(Error::InvalidArgument(format!(
            "size must hold 1 or 2 positive values, got {size:?}"
        )));
    }
    if let [oh, ow] = *size {
        if max_size.is_some() {
            return Err(Error::InvalidArgument(
                "max_size is only supported with a single size value".into(),
            ));
        }
        return Ok((oh, ow));
    }

    let requested = size[0];
    let (short, long) = if w <= h { (w, h) } else { (h, w) };
    let mut new_short = requested;
    let mut new_long = (requested as f64 * long as f64 / short as f64) as usize;

    if let Some(max_size) = max_size {
        if max_size <= requested {
            return Err(Error::InvalidArgument(format!(
                "max_size = {max_size} must be strictly greater than the requested size {requested}"
            )));
        }
        if new_long > max_size {
            new_short = (max_size as f64 * new_short as f64 / new_long as f64) as usize;
            new_long = max_size;
        }
    }

    let (new_h, new_w) = if w <= h { (new_long, new_short) } else { (new_short, new_long) };
    Ok((new_h.max(1), new_w.max(1)))
}

/// Source taps and weights of one output index along one axis.
struct Taps {
    index: Vec<usize>,
    weight: Vec<f64>,
    per_output: usize,
}

fn axis_taps(input: usize, output: usize, mode: Interpolation) -> Taps {
    let scale = input as f64 / output as f64;
    let last = input as i64 - 1;
    let per_output = if mode == Interpolation::Bicubic { 4 } else { 2 };
    let mut index = Vec::with_capacity(output * per_output);
    let mut weight = Vec::with_capacity(output * per_output);

    for dst in 0..output {
        if mode == Interpolation::Bicubic {
            let src = (dst as f64 + 0.5) * scale - 0.5;
            let x0 = src.floor();
            for (k, wk) in cubic_weights(src - x0).iter().enumerate() {
                index.push((x0 as i64 - 1 + k as i64).clamp(0, last) as usize);
                weight.push(*wk);
            }
        } else {
            let src = ((dst as f64 + 0.5) * scale - 0.5).max(0.0);
            let x0 = (src.floor() as i64).min(last);
            let x1 = (x0 + 1).min(last);
            let l = src - x0 as f64;
            index.extend([x0 as usize, x1 as usize]);
            weight.extend([1.0 - l, l]);
        }
    }
    Taps { index, weight, per_output }
}

/// Resizes every image to the size resolved by [`output_size`].
///
/// # Arguments
///
/// * `size` - one or two values, see [`output_size`]
/// * `mode` - interpolation kernel
/// * `max_size` - optional cap for the longer edge
///
/// Nearest sampling reads `floor(dst * in / out)` and copies exactly.
/// Bilinear and bicubic results are rounded half to even for integer dtypes.
pub fn resize(grid: &Grid, size: &[usize], mode: Interpolation, max_size: Option<usize>) -> Result<Grid> {
    let shape = grid.shape();
    let (h, w) = (shape.height, shape.width);
    let (oh, ow) = output_size(h, w, size, max_size)?;
    trace!(width = w, height = h, out_width = ow, out_height = oh, mode = %mode, "resize");
    if (oh, ow) == (h, w) {
        return Ok(grid.clone());
    }

    let out = shape.element().with_size(oh, ow);
    if mode == Interpolation::Nearest {
        let sx = w as f32 / ow as f32;
        let sy = h as f32 / oh as f32;
        return gather_pixels(grid, out, &[], |c, y, x| {
            let iy = ((y as f32 * sy).floor() as usize).min(h - 1);
            let ix = ((x as f32 * sx).floor() as usize).min(w - 1);
            Some((c, iy, ix))
        });
    }

    let tx = axis_taps(w, ow, mode);
    let ty = axis_taps(h, oh, mode);
    let dtype = grid.dtype();
    map_images(grid, out, dtype, rounding(dtype), |src, dst| {
        let mut rows = vec![0.0; h * ow];
        for c in 0..shape.channels {
            let plane = &src[c * h * w..(c + 1) * h * w];
            for y in 0..h {
                let line = &plane[y * w..(y + 1) * w];
                for x in 0..ow {
                    let base = x * tx.per_output;
                    rows[y * ow + x] = (base..base + tx.per_output)
                        .map(|k| line[tx.index[k]] * tx.weight[k])
                        .sum();
                }
            }
            let out_plane = &mut dst[c * oh * ow..(c + 1) * oh * ow];
            for y in 0..oh {
                let base = y * ty.per_output;
                for x in 0..ow {
                    out_plane[y * ow + x] = (base..base + ty.per_output)
                        .map(|k| rows[ty.index[k] * ow + x] * ty.weight[k])
                        .sum();
                }
            }
        }
        Ok(())
    })
}

/// Crops `rect` and resizes the result to exactly `size = (height, width)`.
pub fn resized_crop(grid: &Grid, rect: Rect, size: (usize, usize), mode: Interpolation) -> Result<Grid> {
    let cropped = crop(grid, rect)?;
    resize(&cropped, &[size.0, size.1], mode, None)
}
