//! Photometric operations.
//!
//! Most adjustments are blends between the input and a *degenerate* image:
//!
//! ```text
//! out = clamp(factor * input + (1 - factor) * degenerate, 0, max)
//! ```
//!
//! | operation  | degenerate image |
//! |------------|------------------|
//! | brightness | zeros |
//! | contrast   | mean of the grayscale image |
//! | saturation | grayscale image |
//! | sharpness  | 3x3 smoothed image |
//!
//! `factor = 0` yields the degenerate image, `1` the input, and larger values
//! extrapolate. Integer results are truncated.
//!
//! # Channels
//!
//! Colour operations accept 1, 3 or 4 channels. The fourth channel is alpha
//! and passes through untouched.

use tracing::{debug, trace};
use visaug_core::{convert_dtype, Cast, DType, Error, Grid, Result};

use crate::driver::{map_images, map_samples};

/// ITU-R 601 luma weights.
pub const LUMA: [f64; 3] = [0.2989, 0.587, 0.114];

/// Number of colour channels, excluding alpha.
fn color_channels(grid: &Grid) -> Result<usize> {
    match grid.channels() {
        1 => Ok(1),
        3 | 4 => Ok(3),
        n => Err(Error::ShapeMismatch(format!(
            "colour operations need 1, 3 or 4 channels, got {n}"
        ))),
    }
}

fn check_factor(name: &str, factor: f64) -> Result<()> {
    if !(factor >= 0.0) || !factor.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "{name} factor must be a non-negative number, got {factor}"
        )));
    }
    Ok(())
}

/// Narrows a value the way a cast to `dtype` would, keeping it as `f64`.
#[inline]
fn store(v: f64, dtype: DType) -> f64 {
    if dtype.is_float() { v } else { v.trunc() }
}

/// Grayscale plane of one RGB image in `src`, truncated for integer dtypes.
fn luma_plane(src: &[f64], plane: usize, dtype: DType) -> Vec<f64> {
    (0..plane)
        .map(|i| {
            let v = LUMA[0] * src[i] + LUMA[1] * src[plane + i] + LUMA[2] * src[2 * plane + i];
            store(v, dtype)
        })
        .collect()
}

/// `clamp(ratio * a + (1 - ratio) * b, 0, bound)` on the colour planes.
///
/// `degenerate(src)` builds `b` for one image: `cc * H * W` values.
fn blend<D>(grid: &Grid, ratio: f64, degenerate: D) -> Result<Grid>
where
    D: Fn(&[f64]) -> Vec<f64> + Sync,
{
    let cc = color_channels(grid)?;
    let dtype = grid.dtype();
    let bound = dtype.max_value();
    map_images(grid, grid.shape().element(), dtype, Cast::Truncate, |src, dst| {
        dst.copy_from_slice(src);
        let other = degenerate(src);
        for (k, b) in other.iter().enumerate() {
            dst[k] = (ratio * src[k] + (1.0 - ratio) * b).clamp(0.0, bound);
        }
        Ok(())
    })
}

/// Converts to grayscale with `num_output_channels` of 1 or 3.
///
/// Single-channel input is returned as is (or replicated to 3 channels).
/// An alpha channel is dropped.
pub fn rgb_to_grayscale(grid: &Grid, num_output_channels: usize) -> Result<Grid> {
    if num_output_channels != 1 && num_output_channels != 3 {
        return Err(Error::InvalidArgument(format!(
            "num_output_channels must be 1 or 3, got {num_output_channels}"
        )));
    }
    let cc = color_channels(grid)?;
    trace!(channels = grid.channels(), num_output_channels, "rgb_to_grayscale");
    if cc == 1 && num_output_channels == 1 {
        return Ok(grid.clone());
    }

    let dtype = grid.dtype();
    let plane = grid.shape().plane_len();
    let out = grid.shape().element().with_channels(num_output_channels);
    map_images(grid, out, dtype, Cast::Truncate, |src, dst| {
        let gray = if cc == 1 { src[..plane].to_vec() } else { luma_plane(src, plane, dtype) };
        for chunk in dst.chunks_mut(plane) {
            chunk.copy_from_slice(&gray);
        }
        Ok(())
    })
}

/// Scales intensities by `factor`.
pub fn adjust_brightness(grid: &Grid, factor: f64) -> Result<Grid> {
    check_factor("brightness", factor)?;
    let len = color_channels(grid)? * grid.shape().plane_len();
    trace!(factor, "adjust_brightness");
    blend(grid, factor, |_| vec![0.0; len])
}

/// Blends towards the mean grey level.
pub fn adjust_contrast(grid: &Grid, factor: f64) -> Result<Grid> {
    check_factor("contrast", factor)?;
    let cc = color_channels(grid)?;
    let dtype = grid.dtype();
    let plane = grid.shape().plane_len();
    trace!(factor, "adjust_contrast");
    blend(grid, factor, |src| {
        let mean = if cc == 1 {
            src[..plane].iter().sum::<f64>() / plane as f64
        } else {
            luma_plane(src, plane, dtype).iter().sum::<f64>() / plane as f64
        };
        vec![mean; cc * plane]
    })
}

/// Blends towards the grayscale image. No-op for one channel.
pub fn adjust_saturation(grid: &Grid, factor: f64) -> Result<Grid> {
    check_factor("saturation", factor)?;
    if color_channels(grid)? == 1 {
        debug!("saturation on a single-channel image, returning input");
        return Ok(grid.clone());
    }
    let dtype = grid.dtype();
    let plane = grid.shape().plane_len();
    trace!(factor, "adjust_saturation");
    blend(grid, factor, |src| luma_plane(src, plane, dtype).repeat(3))
}

/// Blends towards a 3x3 smoothed copy; images of 2 or fewer rows or
/// columns are returned unchanged.
pub fn adjust_sharpness(grid: &Grid, factor: f64) -> Result<Grid> {
    check_factor("sharpness", factor)?;
    let cc = color_channels(grid)?;
    let (h, w) = (grid.height(), grid.width());
    if h <= 2 || w <= 2 {
        return Ok(grid.clone());
    }
    let dtype = grid.dtype();
    trace!(factor, width = w, height = h, "adjust_sharpness");
    blend(grid, factor, |src| {
        let mut out = src[..cc * h * w].to_vec();
        for c in 0..cc {
            let p = &src[c * h * w..(c + 1) * h * w];
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    // 3x3 ones with a centre weight of 5, normalized by 13
                    let mut acc = 4.0 * p[y * w + x];
                    for row in p[(y - 1) * w..(y + 2) * w].chunks_exact(w) {
                        acc += row[x - 1] + row[x] + row[x + 1];
                    }
                    let smoothed = acc / 13.0;
                    out[c * h * w + y * w + x] =
                        if dtype.is_float() { smoothed } else { smoothed.round_ties_even() };
                }
            }
        }
        out
    })
}

/// Rotates hue by `factor` turns.
///
/// Integer images are converted to `f32` for the HSV round trip and back.
///
/// # Errors
///
/// [`Error::InvalidArgument`] unless `-0.5 <= factor <= 0.5`.
pub fn adjust_hue(grid: &Grid, factor: f64) -> Result<Grid> {
    if !(-0.5..=0.5).contains(&factor) {
        return Err(Error::InvalidArgument(format!(
            "hue factor must be in [-0.5, 0.5], got {factor}"
        )));
    }
    if color_channels(grid)? == 1 {
        debug!("hue on a single-channel image, returning input");
        return Ok(grid.clone());
    }
    trace!(factor, "adjust_hue");

    let orig = grid.dtype();
    let float = if orig.is_float() { grid.clone() } else { convert_dtype(grid, DType::F32)? };
    let plane = grid.shape().plane_len();
    let shifted = map_images(&float, float.shape().element(), float.dtype(), Cast::Truncate, |src, dst| {
        dst.copy_from_slice(src);
        for i in 0..plane {
            let (h, s, v) = rgb_to_hsv(src[i], src[plane + i], src[2 * plane + i]);
            let (r, g, b) = hsv_to_rgb((h + factor).rem_euclid(1.0), s, v);
            dst[i] = r;
            dst[plane + i] = g;
            dst[2 * plane + i] = b;
        }
        Ok(())
    })?;
    if orig.is_float() { Ok(shifted) } else { convert_dtype(&shifted, orig) }
}

/// RGB in `[0, 1]` to `(hue, saturation, value)`, all in `[0, 1]`.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let eqc = maxc == minc;
    let cr = maxc - minc;
    let s = cr / if eqc { 1.0 } else { maxc };
    let div = if eqc { 1.0 } else { cr };
    let rc = (maxc - r) / div;
    let gc = (maxc - g) / div;
    let bc = (maxc - b) / div;

    let h = if maxc == r {
        bc - gc
    } else if maxc == g {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((h / 6.0 + 1.0) % 1.0, s, maxc)
}

/// Inverse of [`rgb_to_hsv`].
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = (v * (1.0 - s)).clamp(0.0, 1.0);
    let q = (v * (1.0 - s * f)).clamp(0.0, 1.0);
    let t = (v * (1.0 - s * (1.0 - f))).clamp(0.0, 1.0);
    match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Stretches each colour channel to the full range.
///
/// Channels with a single value are left as they are.
pub fn autocontrast(grid: &Grid) -> Result<Grid> {
    let cc = color_channels(grid)?;
    let dtype = grid.dtype();
    let bound = dtype.max_value();
    let plane = grid.shape().plane_len();
    trace!(channels = cc, "autocontrast");
    map_images(grid, grid.shape().element(), dtype, Cast::Truncate, |src, dst| {
        dst.copy_from_slice(src);
        for c in 0..cc {
            let values = &src[c * plane..(c + 1) * plane];
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if hi <= lo {
                continue;
            }
            let range = hi - lo;
            for (d, s) in dst[c * plane..(c + 1) * plane].iter_mut().zip(values) {
                *d = ((s - lo) * bound / range).clamp(0.0, bound);
            }
        }
        Ok(())
    })
}

/// Histogram equalization of each colour channel.
///
/// # Errors
///
/// [`Error::TypeMismatch`] for anything but `u8` data.
pub fn equalize(grid: &Grid) -> Result<Grid> {
    let cc = color_channels(grid)?;
    let Some(data) = grid.as_slice::<u8>() else {
        return Err(Error::TypeMismatch(format!("equalize needs uint8 input, got {}", grid.dtype())));
    };
    let shape = grid.shape();
    let plane = shape.plane_len();
    trace!(channels = cc, "equalize");

    let mut out = data.to_vec();
    for b in 0..shape.num_images() {
        for c in 0..cc {
            let start = (b * shape.channels + c) * plane;
            equalize_plane(&mut out[start..start + plane]);
        }
    }
    Grid::from_vec(shape, out)
}

fn equalize_plane(values: &mut [u8]) {
    let mut hist = [0u64; 256];
    for &v in values.iter() {
        hist[v as usize] += 1;
    }
    let nonzero: Vec<u64> = hist.iter().copied().filter(|&n| n != 0).collect();
    let step = nonzero[..nonzero.len().saturating_sub(1)].iter().sum::<u64>() / 255;
    if step == 0 {
        return;
    }

    let mut lut = [0u8; 256];
    let mut cum = 0u64;
    for (i, entry) in lut.iter_mut().enumerate() {
        if i > 0 {
            *entry = ((cum + step / 2) / step).min(255) as u8;
        }
        cum += hist[i];
    }
    for v in values.iter_mut() {
        *v = lut[*v as usize];
    }
}

/// `max - x` for every sample.
pub fn invert(grid: &Grid) -> Result<Grid> {
    let bound = grid.dtype().max_value();
    map_samples(grid, Cast::Truncate, |v| bound - v)
}

/// Keeps the `bits` most significant bits.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] unless `1 <= bits <= 8`
/// - [`Error::TypeMismatch`] for anything but `u8` data
pub fn posterize(grid: &Grid, bits: u8) -> Result<Grid> {
    if !(1..=8).contains(&bits) {
        return Err(Error::InvalidArgument(format!("bits must be in 1..=8, got {bits}")));
    }
    let Some(data) = grid.as_slice::<u8>() else {
        return Err(Error::TypeMismatch(format!("posterize needs uint8 input, got {}", grid.dtype())));
    };
    let mask = !((1u16 << (8 - bits)) - 1) as u8;
    Grid::from_vec(grid.shape(), data.iter().map(|&v| v & mask).collect())
}

/// Inverts samples at or above `threshold`.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `threshold` exceeds the dtype maximum.
pub fn solarize(grid: &Grid, threshold: f64) -> Result<Grid> {
    let bound = grid.dtype().max_value();
    if threshold > bound {
        return Err(Error::InvalidArgument(format!(
            "threshold {threshold} exceeds the {} maximum {bound}",
            grid.dtype()
        )));
    }
    map_samples(grid, Cast::Truncate, |v| if v >= threshold { bound - v } else { v })
}
