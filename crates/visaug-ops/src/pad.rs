//! Border padding.
//!
//! # Modes
//!
//! For a row `[a b c d]` padded by 2 on each side:
//!
//! ```text
//! constant   f f | a b c d | f f
//! edge       a a | a b c d | d d
//! reflect    c b | a b c d | c b
//! symmetric  b a | a b c d | d c
//! ```
//!
//! Negative amounts crop that side instead.

use serde::{Deserialize, Serialize};
use tracing::trace;
use visaug_core::{Error, Fill, Grid, Result};

use crate::driver::gather_pixels;
use crate::geometry::pad_amounts;

/// How pixels beyond the border are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    /// Constant fill value.
    #[default]
    Constant,
    /// Repeat the border pixel.
    Edge,
    /// Mirror without repeating the border pixel.
    Reflect,
    /// Mirror including the border pixel.
    Symmetric,
}

impl PaddingMode {
    /// Maps a possibly out-of-range index into `0..n`.
    ///
    /// Returns `None` for [`PaddingMode::Constant`] when `i` is outside.
    #[inline]
    pub fn index(self, i: i64, n: usize) -> Option<usize> {
        let n = n as i64;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        let j = match self {
            Self::Constant => return None,
            Self::Edge => i.clamp(0, n - 1),
            Self::Reflect => {
                if n == 1 {
                    0
                } else {
                    let period = 2 * (n - 1);
                    let m = i.rem_euclid(period);
                    if m < n { m } else { period - m }
                }
            }
            Self::Symmetric => {
                let period = 2 * n;
                let m = i.rem_euclid(period);
                if m < n { m } else { period - 1 - m }
            }
        };
        Some(j as usize)
    }
}

impl std::fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Constant => "constant",
            Self::Edge => "edge",
            Self::Reflect => "reflect",
            Self::Symmetric => "symmetric",
        };
        f.write_str(name)
    }
}

/// Pads (or crops, for negative amounts) every side of an image.
///
/// # Arguments
///
/// * `padding` - 1, 2 or 4 amounts, see [`pad_amounts`]
/// * `fill` - constant for [`PaddingMode::Constant`], ignored otherwise
/// * `mode` - border policy
///
/// # Errors
///
/// - [`Error::InvalidArgument`] for a bad `padding` length or a non-positive result size
/// - [`Error::ShapeMismatch`] if `fill` does not match the channel count
pub fn pad(grid: &Grid, padding: &[i64], fill: &Fill, mode: PaddingMode) -> Result<Grid> {
    let [left, top, right, bottom] = pad_amounts(padding)?;
    let shape = grid.shape();
    let oh = shape.height as i64 + top + bottom;
    let ow = shape.width as i64 + left + right;
    if oh <= 0 || ow <= 0 {
        return Err(Error::InvalidArgument(format!(
            "padding {padding:?} leaves a {oh}x{ow} image"
        )));
    }
    let fill = fill.resolve(shape.channels)?;
    trace!(left, top, right, bottom, mode = %mode, "pad");

    let (h, w) = (shape.height, shape.width);
    let out = shape.element().with_size(oh as usize, ow as usize);
    gather_pixels(grid, out, &fill, |c, y, x| {
        let sy = mode.index(y as i64 - top, h)?;
        let sx = mode.index(x as i64 - left, w)?;
        Some((c, sy, sx))
    })
}
