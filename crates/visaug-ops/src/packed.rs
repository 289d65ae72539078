//! Native operations on interleaved [`PackedImage`] data.
//!
//! These work directly on `HWC` bytes without a planar round trip and
//! produce exactly the same pixels as their grid counterparts.
//!
//! # Operations
//!
//! - [`hflip`] / [`vflip`] - Mirrors
//! - [`crop`] - Window copy, zero outside the image
//! - [`pad`] - Border padding in any [`PaddingMode`]
//! - [`invert`], [`posterize`], [`solarize`] - Per-byte maps
//!
//! # Example
//!
//! ```rust
//! use visaug_core::{PackedImage, PixelMode};
//! use visaug_ops::packed::hflip;
//!
//! let img = PackedImage::new(2, 1, PixelMode::Rgb, vec![255, 0, 0, 0, 255, 0]).unwrap();
//! let flipped = hflip(&img).unwrap();
//! assert_eq!(flipped.pixel(0, 0), &[0, 255, 0]);
//! ```

use tracing::{debug, trace};
use visaug_core::{Error, Fill, PackedImage, Rect, Result};

use crate::geometry::pad_amounts;
use crate::pad::PaddingMode;

/// Mirrors left to right.
pub fn hflip(img: &PackedImage) -> Result<PackedImage> {
    let (w, h, c) = (img.width(), img.height(), img.channels());
    trace!(width = w, height = h, "packed hflip");
    let src = img.as_bytes();
    let mut dst = vec![0u8; src.len()];

    for y in 0..h {
        for x in 0..w {
            let src_idx = (y * w + x) * c;
            let dst_idx = (y * w + (w - 1 - x)) * c;
            dst[dst_idx..dst_idx + c].copy_from_slice(&src[src_idx..src_idx + c]);
        }
    }
    PackedImage::new(w, h, img.mode(), dst)
}

/// Mirrors top to bottom.
pub fn vflip(img: &PackedImage) -> Result<PackedImage> {
    let (w, h) = (img.width(), img.height());
    trace!(width = w, height = h, "packed vflip");
    let row = w * img.channels();
    let src = img.as_bytes();
    let mut dst = vec![0u8; src.len()];

    for y in 0..h {
        let s = y * row;
        let d = (h - 1 - y) * row;
        dst[d..d + row].copy_from_slice(&src[s..s + row]);
    }
    PackedImage::new(w, h, img.mode(), dst)
}

/// Copies the `rect` window; pixels outside the image are zero.
///
/// An empty window returns the input unchanged.
pub fn crop(img: &PackedImage, rect: Rect) -> Result<PackedImage> {
    if rect.is_empty() {
        debug!(%rect, "empty crop window, returning input");
        return Ok(img.clone());
    }
    let (w, h, c) = (img.width(), img.height(), img.channels());
    let (ow, oh) = (rect.width as usize, rect.height as usize);
    let mut dst = vec![0u8; ow * oh * c];

    // Only the overlap is copied; the rest stays zero.
    if let Some(visible) = rect.clip(h, w) {
        let src = img.as_bytes();
        let span = visible.width as usize * c;
        for sy in visible.top..visible.bottom() {
            let dy = (sy - rect.top) as usize;
            let dx = (visible.left - rect.left) as usize;
            let s = (sy as usize * w + visible.left as usize) * c;
            let d = (dy * ow + dx) * c;
            dst[d..d + span].copy_from_slice(&src[s..s + span]);
        }
    }
    PackedImage::new(ow, oh, img.mode(), dst)
}

/// Pads every side, see [`crate::pad::pad`] for the argument rules.
pub fn pad(img: &PackedImage, padding: &[i64], fill: &Fill, mode: PaddingMode) -> Result<PackedImage> {
    let [left, top, right, bottom] = pad_amounts(padding)?;
    let (w, h, c) = (img.width(), img.height(), img.channels());
    let oh = h as i64 + top + bottom;
    let ow = w as i64 + left + right;
    if oh <= 0 || ow <= 0 {
        return Err(Error::InvalidArgument(format!(
            "padding {padding:?} leaves a {oh}x{ow} image"
        )));
    }
    let fill: Vec<u8> = fill
        .resolve(c)?
        .iter()
        .map(|v| v.round_ties_even().clamp(0.0, 255.0) as u8)
        .collect();
    let (oh, ow) = (oh as usize, ow as usize);
    let src = img.as_bytes();
    let mut dst = Vec::with_capacity(oh * ow * c);

    for y in 0..oh {
        let sy = mode.index(y as i64 - top, h);
        for x in 0..ow {
            match (sy, mode.index(x as i64 - left, w)) {
                (Some(sy), Some(sx)) => {
                    let s = (sy * w + sx) * c;
                    dst.extend_from_slice(&src[s..s + c]);
                }
                _ => dst.extend_from_slice(&fill),
            }
        }
    }
    PackedImage::new(ow, oh, img.mode(), dst)
}

fn map_bytes<F: Fn(u8) -> u8>(img: &PackedImage, f: F) -> Result<PackedImage> {
    let data = img.as_bytes().iter().map(|&b| f(b)).collect();
    PackedImage::new(img.width(), img.height(), img.mode(), data)
}

/// `255 - x` for every sample.
pub fn invert(img: &PackedImage) -> Result<PackedImage> {
    map_bytes(img, |b| 255 - b)
}

/// Keeps the `bits` most significant bits of every sample.
///
/// # Errors
///
/// [`Error::InvalidArgument`] unless `1 <= bits <= 8`.
pub fn posterize(img: &PackedImage, bits: u8) -> Result<PackedImage> {
    if !(1..=8).contains(&bits) {
        return Err(Error::InvalidArgument(format!("bits must be in 1..=8, got {bits}")));
    }
    let mask = !((1u16 << (8 - bits)) - 1) as u8;
    map_bytes(img, |b| b & mask)
}

/// Inverts samples at or above `threshold`.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `threshold` exceeds 255.
pub fn solarize(img: &PackedImage, threshold: f64) -> Result<PackedImage> {
    if threshold > 255.0 {
        return Err(Error::InvalidArgument(format!(
            "threshold {threshold} exceeds the uint8 maximum"
        )));
    }
    map_bytes(img, |b| if b as f64 >= threshold { 255 - b } else { b })
}
