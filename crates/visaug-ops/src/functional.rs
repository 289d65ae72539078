//! Functional entry points over the unified [`Image`] type.
//!
//! Every function returns the encoding it was given. Pixel-exact operations
//! on packed images (flips, crop, pad, invert, posterize, solarize) run
//! natively on the interleaved bytes; everything else goes through a planar
//! `u8` grid and back.
//!
//! # Example
//!
//! ```rust
//! use visaug_core::{Image, PackedImage, PixelMode};
//! use visaug_ops::functional as F;
//!
//! let img = Image::from(PackedImage::filled(8, 6, PixelMode::Rgb, &[10, 20, 30]).unwrap());
//! let out = F::adjust_brightness(&F::hflip(&img).unwrap(), 2.0).unwrap();
//! assert!(out.is_packed());
//! assert_eq!(out.as_packed().unwrap().pixel(0, 0), &[20, 40, 60]);
//! ```

use visaug_core::{Fill, Grid, Image, PackedImage, Rect, Result};

use crate::geometry::{self, AffineParams};
use crate::pad::PaddingMode;
use crate::resample::Interpolation;
use crate::{color, crop as crops, erase as eraser, filter, flip, normalize as norm, packed, pad as padding, resize as resizing, warp};

/// Runs a grid operation, keeping the input encoding.
pub fn via_grid<F>(img: &Image, op: F) -> Result<Image>
where
    F: FnOnce(&Grid) -> Result<Grid>,
{
    match img {
        Image::Grid(g) => Ok(Image::Grid(op(g)?)),
        Image::Packed(p) => Ok(Image::Packed(PackedImage::from_grid(&op(&p.to_grid())?)?)),
    }
}

/// Runs the native packed variant or the grid variant of an operation.
fn dispatch<P, G>(img: &Image, on_packed: P, on_grid: G) -> Result<Image>
where
    P: FnOnce(&PackedImage) -> Result<PackedImage>,
    G: FnOnce(&Grid) -> Result<Grid>,
{
    match img {
        Image::Packed(p) => Ok(Image::Packed(on_packed(p)?)),
        Image::Grid(g) => Ok(Image::Grid(on_grid(g)?)),
    }
}

/// Mirrors left to right.
pub fn hflip(img: &Image) -> Result<Image> {
    dispatch(img, packed::hflip, flip::hflip)
}

/// Mirrors top to bottom.
pub fn vflip(img: &Image) -> Result<Image> {
    dispatch(img, packed::vflip, flip::vflip)
}

/// Crops `height x width` at `(top, left)`; pixels outside the image are zero.
pub fn crop(img: &Image, top: i64, left: i64, height: i64, width: i64) -> Result<Image> {
    let rect = geometry::crop_rect((img.height(), img.width()), top, left, height, width);
    dispatch(img, |p| packed::crop(p, rect), |g| crops::crop(g, rect))
}

/// Centre crop, zero-padding images smaller than `size`.
pub fn center_crop(img: &Image, size: (usize, usize)) -> Result<Image> {
    via_grid(img, |g| crops::center_crop(g, size))
}

/// Pads with 1, 2 or 4 amounts.
pub fn pad(img: &Image, amounts: &[i64], fill: &Fill, mode: PaddingMode) -> Result<Image> {
    dispatch(img, |p| packed::pad(p, amounts, fill, mode), |g| padding::pad(g, amounts, fill, mode))
}

/// Corner and centre crops.
pub fn five_crop(img: &Image, size: (usize, usize)) -> Result<Vec<Image>> {
    crops::five_crop(&img.to_grid(), size)?.into_iter().map(|g| img.rewrap(g)).collect()
}

/// Five crops of the image and five of its mirror.
pub fn ten_crop(img: &Image, size: (usize, usize), vertical_flip: bool) -> Result<Vec<Image>> {
    crops::ten_crop(&img.to_grid(), size, vertical_flip)?.into_iter().map(|g| img.rewrap(g)).collect()
}

/// Resizes, see [`resizing::output_size`] for the `size` rules.
pub fn resize(img: &Image, size: &[usize], interpolation: Interpolation, max_size: Option<usize>) -> Result<Image> {
    via_grid(img, |g| resizing::resize(g, size, interpolation, max_size))
}

/// Crop followed by an exact resize.
pub fn resized_crop(img: &Image, rect: Rect, size: (usize, usize), interpolation: Interpolation) -> Result<Image> {
    via_grid(img, |g| resizing::resized_crop(g, rect, size, interpolation))
}

/// Counter-clockwise rotation.
pub fn rotate(
    img: &Image,
    angle: f64,
    interpolation: Interpolation,
    expand: bool,
    center: Option<[f64; 2]>,
    fill: &Fill,
) -> Result<Image> {
    via_grid(img, |g| warp::rotate(g, angle, interpolation, expand, center, fill))
}

/// Affine warp.
pub fn affine(
    img: &Image,
    params: &AffineParams,
    interpolation: Interpolation,
    fill: &Fill,
    center: Option<[f64; 2]>,
) -> Result<Image> {
    via_grid(img, |g| warp::affine(g, params, interpolation, fill, center))
}

/// Perspective warp.
pub fn perspective(
    img: &Image,
    startpoints: &[[f64; 2]; 4],
    endpoints: &[[f64; 2]; 4],
    interpolation: Interpolation,
    fill: &Fill,
) -> Result<Image> {
    via_grid(img, |g| warp::perspective(g, startpoints, endpoints, interpolation, fill))
}

/// Grayscale with 1 or 3 output channels.
pub fn rgb_to_grayscale(img: &Image, num_output_channels: usize) -> Result<Image> {
    via_grid(img, |g| color::rgb_to_grayscale(g, num_output_channels))
}

/// Brightness blend.
pub fn adjust_brightness(img: &Image, factor: f64) -> Result<Image> {
    via_grid(img, |g| color::adjust_brightness(g, factor))
}

/// Contrast blend.
pub fn adjust_contrast(img: &Image, factor: f64) -> Result<Image> {
    via_grid(img, |g| color::adjust_contrast(g, factor))
}

/// Saturation blend.
pub fn adjust_saturation(img: &Image, factor: f64) -> Result<Image> {
    via_grid(img, |g| color::adjust_saturation(g, factor))
}

/// Hue rotation.
pub fn adjust_hue(img: &Image, factor: f64) -> Result<Image> {
    via_grid(img, |g| color::adjust_hue(g, factor))
}

/// Sharpness blend.
pub fn adjust_sharpness(img: &Image, factor: f64) -> Result<Image> {
    via_grid(img, |g| color::adjust_sharpness(g, factor))
}

/// Per-channel range stretch.
pub fn autocontrast(img: &Image) -> Result<Image> {
    via_grid(img, color::autocontrast)
}

/// Histogram equalization.
pub fn equalize(img: &Image) -> Result<Image> {
    via_grid(img, color::equalize)
}

/// `max - x`.
pub fn invert(img: &Image) -> Result<Image> {
    dispatch(img, packed::invert, color::invert)
}

/// Bit-depth reduction.
pub fn posterize(img: &Image, bits: u8) -> Result<Image> {
    dispatch(img, |p| packed::posterize(p, bits), |g| color::posterize(g, bits))
}

/// Inversion above a threshold.
pub fn solarize(img: &Image, threshold: f64) -> Result<Image> {
    dispatch(img, |p| packed::solarize(p, threshold), |g| color::solarize(g, threshold))
}

/// Separable Gaussian blur.
pub fn gaussian_blur(img: &Image, kernel_size: [usize; 2], sigma: Option<[f64; 2]>) -> Result<Image> {
    via_grid(img, |g| filter::gaussian_blur(g, kernel_size, sigma))
}

/// Per-channel standardization; packed input is rejected as non-float.
pub fn normalize(img: &Image, mean: &[f64], std: &[f64]) -> Result<Image> {
    via_grid(img, |g| norm::normalize(g, mean, std))
}

/// Flattened linear map.
pub fn linear_transformation(img: &Image, matrix: &[Vec<f64>], mean: &[f64]) -> Result<Image> {
    via_grid(img, |g| norm::linear_transformation(g, matrix, mean))
}

/// Overwrites a window with planar `values`.
pub fn erase(img: &Image, rect: Rect, values: &[f64]) -> Result<Image> {
    via_grid(img, |g| eraser::erase(g, rect, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use visaug_core::{Error, PixelMode};

    fn packed_image() -> PackedImage {
        let data = (0..5 * 4 * 3).map(|i| (i * 37 % 256) as u8).collect();
        PackedImage::new(5, 4, PixelMode::Rgb, data).unwrap()
    }

    fn both() -> (Image, Image) {
        let p = packed_image();
        (Image::Grid(p.to_grid()), Image::Packed(p))
    }

    fn assert_parity(grid_out: Image, packed_out: Image) {
        assert!(packed_out.is_packed());
        assert_eq!(grid_out.into_grid(), packed_out.into_grid());
    }

    #[test]
    fn test_exact_parity() {
        let (g, p) = both();
        assert_parity(hflip(&g).unwrap(), hflip(&p).unwrap());
        assert_parity(vflip(&g).unwrap(), vflip(&p).unwrap());
        assert_parity(invert(&g).unwrap(), invert(&p).unwrap());
        assert_parity(posterize(&g, 3).unwrap(), posterize(&p, 3).unwrap());
        assert_parity(solarize(&g, 100.0).unwrap(), solarize(&p, 100.0).unwrap());
        assert_parity(crop(&g, -1, 2, 3, 4).unwrap(), crop(&p, -1, 2, 3, 4).unwrap());
        for mode in [PaddingMode::Constant, PaddingMode::Edge, PaddingMode::Reflect, PaddingMode::Symmetric] {
            let fill = Fill::Scalar(127.0);
            assert_parity(pad(&g, &[2, 1], &fill, mode).unwrap(), pad(&p, &[2, 1], &fill, mode).unwrap());
        }
    }

    #[test]
    fn test_grid_path_parity() {
        let (g, p) = both();
        assert_parity(adjust_hue(&g, 0.2).unwrap(), adjust_hue(&p, 0.2).unwrap());
        assert_parity(
            resize(&g, &[3], Interpolation::Bilinear, None).unwrap(),
            resize(&p, &[3], Interpolation::Bilinear, None).unwrap(),
        );
    }

    #[test]
    fn test_ten_crop_encoding() {
        let (_, p) = both();
        let crops = ten_crop(&p, (2, 2), false).unwrap();
        assert_eq!(crops.len(), 10);
        assert!(crops.iter().all(|c| c.is_packed() && c.width() == 2));
    }

    #[test]
    fn test_normalize_rejects_packed() {
        let (_, p) = both();
        assert!(matches!(normalize(&p, &[0.5], &[0.5]), Err(Error::TypeMismatch(_))));
    }
}
