//! Gaussian blur.
//!
//! The blur is separable: a 1D kernel runs along rows, then along columns.
//! Borders replicate the edge pixel.
//!
//! # Example
//!
//! ```rust
//! use visaug_ops::filter::Kernel1d;
//!
//! let k = Kernel1d::gaussian(5, 1.0).unwrap();
//! assert_eq!(k.len(), 5);
//! assert!((k.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```

use tracing::trace;
use visaug_core::{Error, Grid, Result};

use crate::driver::{map_images, rounding};

/// Normalized, odd-length 1D convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1d {
    data: Vec<f64>,
}

impl Kernel1d {
    /// Sampled Gaussian over `linspace(-(size-1)/2, (size-1)/2, size)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an even or zero `size`, or a
    /// non-positive `sigma`.
    pub fn gaussian(size: usize, sigma: f64) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(Error::InvalidArgument(format!(
                "kernel size must be an odd positive integer, got {size}"
            )));
        }
        if !(sigma > 0.0) {
            return Err(Error::InvalidArgument(format!("sigma must be positive, got {sigma}")));
        }
        let half = (size - 1) as f64 * 0.5;
        let mut data: Vec<f64> = (0..size)
            .map(|i| {
                let x = (i as f64 - half) / sigma;
                (-0.5 * x * x).exp()
            })
            .collect();

        // Normalize
        let sum: f64 = data.iter().sum();
        for w in &mut data {
            *w /= sum;
        }
        Ok(Self { data })
    }

    /// Taps.
    pub fn weights(&self) -> &[f64] {
        &self.data
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the kernel has no taps.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn radius(&self) -> i64 {
        (self.data.len() / 2) as i64
    }
}

/// Default sigma for a kernel of `size` taps.
#[inline]
pub fn default_sigma(size: usize) -> f64 {
    size as f64 * 0.15 + 0.35
}

/// Blurs every channel with a separable Gaussian.
///
/// # Arguments
///
/// * `kernel_size` - `[kx, ky]`, odd and positive
/// * `sigma` - `[sx, sy]`; `None` derives each from its kernel size
///
/// # Errors
///
/// [`Error::InvalidArgument`] for bad kernel sizes or sigmas.
pub fn gaussian_blur(grid: &Grid, kernel_size: [usize; 2], sigma: Option<[f64; 2]>) -> Result<Grid> {
    let sigma = sigma.unwrap_or([default_sigma(kernel_size[0]), default_sigma(kernel_size[1])]);
    let kx = Kernel1d::gaussian(kernel_size[0], sigma[0])?;
    let ky = Kernel1d::gaussian(kernel_size[1], sigma[1])?;
    let shape = grid.shape();
    let (h, w) = (shape.height, shape.width);
    trace!(kx = kernel_size[0], ky = kernel_size[1], sx = sigma[0], sy = sigma[1], "gaussian_blur");

    let dtype = grid.dtype();
    map_images(grid, shape.element(), dtype, rounding(dtype), |src, dst| {
        let mut tmp = vec![0.0; h * w];
        let (rx, ry) = (kx.radius(), ky.radius());
        let clamp = |v: i64, n: usize| v.clamp(0, n as i64 - 1) as usize;
        for c in 0..shape.channels {
            let plane = &src[c * h * w..(c + 1) * h * w];
            for y in 0..h {
                let row = &plane[y * w..(y + 1) * w];
                for x in 0..w {
                    tmp[y * w + x] = kx
                        .weights()
                        .iter()
                        .enumerate()
                        .map(|(k, wt)| wt * row[clamp(x as i64 + k as i64 - rx, w)])
                        .sum();
                }
            }
            let out = &mut dst[c * h * w..(c + 1) * h * w];
            for y in 0..h {
                for x in 0..w {
                    out[y * w + x] = ky
                        .weights()
                        .iter()
                        .enumerate()
                        .map(|(k, wt)| wt * tmp[clamp(y as i64 + k as i64 - ry, h) * w + x])
                        .sum();
                }
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use visaug_core::{DType, Shape};

    #[test]
    fn test_kernel_validation() {
        assert!(Kernel1d::gaussian(4, 1.0).is_err());
        assert!(Kernel1d::gaussian(0, 1.0).is_err());
        assert!(Kernel1d::gaussian(3, 0.0).is_err());
        let k = Kernel1d::gaussian(1, 0.5).unwrap();
        assert_eq!(k.weights(), &[1.0]);
    }

    #[test]
    fn test_kernel_symmetric() {
        let k = Kernel1d::gaussian(5, 1.2).unwrap();
        let w = k.weights();
        assert_abs_diff_eq!(w[0], w[4], epsilon = 1e-15);
        assert!(w[2] > w[1] && w[1] > w[0]);
    }

    #[test]
    fn test_blur_constant_image() {
        let grid = Grid::from_fn(Shape::batch(2, 3, 6, 5), DType::U8, |_, _, _| 90.0).unwrap();
        let out = gaussian_blur(&grid, [5, 3], None).unwrap();
        assert_eq!(out, grid);
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let grid = Grid::from_fn(Shape::image(1, 5, 5), DType::F64, |_, y, x| {
            if y == 2 && x == 2 { 1.0 } else { 0.0 }
        })
        .unwrap();
        let out = gaussian_blur(&grid, [3, 3], Some([1.0, 1.0])).unwrap();
        let total: f64 = out.to_f64_vec().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert!(out.get(0, 0, 2, 2) < 1.0);
        assert!(out.get(0, 0, 2, 1) > 0.0);
        assert_eq!(out.get(0, 0, 0, 0), 0.0);
    }
}
