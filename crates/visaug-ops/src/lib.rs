//! # visaug-ops
//!
//! Deterministic image operations for data augmentation.
//!
//! Everything here is a pure function of its inputs: random parameter
//! draws live in `visaug-transforms`.
//!
//! # Modules
//!
//! - [`geometry`] - Inverse matrices, rotated canvas sizes, padding amounts
//! - [`resample`] - Nearest / bilinear / bicubic grid sampling
//! - [`resize`] - Short-edge and exact resizing
//! - [`crop`], [`pad`], [`flip`] - Pixel re-arrangements
//! - [`warp`] - Affine, rotation and perspective warps
//! - [`color`] - Blends, hue, equalize, posterize, solarize, invert
//! - [`filter`] - Gaussian blur
//! - [`normalize`] - Normalize and linear transformation
//! - [`erase`] - Rectangle erasing
//! - [`packed`] - Native versions of the exact ops for interleaved bytes
//! - [`functional`] - All of the above over [`visaug_core::Image`]
//!
//! # Example
//!
//! ```rust
//! use visaug_core::{DType, Fill, Grid, Shape};
//! use visaug_ops::{pad::pad, PaddingMode};
//!
//! let grid = Grid::zeros(Shape::image(3, 32, 32), DType::U8).unwrap();
//! let padded = pad(&grid, &[2], &Fill::Scalar(127.0), PaddingMode::Constant).unwrap();
//! assert_eq!(padded.shape(), Shape::image(3, 36, 36));
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - process batch elements on the rayon pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod crop;
pub mod driver;
pub mod erase;
pub mod filter;
pub mod flip;
pub mod functional;
pub mod geometry;
pub mod normalize;
pub mod packed;
pub mod pad;
pub mod resample;
pub mod resize;
pub mod warp;

pub use geometry::{AffineMatrix, AffineParams};
pub use pad::PaddingMode;
pub use resample::Interpolation;
