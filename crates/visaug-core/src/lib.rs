//! # visaug-core
//!
//! Core types for the visaug image-augmentation engine.
//!
//! - [`Grid`] - Planar `(C, H, W)` or `(B, C, H, W)` numeric image
//! - [`PackedImage`] - Interleaved 8-bit image (`L`, `RGB`, `RGBA`)
//! - [`Image`] - Either encoding, as accepted by functional operations
//! - [`DType`], [`Sample`], [`Cast`] - Sample types and narrowing rules
//! - [`Fill`] - Scalar or per-channel constant for padding and sampling
//! - [`Rect`] - Signed crop rectangle
//! - [`Error`] - The error taxonomy shared by every visaug crate
//!
//! ## Crate Structure
//!
//! ```text
//! visaug-core (this crate)
//!    ^
//!    +-- visaug-ops (functional engine)
//!          ^
//!          +-- visaug-transforms (randomized transforms, pipelines, artifacts)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use visaug_core::prelude::*;
//!
//! let packed = PackedImage::filled(4, 4, PixelMode::Rgb, &[10, 20, 30]).unwrap();
//! let grid = to_tensor(&packed);
//! assert_eq!(grid.dtype(), DType::F32);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod convert;
pub mod dtype;
pub mod error;
pub mod fill;
pub mod grid;
pub mod image;
pub mod packed;
pub mod rect;

pub use convert::{convert_dtype, is_unsafe_cast, to_packed_image, to_tensor};
pub use dtype::{Cast, DType, Sample};
pub use error::{Error, Result};
pub use fill::Fill;
pub use grid::{Grid, GridData, Shape, StorageType};
pub use image::Image;
pub use packed::{PackedImage, PixelMode};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// ```
/// use visaug_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::convert::{convert_dtype, to_packed_image, to_tensor};
    pub use crate::dtype::{Cast, DType};
    pub use crate::error::{Error, Result};
    pub use crate::fill::Fill;
    pub use crate::grid::{Grid, Shape};
    pub use crate::image::Image;
    pub use crate::packed::{PackedImage, PixelMode};
    pub use crate::rect::Rect;
}
