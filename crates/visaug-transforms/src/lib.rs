//! # visaug-transforms
//!
//! Randomized transforms and pipelines on top of `visaug-ops`.
//!
//! - [`RandomState`] - Explicit, seedable draw source
//! - [`Transform`] - Tagged enum over every transform and combinator
//! - [`BatchPolicy`] - Shared or per-element draws for batched input
//! - [`artifact`] - Reloadable binary pipeline artifacts
//! - [`PipelineConfig`] - YAML pipeline configuration
//!
//! # Example
//!
//! ```rust
//! use visaug_core::{DType, Grid, Image, Shape};
//! use visaug_transforms::{RandomState, Transform};
//!
//! let pipeline = Transform::from_yaml_str(
//!     r#"
//! type: compose
//! transforms:
//!   - type: resize
//!     size: 16
//!   - type: random_horizontal_flip
//! "#,
//! )
//! .unwrap();
//!
//! let img = Image::from(Grid::zeros(Shape::image(3, 32, 48), DType::U8).unwrap());
//! let mut rs = RandomState::new(0);
//! let out = pipeline.apply(&img, &mut rs).unwrap();
//! assert_eq!((out.height(), out.width()), (16, 24));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod artifact;
pub mod autoaugment;
pub mod batch;
pub mod combinators;
pub mod config;
pub mod erasing;
pub mod error;
pub mod geometric;
pub mod params;
pub mod photometric;
pub mod random;
pub mod tensor;
pub mod transform;

pub use autoaugment::{AutoAugment, AutoAugmentPolicy};
pub use batch::BatchPolicy;
pub use combinators::{Compose, RandomApply, RandomChoice, RandomOrder};
pub use config::PipelineConfig;
pub use erasing::{ErasingValue, RandomErasing};
pub use error::{TransformError, TransformResult};
pub use geometric::{
    CenterCrop, Pad, RandomAffine, RandomCrop, RandomHorizontalFlip, RandomPerspective, RandomResizedCrop,
    RandomRotation, RandomVerticalFlip, Resize, Shear,
};
pub use params::{ParamSpec, Size};
pub use photometric::{
    ColorJitter, GaussianBlur, Grayscale, RandomAdjustSharpness, RandomAutocontrast, RandomEqualize,
    RandomGrayscale, RandomInvert, RandomPosterize, RandomSolarize,
};
pub use random::RandomState;
pub use tensor::{ConvertImageDtype, LinearTransformation, Normalize};
pub use transform::{Augment, Transform};
