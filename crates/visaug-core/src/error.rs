//! Error types for visaug operations.
//!
//! Every failure the engine reports falls into one of five categories. All of
//! them are raised synchronously at the point of misuse; nothing is retried.
//!
//! # Usage
//!
//! ```rust
//! use visaug_core::{Error, Result};
//!
//! fn check_probability(p: f64) -> Result<()> {
//!     if !(0.0..=1.0).contains(&p) {
//!         return Err(Error::InvalidArgument(format!(
//!             "probability should be in [0, 1], got {p}"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_probability(0.5).is_ok());
//! assert!(check_probability(1.5).is_err());
//! ```
//!
//! # Degenerate inputs
//!
//! Inputs such as a zero-range channel for autocontrast, hue rotation of a
//! grayscale image or a single-bin histogram for equalize are *not* errors.
//! They produce a defined identity result.

use thiserror::Error;

use crate::dtype::DType;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or applying a transform.
///
/// # Categories
///
/// - [`InvalidArgument`](Error::InvalidArgument): malformed padding, size,
///   probability or range specifications
/// - [`ShapeMismatch`](Error::ShapeMismatch): channel-count or matrix-dimension
///   mismatches
/// - [`TypeMismatch`](Error::TypeMismatch): an operation needs a specific
///   sample type
/// - [`SingularTransform`](Error::SingularTransform): degenerate perspective
///   corners
/// - [`UnsafeConversion`](Error::UnsafeConversion): a dtype cast that could
///   overflow silently
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed argument: bad padding length, negative size, probability
    /// outside `[0, 1]`, range with `min > max` and so on.
    ///
    /// # Example
    ///
    /// ```rust
    /// use visaug_core::Error;
    ///
    /// let err = Error::InvalidArgument("padding must have 1, 2 or 4 values".into());
    /// assert!(err.to_string().contains("padding"));
    /// ```
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Channel count, fill length or matrix size does not match the image.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The operation requires a different sample type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Perspective corner configuration has no unique homography.
    #[error("singular transform: {0}")]
    SingularTransform(String),

    /// Dtype conversion that the library refuses to perform implicitly.
    ///
    /// Raised for float to integer casts whose integer range cannot be
    /// represented exactly by the float mantissa.
    #[error("the cast from {from} to {to} cannot be performed safely")]
    UnsafeConversion {
        /// Source dtype
        from: DType,
        /// Requested dtype
        to: DType,
    },
}

impl Error {
    /// Short machine-readable name of the error category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::ShapeMismatch(_) => "shape_mismatch",
            Self::TypeMismatch(_) => "type_mismatch",
            Self::SingularTransform(_) => "singular_transform",
            Self::UnsafeConversion { .. } => "unsafe_conversion",
        }
    }
}
