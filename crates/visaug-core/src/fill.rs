//! Fill values for out-of-bounds sampling and constant padding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A scalar or per-channel constant.
///
/// Deserializes from either a number or a list of numbers:
///
/// ```rust
/// use visaug_core::Fill;
///
/// assert_eq!(Fill::Scalar(0.5).resolve(3).unwrap(), vec![0.5; 3]);
/// assert_eq!(Fill::from(vec![1.0, 2.0, 3.0]).resolve(3).unwrap(), vec![1.0, 2.0, 3.0]);
/// assert!(Fill::from(vec![1.0, 2.0]).resolve(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    /// Same value for every channel.
    Scalar(f64),
    /// One value per channel; a single-element list broadcasts.
    PerChannel(Vec<f64>),
}

impl Default for Fill {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl Fill {
    /// Expands to exactly `channels` values.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if a per-channel list has neither 1 nor
    /// `channels` entries.
    pub fn resolve(&self, channels: usize) -> Result<Vec<f64>> {
        match self {
            Self::Scalar(v) => Ok(vec![*v; channels]),
            Self::PerChannel(values) if values.len() == 1 => Ok(vec![values[0]; channels]),
            Self::PerChannel(values) if values.len() == channels => Ok(values.clone()),
            Self::PerChannel(values) => Err(Error::ShapeMismatch(format!(
                "fill has {} values but the image has {channels} channels",
                values.len()
            ))),
        }
    }

    /// Whether every channel receives zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(v) => *v == 0.0,
            Self::PerChannel(values) => values.iter().all(|v| *v == 0.0),
        }
    }
}

impl From<f64> for Fill {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Fill {
    fn from(values: Vec<f64>) -> Self {
        Self::PerChannel(values)
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::PerChannel(values) => write!(f, "{values:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast() {
        assert_eq!(Fill::from(vec![7.0]).resolve(4).unwrap(), vec![7.0; 4]);
        assert!(Fill::default().is_zero());
        assert!(!Fill::from(vec![0.0, 1.0]).is_zero());
    }

    #[test]
    fn test_mismatch() {
        let err = Fill::from(vec![0.1, 0.2, 0.3, 0.4]).resolve(3).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}
