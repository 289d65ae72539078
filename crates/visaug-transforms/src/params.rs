//! Parameter specs shared by the transform options structs.
//!
//! Each spec accepts the short forms used in configs (a bare number or a
//! list) and resolves to a checked `[min, max]` range once, at validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{invalid, TransformResult};

/// A fixed value or a `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    /// Single value; its meaning depends on the transform.
    Fixed(f64),
    /// Explicit range.
    Range([f64; 2]),
}

impl ParamSpec {
    /// Resolves a fixed `d` to `[-d, d]`.
    ///
    /// # Errors
    ///
    /// InvalidArgument if `d` is negative or the range is inverted.
    pub fn symmetric(&self, name: &str) -> TransformResult<[f64; 2]> {
        match *self {
            Self::Fixed(d) if d < 0.0 || !d.is_finite() => {
                Err(invalid(format!("if {name} is a single number, it must be non-negative, got {d}")))
            }
            Self::Fixed(d) => Ok([-d, d]),
            Self::Range(r) => ordered(name, r),
        }
    }

    /// Resolves a fixed `v` to `[center - v, center + v]` within `bound`.
    ///
    /// With `clip_at_zero` the lower end is clamped to 0. A range is used
    /// as given but must lie inside `bound`.
    pub fn around(&self, name: &str, center: f64, bound: [f64; 2], clip_at_zero: bool) -> TransformResult<[f64; 2]> {
        let range = match *self {
            Self::Fixed(v) if v < 0.0 || !v.is_finite() => {
                return Err(invalid(format!("if {name} is a single number, it must be non-negative, got {v}")));
            }
            Self::Fixed(v) => {
                let lo = center - v;
                [if clip_at_zero { lo.max(0.0) } else { lo }, center + v]
            }
            Self::Range(r) => r,
        };
        if !(bound[0] <= range[0] && range[0] <= range[1] && range[1] <= bound[1]) {
            return Err(invalid(format!(
                "{name} values should be between {bound:?} and ordered, got {range:?}"
            )));
        }
        Ok(range)
    }

    /// Resolves to a strictly positive range; a fixed `v` means `[v, v]`.
    pub fn positive(&self, name: &str) -> TransformResult<[f64; 2]> {
        let range = match *self {
            Self::Fixed(v) => [v, v],
            Self::Range(r) => ordered(name, r)?,
        };
        if !(range[0] > 0.0) {
            return Err(invalid(format!("{name} values should be positive, got {range:?}")));
        }
        Ok(range)
    }
}

impl From<f64> for ParamSpec {
    fn from(v: f64) -> Self {
        Self::Fixed(v)
    }
}

impl From<[f64; 2]> for ParamSpec {
    fn from(r: [f64; 2]) -> Self {
        Self::Range(r)
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "{v}"),
            Self::Range([lo, hi]) => write!(f, "[{lo}, {hi}]"),
        }
    }
}

/// Output size: one value (square, or shorter edge for `Resize`) or `[h, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    /// One value.
    Single(usize),
    /// Height and width.
    Exact([usize; 2]),
}

impl Size {
    /// Values as a slice-friendly vector.
    pub fn to_vec(&self) -> Vec<usize> {
        match *self {
            Self::Single(s) => vec![s],
            Self::Exact([h, w]) => vec![h, w],
        }
    }

    /// Both dimensions, a single value repeated.
    pub fn hw(&self) -> (usize, usize) {
        match *self {
            Self::Single(s) => (s, s),
            Self::Exact([h, w]) => (h, w),
        }
    }

    /// Rejects zero dimensions.
    pub fn validate(&self, name: &str) -> TransformResult<()> {
        if self.to_vec().contains(&0) {
            return Err(invalid(format!("{name} must be positive, got {self}")));
        }
        Ok(())
    }
}

impl From<usize> for Size {
    fn from(s: usize) -> Self {
        Self::Single(s)
    }
}

impl From<(usize, usize)> for Size {
    fn from((h, w): (usize, usize)) -> Self {
        Self::Exact([h, w])
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(s) => write!(f, "{s}"),
            Self::Exact([h, w]) => write!(f, "{h}x{w}"),
        }
    }
}

pub(crate) fn default_p() -> f64 {
    0.5
}

/// Checks a probability.
pub fn check_probability(name: &str, p: f64) -> TransformResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(format!("{name} should be a probability in [0, 1], got {p}")));
    }
    Ok(())
}

/// Checks that a range is finite and ordered.
pub fn ordered(name: &str, range: [f64; 2]) -> TransformResult<[f64; 2]> {
    if !(range[0].is_finite() && range[1].is_finite()) || range[0] > range[1] {
        return Err(invalid(format!("{name} should be an ordered [min, max] range, got {range:?}")));
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric() {
        assert_eq!(ParamSpec::Fixed(30.0).symmetric("degrees").unwrap(), [-30.0, 30.0]);
        assert_eq!(ParamSpec::Range([10.0, 20.0]).symmetric("degrees").unwrap(), [10.0, 20.0]);
        assert!(ParamSpec::Fixed(-1.0).symmetric("degrees").is_err());
        assert!(ParamSpec::Range([2.0, 1.0]).symmetric("degrees").is_err());
    }

    #[test]
    fn test_around() {
        let inf = [0.0, f64::INFINITY];
        assert_eq!(ParamSpec::Fixed(0.4).around("brightness", 1.0, inf, true).unwrap(), [0.6, 1.4]);
        assert_eq!(ParamSpec::Fixed(2.0).around("contrast", 1.0, inf, true).unwrap(), [0.0, 3.0]);
        assert_eq!(ParamSpec::Fixed(0.2).around("hue", 0.0, [-0.5, 0.5], false).unwrap(), [-0.2, 0.2]);
        assert!(ParamSpec::Fixed(0.7).around("hue", 0.0, [-0.5, 0.5], false).is_err());
        assert!(ParamSpec::Range([-0.1, 0.6]).around("hue", 0.0, [-0.5, 0.5], false).is_err());
    }

    #[test]
    fn test_positive() {
        assert_eq!(ParamSpec::Fixed(1.5).positive("sigma").unwrap(), [1.5, 1.5]);
        assert!(ParamSpec::Range([0.0, 1.0]).positive("sigma").is_err());
    }

    #[test]
    fn test_size_forms() {
        let s: Size = serde_json::from_str("32").unwrap();
        assert_eq!(s.to_vec(), vec![32]);
        assert_eq!(s.hw(), (32, 32));
        let s: Size = serde_json::from_str("[20, 30]").unwrap();
        assert_eq!(s.hw(), (20, 30));
        assert!(Size::Exact([0, 3]).validate("size").is_err());
    }

    #[test]
    fn test_probability() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }
}
