//! Sample types.
//!
//! - [`DType`] - Runtime tag for the sample type of a [`Grid`](crate::Grid)
//! - [`Sample`] - Trait implemented by every storable scalar
//! - [`Cast`] - How a float result is written back into an integer dtype
//!
//! # Usage
//!
//! ```rust
//! use visaug_core::{Cast, DType, Sample};
//!
//! assert_eq!(DType::U8.max_value(), 255.0);
//! assert_eq!(DType::F32.max_value(), 1.0);
//! assert_eq!(u8::from_f64(127.5, Cast::Round), 128);
//! assert_eq!(u8::from_f64(300.0, Cast::Truncate), 255);
//! ```

use std::fmt;
use std::str::FromStr;

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime sample type of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// 8-bit unsigned integer, [0, 255].
    #[serde(rename = "uint8", alias = "u8")]
    U8,
    /// 8-bit signed integer.
    #[serde(rename = "int8", alias = "i8")]
    I8,
    /// 16-bit signed integer.
    #[serde(rename = "int16", alias = "i16")]
    I16,
    /// 32-bit signed integer.
    #[serde(rename = "int32", alias = "i32")]
    I32,
    /// 64-bit signed integer.
    #[serde(rename = "int64", alias = "i64")]
    I64,
    /// IEEE 754 half precision.
    #[serde(rename = "float16", alias = "f16")]
    F16,
    /// IEEE 754 single precision.
    #[serde(rename = "float32", alias = "f32")]
    F32,
    /// IEEE 754 double precision.
    #[serde(rename = "float64", alias = "f64")]
    F64,
}

impl DType {
    /// All supported dtypes.
    pub const ALL: [DType; 8] = [
        DType::U8,
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::F16,
        DType::F32,
        DType::F64,
    ];

    /// Whether this is a floating-point dtype.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F16 | Self::F32 | Self::F64)
    }

    /// Storage size in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::U8 | Self::I8 => 8,
            Self::I16 | Self::F16 => 16,
            Self::I32 | Self::F32 => 32,
            Self::I64 | Self::F64 => 64,
        }
    }

    /// Largest value of the image range.
    ///
    /// Float images are conventionally in `[0, 1]`, so this is `1.0` for
    /// float dtypes and the integer maximum otherwise.
    #[inline]
    pub fn max_value(self) -> f64 {
        match self.int_max() {
            Some(max) => max as f64,
            None => 1.0,
        }
    }

    /// Integer maximum, or `None` for float dtypes.
    #[inline]
    pub const fn int_max(self) -> Option<i128> {
        match self {
            Self::U8 => Some(u8::MAX as i128),
            Self::I8 => Some(i8::MAX as i128),
            Self::I16 => Some(i16::MAX as i128),
            Self::I32 => Some(i32::MAX as i128),
            Self::I64 => Some(i64::MAX as i128),
            Self::F16 | Self::F32 | Self::F64 => None,
        }
    }

    /// Number of significand bits (including the implicit one) for floats.
    #[inline]
    pub const fn mantissa_bits(self) -> Option<u32> {
        match self {
            Self::F16 => Some(11),
            Self::F32 => Some(24),
            Self::F64 => Some(53),
            _ => None,
        }
    }

    /// Canonical name, e.g. `"uint8"` or `"float32"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F16 => "float16",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let dtype = match s.to_ascii_lowercase().as_str() {
            "uint8" | "u8" => Self::U8,
            "int8" | "i8" => Self::I8,
            "int16" | "i16" => Self::I16,
            "int32" | "i32" => Self::I32,
            "int64" | "i64" => Self::I64,
            "float16" | "f16" | "half" => Self::F16,
            "float32" | "f32" | "float" => Self::F32,
            "float64" | "f64" | "double" => Self::F64,
            other => {
                return Err(Error::InvalidArgument(format!("unknown dtype '{other}'")));
            }
        };
        Ok(dtype)
    }
}

/// Rounding applied when a float result is stored into an integer dtype.
///
/// Both modes saturate at the dtype bounds. Float targets ignore the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cast {
    /// Drop the fractional part (C-style cast).
    #[default]
    Truncate,
    /// Round to nearest, ties to even.
    Round,
}

/// A scalar that can live inside a [`Grid`](crate::Grid).
pub trait Sample: Copy + PartialOrd + Send + Sync + fmt::Debug + 'static {
    /// Runtime tag of this type.
    const DTYPE: DType;

    /// Widens to `f64`.
    fn to_f64(self) -> f64;

    /// Narrows from `f64`, saturating for integer types.
    fn from_f64(value: f64, cast: Cast) -> Self;
}

macro_rules! impl_int_sample {
    ($($t:ty => $tag:ident),* $(,)?) => {
        $(
            impl Sample for $t {
                const DTYPE: DType = DType::$tag;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64, cast: Cast) -> Self {
                    let v = match cast {
                        Cast::Truncate => value.trunc(),
                        Cast::Round => value.round_ties_even(),
                    };
                    v as $t
                }
            }
        )*
    };
}

impl_int_sample!(u8 => U8, i8 => I8, i16 => I16, i32 => I32, i64 => I64);

impl Sample for f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(value: f64, _cast: Cast) -> Self {
        f16::from_f64(value)
    }
}

impl Sample for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64, _cast: Cast) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64, _cast: Cast) -> Self {
        value
    }
}
