//! Dtype and encoding conversions.
//!
//! # Dtype rules
//!
//! | from  | to    | rule |
//! |-------|-------|------|
//! | float | float | plain cast |
//! | float | int   | `x * (max + 1 - eps)` in the source width, truncated; refused if `max` exceeds the float mantissa |
//! | int   | float | `x / max` |
//! | int   | int   | rescale by `(max_out + 1) / (max_in + 1)` |
//!
//! ```rust
//! use visaug_core::{convert_dtype, DType, Grid, Shape};
//!
//! let grid = Grid::from_vec(Shape::image(1, 1, 3), vec![0u8, 128, 255]).unwrap();
//! let f = convert_dtype(&grid, DType::F32).unwrap();
//! let back = convert_dtype(&f, DType::U8).unwrap();
//! assert_eq!(back.as_slice::<u8>().unwrap(), &[0, 128, 255]);
//! ```

use half::f16;
use tracing::trace;

use crate::dtype::{Cast, DType};
use crate::error::{Error, Result};
use crate::grid::{Grid, GridData};
use crate::packed::PackedImage;

/// Margin keeping `1.0` from rounding up to `max + 1` on float to int casts.
const FLOAT_TO_INT_EPS: f64 = 1e-3;

/// Whether a float to int cast could overflow the float mantissa.
///
/// Refuses `float32 -> int32`, `float32 -> int64` and `float64 -> int64`,
/// and by the same rule every `float16` cast wider than `int8`/`uint8`
/// (`float16 -> int16`, `int32`, `int64`).
pub fn is_unsafe_cast(from: DType, to: DType) -> bool {
    match (from.mantissa_bits(), to.int_max()) {
        (Some(bits), Some(max)) => max > (1i128 << bits),
        _ => false,
    }
}

/// Converts a grid to `dtype`, rescaling values to the target range.
///
/// # Errors
///
/// [`Error::UnsafeConversion`] for float to int pairs that could overflow,
/// e.g. `float32 -> int32` or `float64 -> int64`.
pub fn convert_dtype(grid: &Grid, dtype: DType) -> Result<Grid> {
    let from = grid.dtype();
    trace!(%from, to = %dtype, "convert_dtype");
    if from == dtype {
        return Ok(grid.clone());
    }

    let data = match (from.is_float(), dtype.is_float()) {
        (true, true) => GridData::from_f64(dtype, &grid.to_f64_vec(), Cast::Truncate),
        (true, false) => {
            if is_unsafe_cast(from, dtype) {
                return Err(Error::UnsafeConversion { from, to: dtype });
            }
            GridData::from_f64(dtype, &float_to_int_values(grid, dtype), Cast::Truncate)
        }
        (false, true) => int_to_float(grid, from, dtype),
        (false, false) => int_to_int(grid, from, dtype)?,
    };
    Grid::new(grid.shape(), data)
}

/// Scaled values before truncation, multiplied in the source float width.
fn float_to_int_values(grid: &Grid, to: DType) -> Vec<f64> {
    let scale = to.max_value() + 1.0 - FLOAT_TO_INT_EPS;
    match grid.data() {
        GridData::F32(v) => {
            let scale = scale as f32;
            v.iter().map(|&x| (x * scale) as f64).collect()
        }
        GridData::F16(v) => {
            let scale = scale as f32;
            v.iter().map(|&x| (x.to_f32() * scale) as f64).collect()
        }
        _ => grid.to_f64_vec().iter().map(|v| v * scale).collect(),
    }
}

fn int_to_float(grid: &Grid, from: DType, to: DType) -> GridData {
    let max = from.max_value();
    let values = grid.to_f64_vec();
    match to {
        // Divide in single precision so results match f32 arithmetic exactly.
        DType::F32 | DType::F16 => {
            let max = max as f32;
            let scaled: Vec<f32> = values.iter().map(|&v| v as f32 / max).collect();
            if to == DType::F32 {
                GridData::F32(scaled)
            } else {
                GridData::F16(scaled.into_iter().map(f16::from_f32).collect())
            }
        }
        _ => GridData::F64(values.iter().map(|v| v / max).collect()),
    }
}

fn int_to_int(grid: &Grid, from: DType, to: DType) -> Result<GridData> {
    let (Some(in_max), Some(out_max)) = (from.int_max(), to.int_max()) else {
        return Err(Error::TypeMismatch(format!("{from} -> {to} is not an integer cast")));
    };
    let len = grid.shape().len();
    let values: Vec<f64> = if in_max > out_max {
        let factor = (in_max + 1) / (out_max + 1);
        (0..len)
            .map(|i| read_i128(grid.data(), i).div_euclid(factor) as f64)
            .collect()
    } else {
        let factor = (out_max + 1) / (in_max + 1);
        (0..len).map(|i| (read_i128(grid.data(), i) * factor) as f64).collect()
    };
    Ok(GridData::from_f64(to, &values, Cast::Truncate))
}

fn read_i128(data: &GridData, index: usize) -> i128 {
    match data {
        GridData::U8(v) => v[index] as i128,
        GridData::I8(v) => v[index] as i128,
        GridData::I16(v) => v[index] as i128,
        GridData::I32(v) => v[index] as i128,
        GridData::I64(v) => v[index] as i128,
        other => other.get_f64(index) as i128,
    }
}

/// Packed image to an `f32` grid in `[0, 1]`.
pub fn to_tensor(image: &PackedImage) -> Grid {
    let grid = image.to_grid();
    let data = match grid.as_slice::<u8>() {
        Some(bytes) => GridData::F32(bytes.iter().map(|&b| b as f32 / 255.0).collect()),
        None => GridData::from_f64(DType::F32, &grid.to_f64_vec(), Cast::Truncate),
    };
    Grid::from_parts(grid.shape(), data)
}

/// Grid to a packed image.
///
/// Float grids are multiplied by 255 and truncated; `u8` grids are packed
/// as they are.
///
/// # Errors
///
/// [`Error::TypeMismatch`] for other integer dtypes, plus anything
/// [`PackedImage::from_grid`] rejects.
pub fn to_packed_image(grid: &Grid) -> Result<PackedImage> {
    match grid.dtype() {
        DType::U8 => PackedImage::from_grid(grid),
        d if d.is_float() => {
            let values: Vec<f64> = grid.to_f64_vec().iter().map(|v| v * 255.0).collect();
            PackedImage::from_grid(&Grid::from_f64(grid.shape(), DType::U8, &values, Cast::Truncate)?)
        }
        d => Err(Error::TypeMismatch(format!("cannot pack a {d} grid"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Shape;
    use crate::packed::PixelMode;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_unsafe_pairs() {
        assert!(is_unsafe_cast(DType::F32, DType::I32));
        assert!(is_unsafe_cast(DType::F32, DType::I64));
        assert!(is_unsafe_cast(DType::F64, DType::I64));
        assert!(is_unsafe_cast(DType::F16, DType::I16));
        assert!(is_unsafe_cast(DType::F16, DType::I32));
        assert!(!is_unsafe_cast(DType::F16, DType::U8));
        assert!(!is_unsafe_cast(DType::F32, DType::I16));
        assert!(!is_unsafe_cast(DType::F64, DType::I32));
        assert!(!is_unsafe_cast(DType::F32, DType::U8));
    }

    #[test]
    fn test_float_to_int64_refused() {
        let grid = Grid::from_vec(Shape::image(1, 1, 2), vec![-0.5f32, 1.5]).unwrap();
        assert_eq!(
            convert_dtype(&grid, DType::I64),
            Err(Error::UnsafeConversion { from: DType::F32, to: DType::I64 })
        );
    }

    #[test]
    fn test_float_to_u8() {
        let grid = Grid::from_vec(Shape::image(1, 1, 3), vec![0.0f32, 0.5, 1.0]).unwrap();
        let out = convert_dtype(&grid, DType::U8).unwrap();
        assert_eq!(out.as_slice::<u8>().unwrap(), &[0, 127, 255]);
    }

    #[test]
    fn test_float32_scaled_in_single_precision() {
        // x * 255.999 rounds up to 11.0 in f32 but stays below it in f64
        let x = f32::from_bits(0x3d30_002d);
        let grid = Grid::from_vec(Shape::image(1, 1, 1), vec![x]).unwrap();
        let out = convert_dtype(&grid, DType::U8).unwrap();
        assert_eq!(out.as_slice::<u8>().unwrap(), &[11]);

        let wide = convert_dtype(&grid, DType::F64).unwrap();
        assert_eq!(convert_dtype(&wide, DType::U8).unwrap().as_slice::<u8>().unwrap(), &[10]);
    }

    #[test]
    fn test_float16_to_u8() {
        let grid = Grid::from_vec(Shape::image(1, 1, 3), vec![f16::ZERO, f16::from_f32(0.5), f16::ONE]).unwrap();
        let out = convert_dtype(&grid, DType::U8).unwrap();
        assert_eq!(out.as_slice::<u8>().unwrap(), &[0, 127, 255]);
    }

    #[test]
    fn test_int_to_int() {
        let grid = Grid::from_vec(Shape::image(1, 1, 3), vec![0u8, 1, 255]).unwrap();
        let wide = convert_dtype(&grid, DType::I16).unwrap();
        assert_eq!(wide.as_slice::<i16>().unwrap(), &[0, 128, 32640]);
        let narrow = convert_dtype(&wide, DType::U8).unwrap();
        assert_eq!(narrow.as_slice::<u8>().unwrap(), &[0, 1, 255]);
    }

    #[test]
    fn test_int_to_float_roundtrip() {
        let values: Vec<u8> = (0..=255).collect();
        let grid = Grid::from_vec(Shape::image(1, 16, 16), values.clone()).unwrap();
        for dtype in [DType::F32, DType::F64] {
            let f = convert_dtype(&grid, dtype).unwrap();
            assert_abs_diff_eq!(f.get(0, 0, 15, 15), 1.0, epsilon = 1e-6);
            let back = convert_dtype(&f, DType::U8).unwrap();
            assert_eq!(back.as_slice::<u8>().unwrap(), &values[..]);
        }
    }

    #[test]
    fn test_to_tensor_and_back() {
        let img = PackedImage::filled(2, 2, PixelMode::Rgb, &[0, 128, 255]).unwrap();
        let t = to_tensor(&img);
        assert_eq!(t.dtype(), DType::F32);
        assert_abs_diff_eq!(t.get(0, 2, 0, 0), 1.0, epsilon = 1e-7);
        assert_eq!(to_packed_image(&t).unwrap(), img);
    }
}
