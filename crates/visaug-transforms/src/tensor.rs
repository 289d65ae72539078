//! Transforms on numeric grids: normalization, linear maps, dtype conversion.

use serde::{Deserialize, Serialize};
use visaug_core::{convert_dtype, DType, Image};
use visaug_ops::functional as F;

use crate::error::{invalid, TransformResult};
use crate::random::RandomState;
use crate::transform::Augment;

/// `(x - mean) / std` per channel; float grids only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalize {
    /// One mean per channel, or a single shared one.
    pub mean: Vec<f64>,
    /// One std per channel, or a single shared one.
    pub std: Vec<f64>,
}

impl Augment for Normalize {
    fn name(&self) -> &'static str {
        "Normalize"
    }

    fn validate(&self) -> TransformResult<()> {
        if self.mean.is_empty() || self.std.is_empty() {
            return Err(invalid("mean and std must not be empty"));
        }
        if self.std.contains(&0.0) {
            return Err(invalid(format!("std evaluated to zero, leading to division by zero: {:?}", self.std)));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::normalize(img, &self.mean, &self.std)?)
    }
}

/// Flattens each image, subtracts `mean_vector` and right-multiplies by
/// `transformation_matrix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTransformation {
    /// Square matrix of side `C * H * W`.
    pub transformation_matrix: Vec<Vec<f64>>,
    /// Mean of length `C * H * W`.
    pub mean_vector: Vec<f64>,
}

impl Augment for LinearTransformation {
    fn name(&self) -> &'static str {
        "LinearTransformation"
    }

    fn validate(&self) -> TransformResult<()> {
        let side = self.transformation_matrix.len();
        if side == 0 || self.transformation_matrix.iter().any(|row| row.len() != side) {
            return Err(visaug_core::Error::ShapeMismatch("transformation_matrix should be square".into()).into());
        }
        if self.mean_vector.len() != side {
            return Err(visaug_core::Error::ShapeMismatch(format!(
                "mean_vector should have the same length {} as any one of the dimensions of the transformation_matrix",
                self.mean_vector.len()
            ))
            .into());
        }
        Ok(())
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::linear_transformation(img, &self.transformation_matrix, &self.mean_vector)?)
    }
}

/// Converts the sample type, rescaling between integer and float ranges.
///
/// Packed input always yields a grid, since only `u8` can stay packed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertImageDtype {
    /// Target sample type.
    pub dtype: DType,
}

impl Augment for ConvertImageDtype {
    fn name(&self) -> &'static str {
        "ConvertImageDtype"
    }

    fn validate(&self) -> TransformResult<()> {
        Ok(())
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(Image::Grid(convert_dtype(&img.to_grid(), self.dtype)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use visaug_core::{Error, Grid, PackedImage, PixelMode, Shape};

    #[test]
    fn test_normalize_validation() {
        assert!(Normalize { mean: vec![0.5], std: vec![0.0] }.validate().is_err());
        assert!(Normalize { mean: vec![], std: vec![1.0] }.validate().is_err());
        assert!(Normalize { mean: vec![0.5; 3], std: vec![0.2; 3] }.validate().is_ok());
    }

    #[test]
    fn test_normalize_inverse() {
        let grid = Grid::from_fn(Shape::image(3, 4, 4), DType::F32, |c, y, x| (c + y * 4 + x) as f64 / 20.0).unwrap();
        let (mean, std) = (vec![0.485, 0.456, 0.406], vec![0.229, 0.224, 0.225]);
        let t = Normalize { mean: mean.clone(), std: std.clone() };
        let out = t.forward(&Image::Grid(grid.clone()), &mut RandomState::new(0)).unwrap().into_grid();
        for c in 0..3 {
            for y in 0..4 {
                for x in 0..4 {
                    assert_abs_diff_eq!(out.get(0, c, y, x) * std[c] + mean[c], grid.get(0, c, y, x), epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_linear_transformation_shape_checks() {
        let t = LinearTransformation { transformation_matrix: vec![vec![1.0, 0.0], vec![0.0]], mean_vector: vec![0.0; 2] };
        assert!(matches!(t.validate().unwrap_err().kind(), Some(Error::ShapeMismatch(_))));
        let t = LinearTransformation { transformation_matrix: vec![vec![1.0]], mean_vector: vec![0.0; 2] };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_linear_transformation_identity() {
        let side = 2 * 2;
        let matrix: Vec<Vec<f64>> = (0..side).map(|i| (0..side).map(|j| if i == j { 1.0 } else { 0.0 }).collect()).collect();
        let t = LinearTransformation { transformation_matrix: matrix, mean_vector: vec![0.0; side] };
        let grid = Grid::from_fn(Shape::image(1, 2, 2), DType::F32, |_, y, x| (y * 2 + x) as f64).unwrap();
        let out = t.forward(&Image::Grid(grid.clone()), &mut RandomState::new(0)).unwrap();
        assert_eq!(out.into_grid(), grid);
    }

    #[test]
    fn test_convert_packed_to_float() {
        let packed = PackedImage::filled(2, 2, PixelMode::L, &[255]).unwrap();
        let out = ConvertImageDtype { dtype: DType::F32 }.forward(&Image::Packed(packed), &mut RandomState::new(0)).unwrap();
        let grid = out.as_grid().unwrap();
        assert_eq!(grid.dtype(), DType::F32);
        assert_eq!(grid.as_slice::<f32>().unwrap(), &[1.0; 4]);
    }

    #[test]
    fn test_convert_unsafe() {
        let grid = Grid::zeros(Shape::image(1, 2, 2), DType::F32).unwrap();
        let err = ConvertImageDtype { dtype: DType::I64 }.forward(&Image::Grid(grid), &mut RandomState::new(0)).unwrap_err();
        assert!(matches!(err.kind(), Some(Error::UnsafeConversion { .. })));
    }
}
