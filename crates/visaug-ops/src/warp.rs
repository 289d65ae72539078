//! Affine, rotation and perspective warps.
//!
//! Each warp builds an inverse map with [`geometry`](crate::geometry) and
//! hands it to [`resample::sample`].

use tracing::trace;
use visaug_core::{Fill, Grid, Result};

use crate::geometry::{affine_matrix, perspective_matrix, rotated_output_size_about, AffineParams};
use crate::resample::{sample, Interpolation};

/// Applies an affine transform, keeping the image size.
///
/// # Arguments
///
/// * `params` - angle (clockwise degrees), translation, scale and shear
/// * `center` - pivot in pixel coordinates; `None` is the image centre
///
/// # Errors
///
/// [`visaug_core::Error::InvalidArgument`] for a non-positive scale.
pub fn affine(
    grid: &Grid,
    params: &AffineParams,
    interpolation: Interpolation,
    fill: &Fill,
    center: Option<[f64; 2]>,
) -> Result<Grid> {
    params.validate()?;
    let size = (grid.height(), grid.width());
    trace!(?params, ?center, "affine");
    let matrix = affine_matrix(params, center, size, size);
    sample(grid, &matrix, size, interpolation, fill)
}

/// Rotates counter-clockwise by `angle` degrees.
///
/// With `expand`, the canvas grows to the bounding box of the rotated image;
/// an off-centre `center` still shifts the content within that canvas.
pub fn rotate(
    grid: &Grid,
    angle: f64,
    interpolation: Interpolation,
    expand: bool,
    center: Option<[f64; 2]>,
    fill: &Fill,
) -> Result<Grid> {
    let size = (grid.height(), grid.width());
    let out = rotated_output_size_about(size, angle, expand, center);
    trace!(angle, expand, out_height = out.0, out_width = out.1, "rotate");
    let matrix = affine_matrix(&AffineParams::rotation(-angle), center, size, out);
    sample(grid, &matrix, out, interpolation, fill)
}

/// Moves the four `startpoints` corners onto `endpoints`.
///
/// Corners are `[x, y]` in the order top-left, top-right, bottom-right,
/// bottom-left.
///
/// # Errors
///
/// [`visaug_core::Error::SingularTransform`] for degenerate corners.
pub fn perspective(
    grid: &Grid,
    startpoints: &[[f64; 2]; 4],
    endpoints: &[[f64; 2]; 4],
    interpolation: Interpolation,
    fill: &Fill,
) -> Result<Grid> {
    let matrix = perspective_matrix(startpoints, endpoints)?;
    trace!(?startpoints, ?endpoints, "perspective");
    sample(grid, &matrix, (grid.height(), grid.width()), interpolation, fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::{hflip, vflip};
    use visaug_core::{DType, Error, Shape};

    fn numbered(h: usize, w: usize) -> Grid {
        Grid::from_fn(Shape::image(2, h, w), DType::U8, |c, y, x| (c * 100 + y * w + x) as f64).unwrap()
    }

    #[test]
    fn test_rotate_180_is_double_flip() {
        let grid = numbered(4, 5);
        let out = rotate(&grid, 180.0, Interpolation::Nearest, false, None, &Fill::default()).unwrap();
        assert_eq!(out, vflip(&hflip(&grid).unwrap()).unwrap());
    }

    #[test]
    fn test_rotate_90_expand() {
        let grid = numbered(2, 4);
        let out = rotate(&grid, 90.0, Interpolation::Nearest, true, None, &Fill::default()).unwrap();
        assert_eq!(out.shape(), Shape::image(2, 4, 2));
        // counter-clockwise: the top-right pixel ends up top-left
        assert_eq!(out.get(0, 0, 0, 0), grid.get(0, 0, 0, 3));
        assert_eq!(out.get(0, 1, 3, 1), grid.get(0, 1, 1, 0));
    }

    #[test]
    fn test_rotate_expand_keeps_pivot() {
        let grid = Grid::from_fn(Shape::image(1, 10, 12), DType::F32, |_, y, x| (y * 12 + x) as f64).unwrap();
        let fill = Fill::default();
        let centred = rotate(&grid, 30.0, Interpolation::Nearest, true, None, &fill).unwrap();
        let explicit = rotate(&grid, 30.0, Interpolation::Nearest, true, Some([6.0, 5.0]), &fill).unwrap();
        assert_eq!(centred, explicit);
        let corner = rotate(&grid, 30.0, Interpolation::Nearest, true, Some([0.0, 0.0]), &fill).unwrap();
        assert_ne!(centred, corner);
    }

    #[test]
    fn test_rotate_half_turn_about_outside_pivot() {
        // pivot outside the image: the turned copy lands clear of the canvas
        let grid = numbered(4, 6);
        let fill = Fill::Scalar(7.0);
        let out = rotate(&grid, 180.0, Interpolation::Nearest, true, Some([-10.0, -10.0]), &fill).unwrap();
        assert_eq!(out.channels(), 2);
        assert!(out.to_f64_vec().iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_affine_identity() {
        let grid = numbered(3, 3);
        for mode in [Interpolation::Nearest, Interpolation::Bilinear] {
            let out = affine(&grid, &AffineParams::default(), mode, &Fill::default(), None).unwrap();
            assert_eq!(out, grid);
        }
        let bad = AffineParams { scale: 0.0, ..AffineParams::default() };
        assert!(matches!(
            affine(&grid, &bad, Interpolation::Nearest, &Fill::default(), None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_affine_translate_fill() {
        let grid = numbered(3, 3);
        let params = AffineParams { translate: [1.0, 0.0], ..AffineParams::default() };
        let out = affine(&grid, &params, Interpolation::Nearest, &Fill::Scalar(255.0), None).unwrap();
        assert_eq!(out.get(0, 0, 0, 0), 255.0);
        assert_eq!(out.get(0, 0, 0, 1), grid.get(0, 0, 0, 0));
    }

    #[test]
    fn test_perspective_identity_and_singular() {
        let grid = numbered(4, 4);
        let corners = [[0.0, 0.0], [3.0, 0.0], [3.0, 3.0], [0.0, 3.0]];
        let out = perspective(&grid, &corners, &corners, Interpolation::Nearest, &Fill::default()).unwrap();
        assert_eq!(out, grid);
        let collinear = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert!(matches!(
            perspective(&grid, &corners, &collinear, Interpolation::Bilinear, &Fill::default()),
            Err(Error::SingularTransform(_))
        ));
    }
}
