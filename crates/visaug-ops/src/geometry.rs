//! Coordinate math for geometric transforms.
//!
//! Everything here is pure: no pixels are touched. The matrices produced map
//! *output* pixel coordinates to *input* pixel coordinates (inverse mapping),
//! ready for the [`resample`](crate::resample) module.
//!
//! # Coordinate conventions
//!
//! - Pixel `(x, y)` has its centre at integer coordinates; the image covers
//!   `[-0.5, w - 0.5) x [-0.5, h - 0.5)`.
//! - Affine parameters are expressed around the image centre: a `center` of
//!   `[0, 0]` is the middle of the image.
//!
//! # Example
//!
//! ```rust
//! use visaug_ops::geometry::{affine_matrix, AffineParams};
//!
//! // Clockwise quarter turn of a 4x4 image: the bottom-left pixel lands top-left.
//! let m = affine_matrix(&AffineParams::rotation(90.0), None, (4, 4), (4, 4));
//! let (x, y) = m.apply(0.0, 0.0);
//! assert!(x.abs() < 1e-9 && (y - 3.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;
use visaug_core::{Error, Rect, Result};

/// 3x3 homogeneous matrix mapping output pixels to input pixels.
///
/// Affine maps keep `[0, 0, 1]` as the last row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    m: [f64; 9],
}

impl AffineMatrix {
    /// Identity map.
    pub const IDENTITY: AffineMatrix = AffineMatrix { m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] };

    /// Affine map from the 2x3 coefficients `[a, b, c, d, e, f]`.
    pub const fn from_affine(c: [f64; 6]) -> Self {
        Self { m: [c[0], c[1], c[2], c[3], c[4], c[5], 0.0, 0.0, 1.0] }
    }

    /// Projective map from the 8 homography coefficients.
    pub const fn from_homography(c: [f64; 8]) -> Self {
        Self { m: [c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], 1.0] }
    }

    /// Row-major coefficients.
    pub fn coefficients(&self) -> [f64; 9] {
        self.m
    }

    /// Whether the last row is `[0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        self.m[6] == 0.0 && self.m[7] == 0.0 && self.m[8] == 1.0
    }

    /// Maps `(x, y)` through the matrix.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        ((m[0] * x + m[1] * y + m[2]) / w, (m[3] * x + m[4] * y + m[5]) / w)
    }

    /// `self` after `other`: `(self * other)(p) = self(other(p))`.
    pub fn compose(&self, other: &AffineMatrix) -> AffineMatrix {
        let a = &self.m;
        let b = &other.m;
        let mut m = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                m[r * 3 + c] = (0..3).map(|k| a[r * 3 + k] * b[k * 3 + c]).sum();
            }
        }
        AffineMatrix { m }
    }

    /// Pure translation.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::from_affine([1.0, 0.0, tx, 0.0, 1.0, ty])
    }
}

/// Human parameters of an affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineParams {
    /// Rotation in degrees, clockwise.
    pub angle: f64,
    /// Post-rotation translation in pixels `(tx, ty)`.
    pub translate: [f64; 2],
    /// Isotropic scale, must be positive.
    pub scale: f64,
    /// Shear in degrees `(sx, sy)`.
    pub shear: [f64; 2],
}

impl Default for AffineParams {
    fn default() -> Self {
        Self { angle: 0.0, translate: [0.0, 0.0], scale: 1.0, shear: [0.0, 0.0] }
    }
}

impl AffineParams {
    /// Pure rotation.
    pub fn rotation(angle: f64) -> Self {
        Self { angle, ..Self::default() }
    }

    /// Rejects non-positive or non-finite scale.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "affine scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Inverse affine matrix in centred coordinates.
///
/// Builds `M = T(center) * T(translate) * R(angle) * Sh(shear) * S(scale) * T(-center)`
/// and returns its inverse as 2x3 coefficients. `center` is relative to the
/// image centre.
pub fn inverse_affine_coefficients(center: [f64; 2], params: &AffineParams) -> [f64; 6] {
    let rot = params.angle.to_radians();
    let sx = params.shear[0].to_radians();
    let sy = params.shear[1].to_radians();
    let [cx, cy] = center;
    let [tx, ty] = params.translate;

    // RSS without scaling
    let a = (rot - sy).cos() / sy.cos();
    let b = -(rot - sy).cos() * sx.tan() / sy.cos() - rot.sin();
    let c = (rot - sy).sin() / sy.cos();
    let d = -(rot - sy).sin() * sx.tan() / sy.cos() + rot.cos();

    let mut m = [d, -b, 0.0, -c, a, 0.0].map(|v| v / params.scale);
    m[2] += m[0] * (-cx - tx) + m[1] * (-cy - ty);
    m[5] += m[3] * (-cx - tx) + m[4] * (-cy - ty);
    m[2] += cx;
    m[5] += cy;
    m
}

/// Inverse affine map in pixel-index space.
///
/// # Arguments
///
/// * `params` - angle, translation, scale and shear
/// * `center` - rotation centre in pixel coordinates; `None` is the image centre
/// * `input` - input `(height, width)`
/// * `output` - output `(height, width)`; differs from `input` when a rotation
///   canvas is expanded
pub fn affine_matrix(
    params: &AffineParams,
    center: Option<[f64; 2]>,
    input: (usize, usize),
    output: (usize, usize),
) -> AffineMatrix {
    let (h, w) = (input.0 as f64, input.1 as f64);
    let (oh, ow) = (output.0 as f64, output.1 as f64);
    let center_f = centred_pivot(center, input);
    let inner = AffineMatrix::from_affine(inverse_affine_coefficients(center_f, params));
    trace!(?params, ?center_f, "affine_matrix");

    // output index -> centred output coords -> centred input coords -> input index
    let to_centred = AffineMatrix::translation(0.5 - ow * 0.5, 0.5 - oh * 0.5);
    let to_index = AffineMatrix::translation((w - 1.0) * 0.5, (h - 1.0) * 0.5);
    to_index.compose(&inner).compose(&to_centred)
}

/// Pivot in pixel coordinates to coordinates relative to the image centre.
fn centred_pivot(center: Option<[f64; 2]>, input: (usize, usize)) -> [f64; 2] {
    match center {
        Some([x, y]) => [x - input.1 as f64 * 0.5, y - input.0 as f64 * 0.5],
        None => [0.0, 0.0],
    }
}

/// Homography mapping `dst_corners` onto `src_corners`.
///
/// Content found at `src_corners` in the input appears at `dst_corners` in
/// the output; the returned matrix is the inverse map used for sampling,
/// in pixel-index space.
///
/// # Errors
///
/// [`Error::SingularTransform`] if the corners do not determine a unique
/// homography (for example when three of them are collinear).
pub fn perspective_matrix(src_corners: &[[f64; 2]; 4], dst_corners: &[[f64; 2]; 4]) -> Result<AffineMatrix> {
    let coeffs = perspective_coefficients(src_corners, dst_corners)?;
    // coefficients act on pixel centres offset by half a pixel
    let shift_in = AffineMatrix::translation(0.5, 0.5);
    let shift_out = AffineMatrix::translation(-0.5, -0.5);
    Ok(shift_out.compose(&AffineMatrix::from_homography(coeffs)).compose(&shift_in))
}

/// The 8 homography coefficients taking `dst` points to `src` points.
pub fn perspective_coefficients(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Result<[f64; 8]> {
    let mut a = [[0.0f64; 9]; 8];
    for (i, (p, q)) in dst.iter().zip(src.iter()).enumerate() {
        a[2 * i] = [p[0], p[1], 1.0, 0.0, 0.0, 0.0, -q[0] * p[0], -q[0] * p[1], q[0]];
        a[2 * i + 1] = [0.0, 0.0, 0.0, p[0], p[1], 1.0, -q[1] * p[0], -q[1] * p[1], q[1]];
    }
    solve8(a).ok_or_else(|| {
        Error::SingularTransform(format!(
            "corners {dst:?} -> {src:?} do not define a homography"
        ))
    })
}

/// Gaussian elimination with partial pivoting on an augmented 8x9 system.
fn solve8(mut a: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    let scale = a.iter().flatten().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);
    let eps = 1e-10 * scale;

    for col in 0..8 {
        let pivot = (col..8).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < eps {
            return None;
        }
        a.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = [0.0; 8];
    for (i, xi) in x.iter_mut().enumerate() {
        *xi = a[i][8] / a[i][i];
    }
    if x.iter().all(|v| v.is_finite()) { Some(x) } else { None }
}

/// Output canvas for a rotation by `angle` degrees.
///
/// Returns `(height, width)`: the input size when `expand` is false,
/// otherwise the bounding box of the rotated image (corners snapped with a
/// `1e-4` tolerance before rounding outwards).
pub fn rotated_output_size(input: (usize, usize), angle: f64, expand: bool) -> (usize, usize) {
    rotated_output_size_about(input, angle, expand, None)
}

/// [`rotated_output_size`] for a rotation about `center` in pixel coordinates.
///
/// The box is measured in the same sampling map as the warp, so an
/// off-centre pivot can move the outward rounding by a pixel.
pub fn rotated_output_size_about(
    input: (usize, usize),
    angle: f64,
    expand: bool,
    center: Option<[f64; 2]>,
) -> (usize, usize) {
    if !expand {
        return input;
    }
    let (h, w) = (input.0 as f64, input.1 as f64);
    let m = inverse_affine_coefficients(centred_pivot(center, input), &AffineParams::rotation(-angle));
    let corners = [[-0.5 * w, -0.5 * h], [-0.5 * w, 0.5 * h], [0.5 * w, 0.5 * h], [0.5 * w, -0.5 * h]];

    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for [x, y] in corners {
        let p = [m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5]];
        for k in 0..2 {
            min[k] = min[k].min(p[k]);
            max[k] = max[k].max(p[k]);
        }
    }

    const TOL: f64 = 1e-4;
    let size: Vec<usize> = (0..2)
        .map(|k| {
            let hi = ((max[k] / TOL).trunc() * TOL).ceil();
            let lo = ((min[k] / TOL).trunc() * TOL).floor();
            (hi - lo).max(1.0) as usize
        })
        .collect();
    (size[1], size[0])
}

/// Rectangle for a crop request; no bounds validation.
pub fn crop_rect(_image_size: (usize, usize), top: i64, left: i64, height: i64, width: i64) -> Rect {
    Rect::new(top, left, height, width)
}

/// Per-side padding `(left, top, right, bottom)`.
///
/// Accepts one value (all sides), two values (`left/right`, `top/bottom`)
/// or four values (`left, top, right, bottom`).
///
/// # Errors
///
/// [`Error::InvalidArgument`] for any other length.
pub fn pad_amounts(padding: &[i64]) -> Result<[i64; 4]> {
    match *padding {
        [p] => Ok([p, p, p, p]),
        [lr, tb] => Ok([lr, tb, lr, tb]),
        [l, t, r, b] => Ok([l, t, r, b]),
        _ => Err(Error::InvalidArgument(format!(
            "padding must have 1, 2 or 4 values, got {}",
            padding.len()
        ))),
    }
}

/// Random-perspective corner endpoints for a `width x height` image.
///
/// `draw(low, high)` returns an integer in `[low, high)`. Corners are drawn
/// top-left, top-right, bottom-right, bottom-left; x before y.
pub fn perspective_endpoints<F>(width: usize, height: usize, distortion: f64, mut draw: F) -> ([[f64; 2]; 4], [[f64; 2]; 4])
where
    F: FnMut(i64, i64) -> i64,
{
    let (w, h) = (width as i64, height as i64);
    let dw = (distortion * (w / 2) as f64) as i64;
    let dh = (distortion * (h / 2) as f64) as i64;

    let tl = [draw(0, dw + 1), draw(0, dh + 1)];
    let tr = [draw(w - dw - 1, w), draw(0, dh + 1)];
    let br = [draw(w - dw - 1, w), draw(h - dh - 1, h)];
    let bl = [draw(0, dw + 1), draw(h - dh - 1, h)];

    let start = [[0.0, 0.0], [(w - 1) as f64, 0.0], [(w - 1) as f64, (h - 1) as f64], [0.0, (h - 1) as f64]];
    let end = [tl, tr, br, bl].map(|[x, y]| [x as f64, y as f64]);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_affine() {
        let m = affine_matrix(&AffineParams::default(), None, (5, 7), (5, 7));
        for (x, y) in [(0.0, 0.0), (6.0, 4.0), (3.0, 2.0)] {
            let (sx, sy) = m.apply(x, y);
            assert_abs_diff_eq!(sx, x, epsilon = 1e-12);
            assert_abs_diff_eq!(sy, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_translation_is_inverse() {
        let params = AffineParams { translate: [2.0, -1.0], ..AffineParams::default() };
        let m = affine_matrix(&params, None, (8, 8), (8, 8));
        let (sx, sy) = m.apply(5.0, 5.0);
        assert_abs_diff_eq!(sx, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sy, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_about_center() {
        let params = AffineParams { scale: 2.0, ..AffineParams::default() };
        let m = affine_matrix(&params, None, (4, 4), (4, 4));
        // the centre (1.5, 1.5) is fixed
        let (sx, sy) = m.apply(1.5, 1.5);
        assert_abs_diff_eq!(sx, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(sy, 1.5, epsilon = 1e-12);
        let (sx, _) = m.apply(3.5, 1.5);
        assert_abs_diff_eq!(sx, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rotated_output_size() {
        assert_eq!(rotated_output_size((10, 20), 45.0, false), (10, 20));
        assert_eq!(rotated_output_size((10, 20), 90.0, true), (20, 10));
        assert_eq!(rotated_output_size((10, 20), 180.0, true), (10, 20));
        let (h, w) = rotated_output_size((10, 10), 45.0, true);
        assert_eq!((h, w), (16, 16));
    }

    #[test]
    fn test_rotated_output_size_about_pivot() {
        assert_eq!(rotated_output_size_about((10, 20), 30.0, false, Some([0.0, 0.0])), (10, 20));
        // the image centre as an explicit pivot is the default
        assert_eq!(
            rotated_output_size_about((10, 20), 30.0, true, Some([10.0, 5.0])),
            rotated_output_size((10, 20), 30.0, true)
        );
        let (h, w) = rotated_output_size_about((10, 10), 45.0, true, Some([0.0, 0.0]));
        assert!((15..=17).contains(&h) && (15..=17).contains(&w), "{h}x{w}");
    }

    #[test]
    fn test_pad_amounts() {
        assert_eq!(pad_amounts(&[2]).unwrap(), [2, 2, 2, 2]);
        assert_eq!(pad_amounts(&[1, 3]).unwrap(), [1, 3, 1, 3]);
        assert_eq!(pad_amounts(&[1, 2, 3, 4]).unwrap(), [1, 2, 3, 4]);
        assert!(matches!(pad_amounts(&[1, 2, 3]), Err(Error::InvalidArgument(_))));
        assert!(pad_amounts(&[]).is_err());
    }

    #[test]
    fn test_crop_rect_outside_image() {
        let r = crop_rect((10, 10), -4, 8, 6, 5);
        assert_eq!((r.top, r.left, r.height, r.width), (-4, 8, 6, 5));
    }

    #[test]
    fn test_perspective_identity() {
        let corners = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let m = perspective_matrix(&corners, &corners).unwrap();
        let (x, y) = m.apply(4.0, 7.0);
        assert_abs_diff_eq!(x, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perspective_maps_corners() {
        let src = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let dst = [[1.0, 2.0], [8.0, 0.0], [9.0, 9.0], [0.0, 7.0]];
        let c = perspective_coefficients(&src, &dst).unwrap();
        let h = AffineMatrix::from_homography(c);
        for (p, q) in dst.iter().zip(src.iter()) {
            let (x, y) = h.apply(p[0], p[1]);
            assert_abs_diff_eq!(x, q[0], epsilon = 1e-9);
            assert_abs_diff_eq!(y, q[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_perspective_singular() {
        let src = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let collinear = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert!(matches!(
            perspective_matrix(&src, &collinear),
            Err(Error::SingularTransform(_))
        ));
    }

    #[test]
    fn test_perspective_endpoints_bounds() {
        let mut calls = Vec::new();
        let (start, end) = perspective_endpoints(10, 8, 0.5, |lo, hi| {
            calls.push((lo, hi));
            lo
        });
        assert_eq!(start[2], [9.0, 7.0]);
        assert_eq!(calls[0], (0, 3));
        assert_eq!(calls[2], (7, 10));
        assert_eq!(end[1], [7.0, 0.0]);
        assert_eq!(calls.len(), 8);
    }
}
