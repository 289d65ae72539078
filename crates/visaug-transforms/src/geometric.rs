//! Geometric transforms: resize, crops, padding, flips and warps.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use visaug_core::{Fill, Image, Rect};
use visaug_ops::functional as F;
use visaug_ops::geometry::{pad_amounts, perspective_endpoints};
use visaug_ops::{AffineParams, Interpolation, PaddingMode};

use crate::error::{invalid, TransformResult};
use crate::params::{check_probability, default_p, ordered, ParamSpec, Size};
use crate::random::RandomState;
use crate::transform::{gated, Augment};

/// Resize to a shorter edge (single `size`) or an exact `[h, w]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resize {
    /// Target size.
    pub size: Size,
    /// Sampling kernel.
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Cap on the longer edge; only valid with a single `size`.
    #[serde(default)]
    pub max_size: Option<usize>,
}

impl Resize {
    /// Bilinear resize without a cap.
    pub fn new(size: Size) -> Self {
        Self { size, interpolation: Interpolation::default(), max_size: None }
    }
}

impl Augment for Resize {
    fn name(&self) -> &'static str {
        "Resize"
    }

    fn validate(&self) -> TransformResult<()> {
        self.size.validate("size")
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::resize(img, &self.size.to_vec(), self.interpolation, self.max_size)?)
    }
}

/// Deterministic centre crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterCrop {
    /// Crop size.
    pub size: Size,
}

impl Augment for CenterCrop {
    fn name(&self) -> &'static str {
        "CenterCrop"
    }

    fn validate(&self) -> TransformResult<()> {
        self.size.validate("size")
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::center_crop(img, self.size.hw())?)
    }
}

/// Crop at a uniformly drawn position, after optional padding.
///
/// Draws the row offset, then the column offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomCrop {
    /// Crop size.
    pub size: Size,
    /// Padding applied before cropping (1, 2 or 4 values).
    #[serde(default)]
    pub padding: Option<Vec<i64>>,
    /// Pads each too-small dimension by its shortfall on both sides.
    #[serde(default)]
    pub pad_if_needed: bool,
    /// Constant for `constant` padding.
    #[serde(default)]
    pub fill: Fill,
    /// Border policy.
    #[serde(default)]
    pub padding_mode: PaddingMode,
}

impl RandomCrop {
    /// Crop without padding.
    pub fn new(size: Size) -> Self {
        Self { size, padding: None, pad_if_needed: false, fill: Fill::default(), padding_mode: PaddingMode::default() }
    }
}

impl Augment for RandomCrop {
    fn name(&self) -> &'static str {
        "RandomCrop"
    }

    fn validate(&self) -> TransformResult<()> {
        self.size.validate("size")?;
        if let Some(padding) = &self.padding {
            pad_amounts(padding)?;
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let (th, tw) = self.size.hw();
        let mut img = Cow::Borrowed(img);
        if let Some(padding) = &self.padding {
            img = Cow::Owned(F::pad(&img, padding, &self.fill, self.padding_mode)?);
        }
        if self.pad_if_needed && img.width() < tw {
            let amount = (tw - img.width()) as i64;
            img = Cow::Owned(F::pad(&img, &[amount, 0], &self.fill, self.padding_mode)?);
        }
        if self.pad_if_needed && img.height() < th {
            let amount = (th - img.height()) as i64;
            img = Cow::Owned(F::pad(&img, &[0, amount], &self.fill, self.padding_mode)?);
        }

        let (h, w) = (img.height(), img.width());
        if h < th || w < tw {
            return Err(invalid(format!(
                "required crop size {th}x{tw} is larger than input image size {h}x{w}"
            )));
        }
        if h == th && w == tw {
            return Ok(img.into_owned());
        }
        let i = rs.randint(0, (h - th + 1) as i64);
        let j = rs.randint(0, (w - tw + 1) as i64);
        debug!(i, j, "RandomCrop offset");
        Ok(F::crop(&img, i, j, th as i64, tw as i64)?)
    }
}

/// Crop of random area and aspect ratio, resized to `size`.
///
/// Each of up to 10 attempts draws the area fraction from `scale`, then the
/// log aspect ratio from `ratio`; a fitting window then draws its row and
/// column. When no attempt fits, a centred crop clamped to `ratio` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomResizedCrop {
    /// Output size.
    pub size: Size,
    /// Range of the crop area relative to the image.
    #[serde(default = "default_scale")]
    pub scale: [f64; 2],
    /// Range of the crop aspect ratio (width / height).
    #[serde(default = "default_ratio")]
    pub ratio: [f64; 2],
    /// Sampling kernel.
    #[serde(default)]
    pub interpolation: Interpolation,
}

fn default_scale() -> [f64; 2] {
    [0.08, 1.0]
}

fn default_ratio() -> [f64; 2] {
    [3.0 / 4.0, 4.0 / 3.0]
}

impl RandomResizedCrop {
    /// Crop with the default scale and ratio ranges.
    pub fn new(size: Size) -> Self {
        Self { size, scale: default_scale(), ratio: default_ratio(), interpolation: Interpolation::default() }
    }

    /// Draws the crop window for an `height x width` image.
    pub fn get_params(&self, height: usize, width: usize, rs: &mut RandomState) -> Rect {
        let (h_in, w_in) = (height as f64, width as f64);
        let area = h_in * w_in;
        let log_ratio = [self.ratio[0].ln(), self.ratio[1].ln()];

        for _ in 0..10 {
            let target_area = area * rs.uniform(self.scale[0], self.scale[1]);
            let aspect = rs.uniform(log_ratio[0], log_ratio[1]).exp();
            let w = (target_area * aspect).sqrt().round_ties_even();
            let h = (target_area / aspect).sqrt().round_ties_even();
            if 0.0 < w && w <= w_in && 0.0 < h && h <= h_in {
                let (h, w) = (h as i64, w as i64);
                let i = rs.randint(0, height as i64 - h + 1);
                let j = rs.randint(0, width as i64 - w + 1);
                return Rect::new(i, j, h, w);
            }
        }

        let in_ratio = w_in / h_in;
        let (lo, hi) = (self.ratio[0].min(self.ratio[1]), self.ratio[0].max(self.ratio[1]));
        let (h, w) = if in_ratio < lo {
            ((w_in / lo).round_ties_even() as i64, width as i64)
        } else if in_ratio > hi {
            (height as i64, (h_in * hi).round_ties_even() as i64)
        } else {
            (height as i64, width as i64)
        };
        debug!(h, w, "RandomResizedCrop fallback");
        Rect::new((height as i64 - h) / 2, (width as i64 - w) / 2, h, w)
    }
}

impl Augment for RandomResizedCrop {
    fn name(&self) -> &'static str {
        "RandomResizedCrop"
    }

    fn validate(&self) -> TransformResult<()> {
        self.size.validate("size")?;
        if self.scale[0] > self.scale[1] || self.ratio[0] > self.ratio[1] {
            warn!(scale = ?self.scale, ratio = ?self.ratio, "scale and ratio should be of kind (min, max)");
        }
        if !(self.scale.iter().all(|s| *s >= 0.0) && self.ratio.iter().all(|r| *r > 0.0)) {
            return Err(invalid(format!(
                "scale must be non-negative and ratio positive, got {:?} and {:?}",
                self.scale, self.ratio
            )));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let rect = self.get_params(img.height(), img.width(), rs);
        debug!(%rect, "RandomResizedCrop window");
        Ok(F::resized_crop(img, rect, self.size.hw(), self.interpolation)?)
    }
}

/// Padding on all sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// 1 (all sides), 2 (left/right, top/bottom) or 4 (left, top, right, bottom) amounts.
    pub padding: Vec<i64>,
    /// Constant for `constant` mode.
    #[serde(default)]
    pub fill: Fill,
    /// Border policy.
    #[serde(default)]
    pub padding_mode: PaddingMode,
}

impl Augment for Pad {
    fn name(&self) -> &'static str {
        "Pad"
    }

    fn validate(&self) -> TransformResult<()> {
        pad_amounts(&self.padding)?;
        Ok(())
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::pad(img, &self.padding, &self.fill, self.padding_mode)?)
    }
}

/// Left-right mirror with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomHorizontalFlip {
    /// Probability of flipping.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for RandomHorizontalFlip {
    fn default() -> Self {
        Self { p: default_p() }
    }
}

impl Augment for RandomHorizontalFlip {
    fn name(&self) -> &'static str {
        "RandomHorizontalFlip"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, F::hflip)
    }
}

/// Top-bottom mirror with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomVerticalFlip {
    /// Probability of flipping.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for RandomVerticalFlip {
    fn default() -> Self {
        Self { p: default_p() }
    }
}

impl Augment for RandomVerticalFlip {
    fn name(&self) -> &'static str {
        "RandomVerticalFlip"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, F::vflip)
    }
}

/// Counter-clockwise rotation by an angle drawn from `degrees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomRotation {
    /// Angle range in degrees; a single `d` means `[-d, d]`.
    pub degrees: ParamSpec,
    /// Sampling kernel.
    #[serde(default = "nearest")]
    pub interpolation: Interpolation,
    /// Grows the canvas to hold the whole rotated image.
    #[serde(default)]
    pub expand: bool,
    /// Rotation centre in pixels; defaults to the image centre.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    /// Value for uncovered pixels.
    #[serde(default)]
    pub fill: Fill,
}

fn nearest() -> Interpolation {
    Interpolation::Nearest
}

impl RandomRotation {
    /// Nearest-neighbour rotation within `degrees`.
    pub fn new(degrees: impl Into<ParamSpec>) -> Self {
        Self { degrees: degrees.into(), interpolation: nearest(), expand: false, center: None, fill: Fill::default() }
    }
}

impl Augment for RandomRotation {
    fn name(&self) -> &'static str {
        "RandomRotation"
    }

    fn validate(&self) -> TransformResult<()> {
        self.degrees.symmetric("degrees")?;
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let [lo, hi] = self.degrees.symmetric("degrees")?;
        let angle = rs.uniform(lo, hi);
        debug!(angle, "RandomRotation");
        Ok(F::rotate(img, angle, self.interpolation, self.expand, self.center, &self.fill)?)
    }
}

/// Shear option: a single `s` (x in `[-s, s]`) or 2 or 4 bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shear {
    /// Symmetric x shear.
    Fixed(f64),
    /// `[xmin, xmax]` or `[xmin, xmax, ymin, ymax]`.
    Bounds(Vec<f64>),
}

impl Shear {
    /// X range and optional y range.
    pub fn ranges(&self) -> TransformResult<([f64; 2], Option<[f64; 2]>)> {
        match self {
            Self::Fixed(s) if *s < 0.0 => {
                Err(invalid(format!("if shear is a single number, it must be non-negative, got {s}")))
            }
            Self::Fixed(s) => Ok(([-s, *s], None)),
            Self::Bounds(v) => match v.as_slice() {
                [s] => Self::Fixed(*s).ranges(),
                [a, b] => Ok((ordered("shear", [*a, *b])?, None)),
                [a, b, c, d] => Ok((ordered("shear", [*a, *b])?, Some(ordered("shear", [*c, *d])?))),
                _ => Err(invalid(format!("shear should have 1, 2 or 4 values, got {}", v.len()))),
            },
        }
    }
}

/// Random affine warp.
///
/// Draw order: angle, x translation, y translation (both rounded to whole
/// pixels), scale, x shear, y shear. Options left unset draw nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomAffine {
    /// Angle range in degrees; a single `d` means `[-d, d]`.
    pub degrees: ParamSpec,
    /// Maximum absolute translation as fractions of width and height.
    #[serde(default)]
    pub translate: Option<[f64; 2]>,
    /// Scale range.
    #[serde(default)]
    pub scale: Option<[f64; 2]>,
    /// Shear range in degrees.
    #[serde(default)]
    pub shear: Option<Shear>,
    /// Sampling kernel.
    #[serde(default = "nearest")]
    pub interpolation: Interpolation,
    /// Value for uncovered pixels.
    #[serde(default)]
    pub fill: Fill,
    /// Warp centre in pixels; defaults to the image centre.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
}

impl RandomAffine {
    /// Rotation-only affine within `degrees`.
    pub fn new(degrees: impl Into<ParamSpec>) -> Self {
        Self {
            degrees: degrees.into(),
            translate: None,
            scale: None,
            shear: None,
            interpolation: nearest(),
            fill: Fill::default(),
            center: None,
        }
    }

    /// Draws warp parameters for an `height x width` image.
    pub fn get_params(&self, height: usize, width: usize, rs: &mut RandomState) -> TransformResult<AffineParams> {
        let [lo, hi] = self.degrees.symmetric("degrees")?;
        let angle = rs.uniform(lo, hi);

        let translate = match self.translate {
            Some([fx, fy]) => {
                let max_dx = fx * width as f64;
                let max_dy = fy * height as f64;
                let tx = rs.uniform(-max_dx, max_dx).round_ties_even();
                let ty = rs.uniform(-max_dy, max_dy).round_ties_even();
                [tx, ty]
            }
            None => [0.0, 0.0],
        };

        let scale = match self.scale {
            Some([lo, hi]) => rs.uniform(lo, hi),
            None => 1.0,
        };

        let mut shear = [0.0, 0.0];
        if let Some(spec) = &self.shear {
            let (x, y) = spec.ranges()?;
            shear[0] = rs.uniform(x[0], x[1]);
            if let Some(y) = y {
                shear[1] = rs.uniform(y[0], y[1]);
            }
        }

        Ok(AffineParams { angle, translate, scale, shear })
    }
}

impl Augment for RandomAffine {
    fn name(&self) -> &'static str {
        "RandomAffine"
    }

    fn validate(&self) -> TransformResult<()> {
        self.degrees.symmetric("degrees")?;
        if let Some(t) = self.translate {
            if !t.iter().all(|v| (0.0..=1.0).contains(v)) {
                return Err(invalid(format!("translation values should be between 0 and 1, got {t:?}")));
            }
        }
        if let Some(s) = self.scale {
            ordered("scale", s)?;
            if s[0] <= 0.0 {
                return Err(invalid(format!("scale values should be positive, got {s:?}")));
            }
        }
        if let Some(shear) = &self.shear {
            shear.ranges()?;
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let params = self.get_params(img.height(), img.width(), rs)?;
        debug!(?params, "RandomAffine");
        Ok(F::affine(img, &params, self.interpolation, &self.fill, self.center)?)
    }
}

/// Perspective warp with probability `p`.
///
/// After the gate draw, each corner draws x then y, in the order top-left,
/// top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomPerspective {
    /// Corner displacement as a fraction of half the image size, in `[0, 1]`.
    #[serde(default = "default_p")]
    pub distortion_scale: f64,
    /// Probability of warping.
    #[serde(default = "default_p")]
    pub p: f64,
    /// Sampling kernel.
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Value for uncovered pixels.
    #[serde(default)]
    pub fill: Fill,
}

impl Default for RandomPerspective {
    fn default() -> Self {
        Self { distortion_scale: 0.5, p: 0.5, interpolation: Interpolation::default(), fill: Fill::default() }
    }
}

impl Augment for RandomPerspective {
    fn name(&self) -> &'static str {
        "RandomPerspective"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        if !(0.0..=1.0).contains(&self.distortion_scale) {
            return Err(invalid(format!(
                "distortion_scale should be between 0 and 1, got {}",
                self.distortion_scale
            )));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        if !(rs.rand() < self.p) {
            return Ok(img.clone());
        }
        let (start, end) = perspective_endpoints(img.width(), img.height(), self.distortion_scale, |lo, hi| {
            rs.randint(lo, hi)
        });
        debug!(?end, "RandomPerspective corners");
        Ok(F::perspective(img, &start, &end, self.interpolation, &self.fill)?)
    }
}
