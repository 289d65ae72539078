//! Photometric transforms: jitter, grayscale, blur and the gated colour ops.

use serde::{Deserialize, Serialize};
use tracing::debug;
use visaug_core::Image;
use visaug_ops::functional as F;

use crate::error::{invalid, TransformResult};
use crate::params::{check_probability, default_p, ParamSpec, Size};
use crate::random::RandomState;
use crate::transform::{gated, Augment};

/// Random brightness, contrast, saturation and hue, applied in random order.
///
/// A single value `v` means `[max(0, 1 - v), 1 + v]` for the first three
/// and `[-v, v]` for hue. A factor whose range collapses to its neutral
/// value (`[1, 1]`, or `[0, 0]` for hue) is disabled and draws nothing.
///
/// Draw order: a permutation of the four adjustments, then the enabled
/// factors in the order brightness, contrast, saturation, hue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorJitter {
    /// Brightness factor spec.
    #[serde(default)]
    pub brightness: Option<ParamSpec>,
    /// Contrast factor spec.
    #[serde(default)]
    pub contrast: Option<ParamSpec>,
    /// Saturation factor spec.
    #[serde(default)]
    pub saturation: Option<ParamSpec>,
    /// Hue shift spec, within `[-0.5, 0.5]`.
    #[serde(default)]
    pub hue: Option<ParamSpec>,
}

impl ColorJitter {
    /// Resolved `[min, max]` per adjustment; `None` when disabled.
    pub fn ranges(&self) -> TransformResult<[Option<[f64; 2]>; 4]> {
        let unbounded = [0.0, f64::INFINITY];
        let factor = |spec: &Option<ParamSpec>, name: &str| -> TransformResult<Option<[f64; 2]>> {
            match spec {
                Some(spec) => {
                    let r = spec.around(name, 1.0, unbounded, true)?;
                    Ok((r != [1.0, 1.0]).then_some(r))
                }
                None => Ok(None),
            }
        };
        let hue = match &self.hue {
            Some(spec) => {
                let r = spec.around("hue", 0.0, [-0.5, 0.5], false)?;
                (r != [0.0, 0.0]).then_some(r)
            }
            None => None,
        };
        Ok([
            factor(&self.brightness, "brightness")?,
            factor(&self.contrast, "contrast")?,
            factor(&self.saturation, "saturation")?,
            hue,
        ])
    }

    /// Draws the application order and the enabled factors.
    pub fn get_params(&self, rs: &mut RandomState) -> TransformResult<(Vec<usize>, [Option<f64>; 4])> {
        let ranges = self.ranges()?;
        let order = rs.randperm(4);
        let mut factors = [None; 4];
        for (slot, range) in factors.iter_mut().zip(ranges) {
            *slot = range.map(|[lo, hi]| rs.uniform(lo, hi));
        }
        Ok((order, factors))
    }
}

impl Augment for ColorJitter {
    fn name(&self) -> &'static str {
        "ColorJitter"
    }

    fn validate(&self) -> TransformResult<()> {
        self.ranges()?;
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let (order, factors) = self.get_params(rs)?;
        debug!(?order, ?factors, "ColorJitter");
        let mut out = img.clone();
        for idx in order {
            out = match (idx, factors[idx]) {
                (0, Some(f)) => F::adjust_brightness(&out, f)?,
                (1, Some(f)) => F::adjust_contrast(&out, f)?,
                (2, Some(f)) => F::adjust_saturation(&out, f)?,
                (3, Some(f)) => F::adjust_hue(&out, f)?,
                _ => continue,
            };
        }
        Ok(out)
    }
}

/// Luma conversion to 1 or 3 channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grayscale {
    /// 1 or 3.
    #[serde(default = "one")]
    pub num_output_channels: usize,
}

fn one() -> usize {
    1
}

impl Default for Grayscale {
    fn default() -> Self {
        Self { num_output_channels: 1 }
    }
}

impl Augment for Grayscale {
    fn name(&self) -> &'static str {
        "Grayscale"
    }

    fn validate(&self) -> TransformResult<()> {
        if !matches!(self.num_output_channels, 1 | 3) {
            return Err(invalid(format!(
                "num_output_channels should be either 1 or 3, got {}",
                self.num_output_channels
            )));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, _rs: &mut RandomState) -> TransformResult<Image> {
        Ok(F::rgb_to_grayscale(img, self.num_output_channels)?)
    }
}

/// Luma conversion with probability `p`, keeping 1 or 3 channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomGrayscale {
    /// Probability of converting.
    #[serde(default = "tenth")]
    pub p: f64,
}

fn tenth() -> f64 {
    0.1
}

impl Default for RandomGrayscale {
    fn default() -> Self {
        Self { p: tenth() }
    }
}

impl Augment for RandomGrayscale {
    fn name(&self) -> &'static str {
        "RandomGrayscale"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let channels = if img.channels() == 1 { 1 } else { 3 };
        gated(self.p, img, rs, |img| F::rgb_to_grayscale(img, channels))
    }
}

/// Gaussian blur with sigma drawn uniformly from `sigma`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBlur {
    /// Kernel size: one value or `[x, y]`, odd and positive.
    pub kernel_size: Size,
    /// Fixed sigma or `[min, max]` range.
    #[serde(default = "default_sigma")]
    pub sigma: ParamSpec,
}

fn default_sigma() -> ParamSpec {
    ParamSpec::Range([0.1, 2.0])
}

impl GaussianBlur {
    /// Blur with the default sigma range.
    pub fn new(kernel_size: Size) -> Self {
        Self { kernel_size, sigma: default_sigma() }
    }

    fn kernel(&self) -> [usize; 2] {
        let (kx, ky) = self.kernel_size.hw();
        [kx, ky]
    }
}

impl Augment for GaussianBlur {
    fn name(&self) -> &'static str {
        "GaussianBlur"
    }

    fn validate(&self) -> TransformResult<()> {
        for k in self.kernel() {
            if k == 0 || k % 2 == 0 {
                return Err(invalid(format!("kernel size value should be an odd and positive number, got {k}")));
            }
        }
        self.sigma.positive("sigma")?;
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let [lo, hi] = self.sigma.positive("sigma")?;
        let sigma = rs.uniform(lo, hi);
        debug!(sigma, "GaussianBlur");
        Ok(F::gaussian_blur(img, self.kernel(), Some([sigma, sigma]))?)
    }
}

/// Inversion with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomInvert {
    /// Probability of inverting.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for RandomInvert {
    fn default() -> Self {
        Self { p: default_p() }
    }
}

impl Augment for RandomInvert {
    fn name(&self) -> &'static str {
        "RandomInvert"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, F::invert)
    }
}

/// Posterize to `bits` with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomPosterize {
    /// Bits kept per sample, 1 to 8.
    pub bits: u8,
    /// Probability of posterizing.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Augment for RandomPosterize {
    fn name(&self) -> &'static str {
        "RandomPosterize"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        if !(1..=8).contains(&self.bits) {
            return Err(invalid(format!("bits should be in 1..=8, got {}", self.bits)));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, |img| F::posterize(img, self.bits))
    }
}

/// Solarize above `threshold` with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomSolarize {
    /// Samples at or above this value are inverted.
    pub threshold: f64,
    /// Probability of solarizing.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Augment for RandomSolarize {
    fn name(&self) -> &'static str {
        "RandomSolarize"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        if !(self.threshold >= 0.0) {
            return Err(invalid(format!("threshold should be non-negative, got {}", self.threshold)));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, |img| F::solarize(img, self.threshold))
    }
}

/// Sharpness adjustment by `sharpness_factor` with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomAdjustSharpness {
    /// Blend factor; 0 blurs, 1 is identity, 2 doubles the sharpness.
    pub sharpness_factor: f64,
    /// Probability of adjusting.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Augment for RandomAdjustSharpness {
    fn name(&self) -> &'static str {
        "RandomAdjustSharpness"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        if !(self.sharpness_factor >= 0.0) {
            return Err(invalid(format!(
                "sharpness factor should be non-negative, got {}",
                self.sharpness_factor
            )));
        }
        Ok(())
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, |img| F::adjust_sharpness(img, self.sharpness_factor))
    }
}

/// Autocontrast with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomAutocontrast {
    /// Probability of stretching.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for RandomAutocontrast {
    fn default() -> Self {
        Self { p: default_p() }
    }
}

impl Augment for RandomAutocontrast {
    fn name(&self) -> &'static str {
        "RandomAutocontrast"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, F::autocontrast)
    }
}

/// Histogram equalization with probability `p`; `u8` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEqualize {
    /// Probability of equalizing.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for RandomEqualize {
    fn default() -> Self {
        Self { p: default_p() }
    }
}

impl Augment for RandomEqualize {
    fn name(&self) -> &'static str {
        "RandomEqualize"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        gated(self.p, img, rs, F::equalize)
    }
}
