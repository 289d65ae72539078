//! AutoAugment: learned policies of paired operations.
//!
//! Each policy is 25 sub-policies of two steps `(operation, probability,
//! magnitude bin)`. Per image the draws are: the sub-policy index, two gate
//! values, then two sign bits. A step runs when its gate value is at most
//! its probability; a signed magnitude is negated when its sign bit is 0.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use visaug_core::{Fill, Image};
use visaug_ops::functional as F;
use visaug_ops::{AffineParams, Interpolation};

use crate::batch::BatchPolicy;
use crate::error::TransformResult;
use crate::random::RandomState;
use crate::transform::Augment;

/// Number of magnitude bins.
pub const NUM_BINS: usize = 10;

/// Operations of the augmentation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentOp {
    /// Horizontal shear.
    ShearX,
    /// Vertical shear.
    ShearY,
    /// Horizontal translation.
    TranslateX,
    /// Vertical translation.
    TranslateY,
    /// Rotation.
    Rotate,
    /// Brightness blend.
    Brightness,
    /// Saturation blend.
    Color,
    /// Contrast blend.
    Contrast,
    /// Sharpness blend.
    Sharpness,
    /// Bit reduction.
    Posterize,
    /// Inversion above a threshold.
    Solarize,
    /// Range stretch.
    AutoContrast,
    /// Histogram equalization.
    Equalize,
    /// Inversion.
    Invert,
}

impl AugmentOp {
    /// Magnitude of bin `bin` for an `height x width` image, and whether
    /// the magnitude takes a random sign.
    pub fn magnitude(self, bin: usize, height: usize, width: usize) -> (f64, bool) {
        let linspace = |hi: f64| hi * bin as f64 / (NUM_BINS - 1) as f64;
        match self {
            Self::ShearX | Self::ShearY => (linspace(0.3), true),
            Self::TranslateX => (linspace(150.0 / 331.0 * width as f64), true),
            Self::TranslateY => (linspace(150.0 / 331.0 * height as f64), true),
            Self::Rotate => (linspace(30.0), true),
            Self::Brightness | Self::Color | Self::Contrast | Self::Sharpness => (linspace(0.9), true),
            Self::Posterize => {
                let step = (bin as f64 / ((NUM_BINS - 1) as f64 / 4.0)).round_ties_even();
                (8.0 - step, false)
            }
            Self::Solarize => (1.0 - linspace(1.0), false),
            Self::AutoContrast | Self::Equalize | Self::Invert => (0.0, false),
        }
    }

    /// Runs the operation with an already signed magnitude.
    pub fn apply(self, img: &Image, magnitude: f64, interpolation: Interpolation, fill: &Fill) -> visaug_core::Result<Image> {
        let shear = |shear: [f64; 2]| AffineParams { shear, ..AffineParams::default() };
        let translate = |translate: [f64; 2]| AffineParams { translate, ..AffineParams::default() };
        match self {
            Self::ShearX => {
                F::affine(img, &shear([magnitude.atan().to_degrees(), 0.0]), interpolation, fill, Some([0.0, 0.0]))
            }
            Self::ShearY => {
                F::affine(img, &shear([0.0, magnitude.atan().to_degrees()]), interpolation, fill, Some([0.0, 0.0]))
            }
            Self::TranslateX => F::affine(img, &translate([magnitude.trunc(), 0.0]), interpolation, fill, None),
            Self::TranslateY => F::affine(img, &translate([0.0, magnitude.trunc()]), interpolation, fill, None),
            Self::Rotate => F::rotate(img, magnitude, interpolation, false, None, fill),
            Self::Brightness => F::adjust_brightness(img, 1.0 + magnitude),
            Self::Color => F::adjust_saturation(img, 1.0 + magnitude),
            Self::Contrast => F::adjust_contrast(img, 1.0 + magnitude),
            Self::Sharpness => F::adjust_sharpness(img, 1.0 + magnitude),
            Self::Posterize => F::posterize(img, magnitude as u8),
            Self::Solarize => F::solarize(img, img.dtype().max_value() * magnitude),
            Self::AutoContrast => F::autocontrast(img),
            Self::Equalize => F::equalize(img),
            Self::Invert => F::invert(img),
        }
    }
}

/// One step of a sub-policy: operation, probability and magnitude bin.
pub type Step = (AugmentOp, f64, Option<usize>);

/// Two steps applied in order.
pub type SubPolicy = [Step; 2];

use AugmentOp::*;

const IMAGENET: [SubPolicy; 25] = [
    [(Posterize, 0.4, Some(8)), (Rotate, 0.6, Some(9))],
    [(Solarize, 0.6, Some(5)), (AutoContrast, 0.6, None)],
    [(Equalize, 0.8, None), (Equalize, 0.6, None)],
    [(Posterize, 0.6, Some(7)), (Posterize, 0.6, Some(6))],
    [(Equalize, 0.4, None), (Solarize, 0.2, Some(4))],
    [(Equalize, 0.4, None), (Rotate, 0.8, Some(8))],
    [(Solarize, 0.6, Some(3)), (Equalize, 0.6, None)],
    [(Posterize, 0.8, Some(5)), (Equalize, 1.0, None)],
    [(Rotate, 0.2, Some(3)), (Solarize, 0.6, Some(8))],
    [(Equalize, 0.6, None), (Posterize, 0.4, Some(6))],
    [(Rotate, 0.8, Some(8)), (Color, 0.4, Some(0))],
    [(Rotate, 0.4, Some(9)), (Equalize, 0.6, None)],
    [(Equalize, 0.0, None), (Equalize, 0.8, None)],
    [(Invert, 0.6, None), (Equalize, 1.0, None)],
    [(Color, 0.6, Some(4)), (Contrast, 1.0, Some(8))],
    [(Rotate, 0.8, Some(8)), (Color, 1.0, Some(2))],
    [(Color, 0.8, Some(8)), (Solarize, 0.8, Some(7))],
    [(Sharpness, 0.4, Some(7)), (Invert, 0.6, None)],
    [(ShearX, 0.6, Some(5)), (Equalize, 1.0, None)],
    [(Color, 0.4, Some(0)), (Equalize, 0.6, None)],
    [(Equalize, 0.4, None), (Solarize, 0.2, Some(4))],
    [(Solarize, 0.6, Some(5)), (AutoContrast, 0.6, None)],
    [(Invert, 0.6, None), (Equalize, 1.0, None)],
    [(Color, 0.6, Some(4)), (Contrast, 1.0, Some(8))],
    [(Equalize, 0.8, None), (Equalize, 0.6, None)],
];

const CIFAR10: [SubPolicy; 25] = [
    [(Invert, 0.1, None), (Contrast, 0.2, Some(6))],
    [(Rotate, 0.7, Some(2)), (TranslateX, 0.3, Some(9))],
    [(Sharpness, 0.8, Some(1)), (Sharpness, 0.9, Some(3))],
    [(ShearY, 0.5, Some(8)), (TranslateY, 0.7, Some(9))],
    [(AutoContrast, 0.5, None), (Equalize, 0.9, None)],
    [(ShearY, 0.2, Some(7)), (Posterize, 0.3, Some(7))],
    [(Color, 0.4, Some(3)), (Brightness, 0.6, Some(7))],
    [(Sharpness, 0.3, Some(9)), (Brightness, 0.7, Some(9))],
    [(Equalize, 0.6, None), (Equalize, 0.5, None)],
    [(Contrast, 0.6, Some(7)), (Sharpness, 0.6, Some(5))],
    [(Color, 0.7, Some(7)), (TranslateX, 0.5, Some(8))],
    [(Equalize, 0.3, None), (AutoContrast, 0.4, None)],
    [(TranslateY, 0.4, Some(3)), (Sharpness, 0.2, Some(6))],
    [(Brightness, 0.9, Some(6)), (Color, 0.2, Some(8))],
    [(Solarize, 0.5, Some(2)), (Invert, 0.0, None)],
    [(Equalize, 0.2, None), (AutoContrast, 0.6, None)],
    [(Equalize, 0.2, None), (Equalize, 0.6, None)],
    [(Color, 0.9, Some(9)), (Equalize, 0.6, None)],
    [(AutoContrast, 0.8, None), (Solarize, 0.2, Some(8))],
    [(Brightness, 0.1, Some(3)), (Color, 0.7, Some(0))],
    [(Solarize, 0.4, Some(5)), (AutoContrast, 0.9, None)],
    [(TranslateY, 0.9, Some(9)), (TranslateY, 0.7, Some(9))],
    [(AutoContrast, 0.9, None), (Solarize, 0.8, Some(3))],
    [(Equalize, 0.8, None), (Invert, 0.1, None)],
    [(TranslateY, 0.7, Some(9)), (AutoContrast, 0.9, None)],
];

const SVHN: [SubPolicy; 25] = [
    [(ShearX, 0.9, Some(4)), (Invert, 0.2, None)],
    [(ShearY, 0.9, Some(8)), (Invert, 0.7, None)],
    [(Equalize, 0.6, None), (Solarize, 0.6, Some(6))],
    [(Invert, 0.9, None), (Equalize, 0.6, None)],
    [(Equalize, 0.6, None), (Rotate, 0.9, Some(3))],
    [(ShearX, 0.9, Some(4)), (AutoContrast, 0.8, None)],
    [(ShearY, 0.9, Some(8)), (Invert, 0.4, None)],
    [(ShearY, 0.9, Some(5)), (Solarize, 0.2, Some(6))],
    [(Invert, 0.9, None), (AutoContrast, 0.8, None)],
    [(Equalize, 0.6, None), (Rotate, 0.9, Some(3))],
    [(ShearX, 0.9, Some(4)), (Solarize, 0.3, Some(3))],
    [(ShearY, 0.8, Some(8)), (Invert, 0.7, None)],
    [(Equalize, 0.9, None), (TranslateY, 0.6, Some(6))],
    [(Invert, 0.9, None), (Equalize, 0.6, None)],
    [(Contrast, 0.3, Some(3)), (Rotate, 0.8, Some(4))],
    [(Invert, 0.8, None), (TranslateY, 0.0, Some(2))],
    [(ShearY, 0.7, Some(6)), (Solarize, 0.4, Some(8))],
    [(Invert, 0.6, None), (Rotate, 0.8, Some(4))],
    [(ShearY, 0.3, Some(7)), (TranslateX, 0.9, Some(3))],
    [(ShearX, 0.1, Some(6)), (Invert, 0.6, None)],
    [(Solarize, 0.7, Some(2)), (TranslateY, 0.6, Some(7))],
    [(ShearY, 0.8, Some(4)), (Invert, 0.8, None)],
    [(ShearX, 0.7, Some(9)), (TranslateY, 0.8, Some(3))],
    [(ShearY, 0.8, Some(5)), (AutoContrast, 0.7, None)],
    [(ShearX, 0.7, Some(2)), (Invert, 0.1, None)],
];

/// Dataset the policy was learned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoAugmentPolicy {
    /// ImageNet policy.
    #[default]
    Imagenet,
    /// CIFAR-10 policy.
    Cifar10,
    /// SVHN policy.
    Svhn,
}

impl AutoAugmentPolicy {
    /// The sub-policy table.
    pub fn sub_policies(self) -> &'static [SubPolicy] {
        match self {
            Self::Imagenet => &IMAGENET,
            Self::Cifar10 => &CIFAR10,
            Self::Svhn => &SVHN,
        }
    }
}

impl fmt::Display for AutoAugmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Imagenet => "imagenet",
            Self::Cifar10 => "cifar10",
            Self::Svhn => "svhn",
        };
        f.write_str(name)
    }
}

/// Applies one randomly chosen sub-policy per image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoAugment {
    /// Policy table.
    #[serde(default)]
    pub policy: AutoAugmentPolicy,
    /// Sampling kernel of the geometric steps.
    #[serde(default = "nearest")]
    pub interpolation: Interpolation,
    /// Value for pixels uncovered by geometric steps.
    #[serde(default)]
    pub fill: Fill,
}

fn nearest() -> Interpolation {
    Interpolation::Nearest
}

/// Drawn sub-policy index, gate values and sign bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDraw {
    /// Index into the policy table.
    pub index: usize,
    /// One gate value per step.
    pub probs: [f64; 2],
    /// One sign bit per step.
    pub signs: [i64; 2],
}

impl AutoAugment {
    /// Policy with nearest sampling and zero fill.
    pub fn new(policy: AutoAugmentPolicy) -> Self {
        Self { policy, interpolation: nearest(), fill: Fill::default() }
    }

    /// Draws which sub-policy runs and how.
    pub fn get_params(&self, rs: &mut RandomState) -> PolicyDraw {
        let n = self.policy.sub_policies().len() as i64;
        let index = rs.randint(0, n) as usize;
        let probs = [rs.rand(), rs.rand()];
        let signs = [rs.randint(0, 2), rs.randint(0, 2)];
        PolicyDraw { index, probs, signs }
    }
}

impl Augment for AutoAugment {
    fn name(&self) -> &'static str {
        "AutoAugment"
    }

    fn validate(&self) -> TransformResult<()> {
        Ok(())
    }

    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::PerElement
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let draw = self.get_params(rs);
        let sub_policy = &self.policy.sub_policies()[draw.index];
        debug!(policy = %self.policy, index = draw.index, "AutoAugment");

        let (height, width) = (img.height(), img.width());
        let mut out = img.clone();
        for (i, &(op, p, bin)) in sub_policy.iter().enumerate() {
            if draw.probs[i] > p {
                continue;
            }
            let magnitude = match bin {
                Some(bin) => {
                    let (m, signed) = op.magnitude(bin, height, width);
                    if signed && draw.signs[i] == 0 { -m } else { m }
                }
                None => 0.0,
            };
            out = op.apply(&out, magnitude, self.interpolation, &self.fill)?;
        }
        Ok(out)
    }
}
