//! The tagged transform type.
//!
//! A [`Transform`] is one operation kind plus its validated options. It
//! serializes with an internal `type` tag, so a pipeline reads naturally in
//! YAML:
//!
//! ```yaml
//! type: compose
//! transforms:
//!   - type: resize
//!     size: 32
//!   - type: random_horizontal_flip
//!     p: 0.5
//! ```
//!
//! Every variant wraps an options struct implementing [`Augment`].

use std::fmt;

use serde::{Deserialize, Serialize};
use visaug_core::Image;

use crate::autoaugment::AutoAugment;
use crate::batch::{self, BatchPolicy};
use crate::combinators::{Compose, RandomApply, RandomChoice, RandomOrder};
use crate::erasing::RandomErasing;
use crate::error::TransformResult;
use crate::geometric::{
    CenterCrop, Pad, RandomAffine, RandomCrop, RandomHorizontalFlip, RandomPerspective, RandomResizedCrop,
    RandomRotation, RandomVerticalFlip, Resize,
};
use crate::photometric::{
    ColorJitter, GaussianBlur, Grayscale, RandomAdjustSharpness, RandomAutocontrast, RandomEqualize,
    RandomGrayscale, RandomInvert, RandomPosterize, RandomSolarize,
};
use crate::random::RandomState;
use crate::tensor::{ConvertImageDtype, LinearTransformation, Normalize};

/// Behaviour shared by every transform options struct.
pub trait Augment {
    /// Display name, e.g. `RandomResizedCrop`.
    fn name(&self) -> &'static str;

    /// Checks the options; called after construction from configs and artifacts.
    fn validate(&self) -> TransformResult<()>;

    /// How batched input consumes draws.
    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::Shared
    }

    /// Applies to one image, or to a whole batch under one draw.
    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image>;
}

/// Applies `op` if `rand() < p`, else returns a copy.
pub(crate) fn gated<F>(p: f64, img: &Image, rs: &mut RandomState, op: F) -> TransformResult<Image>
where
    F: FnOnce(&Image) -> visaug_core::Result<Image>,
{
    if rs.rand() < p {
        Ok(op(img)?)
    } else {
        Ok(img.clone())
    }
}

/// Any transform or pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Resize to a shorter edge or an exact size.
    Resize(Resize),
    /// Deterministic centre crop.
    CenterCrop(CenterCrop),
    /// Crop at a random position.
    RandomCrop(RandomCrop),
    /// Random area and aspect crop, resized.
    RandomResizedCrop(RandomResizedCrop),
    /// Constant or mirrored padding.
    Pad(Pad),
    /// Left-right mirror with probability `p`.
    RandomHorizontalFlip(RandomHorizontalFlip),
    /// Top-bottom mirror with probability `p`.
    RandomVerticalFlip(RandomVerticalFlip),
    /// Rotation by a random angle.
    RandomRotation(RandomRotation),
    /// Random rotation, translation, scale and shear.
    RandomAffine(RandomAffine),
    /// Random corner displacement.
    RandomPerspective(RandomPerspective),
    /// Random brightness, contrast, saturation and hue in random order.
    ColorJitter(ColorJitter),
    /// Luma conversion.
    Grayscale(Grayscale),
    /// Luma conversion with probability `p`.
    RandomGrayscale(RandomGrayscale),
    /// Gaussian blur with a random sigma.
    GaussianBlur(GaussianBlur),
    /// Inversion with probability `p`.
    RandomInvert(RandomInvert),
    /// Posterize with probability `p`.
    RandomPosterize(RandomPosterize),
    /// Solarize with probability `p`.
    RandomSolarize(RandomSolarize),
    /// Sharpness adjustment with probability `p`.
    RandomAdjustSharpness(RandomAdjustSharpness),
    /// Autocontrast with probability `p`.
    RandomAutocontrast(RandomAutocontrast),
    /// Histogram equalization with probability `p`.
    RandomEqualize(RandomEqualize),
    /// Per-channel standardization.
    Normalize(Normalize),
    /// Flattened linear map.
    LinearTransformation(LinearTransformation),
    /// Sample type conversion.
    ConvertImageDtype(ConvertImageDtype),
    /// Random rectangle erasing.
    RandomErasing(RandomErasing),
    /// Learned augmentation policy.
    AutoAugment(AutoAugment),
    /// Sequential pipeline.
    Compose(Compose),
    /// All-or-nothing sub-pipeline.
    RandomApply(RandomApply),
    /// One transform picked at random.
    RandomChoice(RandomChoice),
    /// All transforms in random order.
    RandomOrder(RandomOrder),
}

impl Transform {
    /// Sequential pipeline of `transforms`.
    pub fn compose(transforms: Vec<Transform>) -> Self {
        Self::Compose(Compose { transforms })
    }

    /// Sub-pipeline applied with probability `p`.
    pub fn random_apply(transforms: Vec<Transform>, p: f64) -> Self {
        Self::RandomApply(RandomApply { transforms, p })
    }

    /// The options struct behind this variant.
    pub fn as_augment(&self) -> &dyn Augment {
        match self {
            Self::Resize(t) => t,
            Self::CenterCrop(t) => t,
            Self::RandomCrop(t) => t,
            Self::RandomResizedCrop(t) => t,
            Self::Pad(t) => t,
            Self::RandomHorizontalFlip(t) => t,
            Self::RandomVerticalFlip(t) => t,
            Self::RandomRotation(t) => t,
            Self::RandomAffine(t) => t,
            Self::RandomPerspective(t) => t,
            Self::ColorJitter(t) => t,
            Self::Grayscale(t) => t,
            Self::RandomGrayscale(t) => t,
            Self::GaussianBlur(t) => t,
            Self::RandomInvert(t) => t,
            Self::RandomPosterize(t) => t,
            Self::RandomSolarize(t) => t,
            Self::RandomAdjustSharpness(t) => t,
            Self::RandomAutocontrast(t) => t,
            Self::RandomEqualize(t) => t,
            Self::Normalize(t) => t,
            Self::LinearTransformation(t) => t,
            Self::ConvertImageDtype(t) => t,
            Self::RandomErasing(t) => t,
            Self::AutoAugment(t) => t,
            Self::Compose(t) => t,
            Self::RandomApply(t) => t,
            Self::RandomChoice(t) => t,
            Self::RandomOrder(t) => t,
        }
    }

    /// Nested transforms of a combinator; empty for everything else.
    pub fn children(&self) -> &[Transform] {
        match self {
            Self::Compose(t) => &t.transforms,
            Self::RandomApply(t) => &t.transforms,
            Self::RandomChoice(t) => &t.transforms,
            Self::RandomOrder(t) => &t.transforms,
            _ => &[],
        }
    }

    /// Whether this variant only schedules nested transforms.
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            Self::Compose(_) | Self::RandomApply(_) | Self::RandomChoice(_) | Self::RandomOrder(_)
        )
    }

    /// Display name of the variant.
    pub fn name(&self) -> &'static str {
        self.as_augment().name()
    }

    /// Validates the options, recursing into combinators.
    pub fn validate(&self) -> TransformResult<()> {
        self.as_augment().validate()
    }

    /// Declared batch policy.
    ///
    /// Combinators report `PerElement` if any nested transform draws per
    /// element, since a batch then differs from its elements applied alone.
    pub fn batch_policy(&self) -> BatchPolicy {
        self.as_augment().batch_policy()
    }

    /// Applies to a single image or a batch.
    ///
    /// Leaf transforms go through the batch adapter with their declared
    /// policy. Combinators draw their own decisions once per call and hand
    /// the whole input to their children.
    ///
    /// # Errors
    ///
    /// Any error of the underlying operation, or InvalidArgument for options
    /// that fail validation at draw time.
    pub fn apply(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let op = self.as_augment();
        if self.is_combinator() {
            return op.forward(img, rs);
        }
        batch::adapt(img, op.batch_policy(), rs, |x, rs| op.forward(x, rs))
    }

    /// Options as JSON, including the `type` tag.
    pub fn describe(&self) -> TransformResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Name and options on one line, without nested transforms.
    pub fn summary(&self) -> String {
        let mut out = self.name().to_string();
        if let Ok(serde_json::Value::Object(map)) = self.describe() {
            let args: Vec<String> = map
                .iter()
                .filter(|(k, v)| *k != "type" && *k != "transforms" && !v.is_null())
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            if !args.is_empty() {
                out.push_str(&format!("({})", args.join(", ")));
            }
        }
        out
    }

    /// Number of transforms in the tree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Transform::count).sum::<usize>()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())?;
        let children = self.children();
        if !children.is_empty() {
            write!(f, "[")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

macro_rules! impl_from_options {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Transform {
                fn from(t: $variant) -> Self {
                    Self::$variant(t)
                }
            }
        )*
    };
}

impl_from_options!(
    Resize,
    CenterCrop,
    RandomCrop,
    RandomResizedCrop,
    Pad,
    RandomHorizontalFlip,
    RandomVerticalFlip,
    RandomRotation,
    RandomAffine,
    RandomPerspective,
    ColorJitter,
    Grayscale,
    RandomGrayscale,
    GaussianBlur,
    RandomInvert,
    RandomPosterize,
    RandomSolarize,
    RandomAdjustSharpness,
    RandomAutocontrast,
    RandomEqualize,
    Normalize,
    LinearTransformation,
    ConvertImageDtype,
    RandomErasing,
    AutoAugment,
    Compose,
    RandomApply,
    RandomChoice,
    RandomOrder,
);
