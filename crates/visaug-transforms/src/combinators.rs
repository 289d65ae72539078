//! Pipeline combinators.
//!
//! Combinators make their own draws once per call and pass the whole input,
//! batched or not, to their children.

use serde::{Deserialize, Serialize};
use tracing::debug;
use visaug_core::Image;

use crate::batch::BatchPolicy;
use crate::error::{invalid, TransformResult};
use crate::params::{check_probability, default_p};
use crate::random::RandomState;
use crate::transform::{Augment, Transform};

fn validate_all(transforms: &[Transform]) -> TransformResult<()> {
    transforms.iter().try_for_each(Transform::validate)
}

fn merged_policy(transforms: &[Transform]) -> BatchPolicy {
    transforms.iter().fold(BatchPolicy::Shared, |acc, t| acc.merge(t.batch_policy()))
}

fn run_all<'a>(
    transforms: impl IntoIterator<Item = &'a Transform>,
    img: &Image,
    rs: &mut RandomState,
) -> TransformResult<Image> {
    let mut out = img.clone();
    for t in transforms {
        out = t.apply(&out, rs)?;
    }
    Ok(out)
}

/// Applies `transforms` in sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compose {
    /// Steps in order.
    pub transforms: Vec<Transform>,
}

impl Augment for Compose {
    fn name(&self) -> &'static str {
        "Compose"
    }

    fn validate(&self) -> TransformResult<()> {
        validate_all(&self.transforms)
    }

    fn batch_policy(&self) -> BatchPolicy {
        merged_policy(&self.transforms)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        run_all(&self.transforms, img, rs)
    }
}

/// Applies all of `transforms` with probability `p`, or none of them.
///
/// One draw per call; the sub-pipeline is skipped when `p < rand()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomApply {
    /// Sub-pipeline.
    pub transforms: Vec<Transform>,
    /// Probability of applying.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Augment for RandomApply {
    fn name(&self) -> &'static str {
        "RandomApply"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        validate_all(&self.transforms)
    }

    fn batch_policy(&self) -> BatchPolicy {
        merged_policy(&self.transforms)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        if self.p < rs.rand() {
            debug!("RandomApply skipped");
            return Ok(img.clone());
        }
        run_all(&self.transforms, img, rs)
    }
}

/// Applies one of `transforms`, picked uniformly or by weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomChoice {
    /// Candidates.
    pub transforms: Vec<Transform>,
    /// Optional relative weights, one per candidate.
    #[serde(default)]
    pub p: Option<Vec<f64>>,
}

impl Augment for RandomChoice {
    fn name(&self) -> &'static str {
        "RandomChoice"
    }

    fn validate(&self) -> TransformResult<()> {
        if self.transforms.is_empty() {
            return Err(invalid("RandomChoice needs at least one transform"));
        }
        if let Some(p) = &self.p {
            if p.len() != self.transforms.len() {
                return Err(invalid(format!(
                    "length of p doesn't match the number of transforms: {} != {}",
                    p.len(),
                    self.transforms.len()
                )));
            }
            if p.iter().any(|w| !(*w >= 0.0)) || !(p.iter().sum::<f64>() > 0.0) {
                return Err(invalid(format!("weights must be non-negative with a positive sum, got {p:?}")));
            }
        }
        validate_all(&self.transforms)
    }

    fn batch_policy(&self) -> BatchPolicy {
        merged_policy(&self.transforms)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let uniform;
        let weights = match &self.p {
            Some(p) => p.as_slice(),
            None => {
                uniform = vec![1.0; self.transforms.len()];
                uniform.as_slice()
            }
        };
        let Some(index) = rs.weighted_index(weights) else {
            return Err(invalid("RandomChoice has nothing to choose from"));
        };
        let Some(choice) = self.transforms.get(index) else {
            return Err(invalid("RandomChoice weights outnumber its transforms"));
        };
        debug!(index, choice = choice.name(), "RandomChoice");
        choice.apply(img, rs)
    }
}

/// Applies all of `transforms` in a random order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RandomOrder {
    /// Steps to shuffle.
    pub transforms: Vec<Transform>,
}

impl Augment for RandomOrder {
    fn name(&self) -> &'static str {
        "RandomOrder"
    }

    fn validate(&self) -> TransformResult<()> {
        validate_all(&self.transforms)
    }

    fn batch_policy(&self) -> BatchPolicy {
        merged_policy(&self.transforms)
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        let order = rs.randperm(self.transforms.len());
        debug!(?order, "RandomOrder");
        run_all(order.iter().map(|&i| &self.transforms[i]), img, rs)
    }
}
