//! Batch adapter.
//!
//! A transform declares whether a batch shares one parameter draw or draws
//! per element. Shared transforms run once over the whole batch (the ops
//! layer maps them over the elements). Per-element transforms are split,
//! applied to each element in order with the same [`RandomState`], and
//! re-stacked.

use serde::{Deserialize, Serialize};
use tracing::trace;
use visaug_core::{Grid, Image};

use crate::error::TransformResult;
use crate::random::RandomState;

/// How a batched input consumes random draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// One draw for the whole batch; every element gets the same parameters.
    #[default]
    Shared,
    /// Elements draw independently, in batch order.
    PerElement,
}

impl BatchPolicy {
    /// `PerElement` if either side draws per element.
    pub fn merge(self, other: BatchPolicy) -> BatchPolicy {
        match (self, other) {
            (Self::Shared, Self::Shared) => Self::Shared,
            _ => Self::PerElement,
        }
    }
}

/// Runs `op` on `img` under `policy`.
///
/// Unbatched and packed images are passed to `op` unchanged regardless of
/// the policy.
pub fn adapt<F>(img: &Image, policy: BatchPolicy, rs: &mut RandomState, mut op: F) -> TransformResult<Image>
where
    F: FnMut(&Image, &mut RandomState) -> TransformResult<Image>,
{
    let grid = match (policy, img) {
        (BatchPolicy::PerElement, Image::Grid(g)) if g.is_batched() => g,
        _ => return op(img, rs),
    };
    trace!(batch = grid.shape().num_images(), "per-element draw");
    let mut outputs = Vec::with_capacity(grid.shape().num_images());
    for element in grid.unbind() {
        outputs.push(op(&Image::Grid(element), rs)?.into_grid());
    }
    Ok(Image::Grid(Grid::stack(&outputs)?))
}
