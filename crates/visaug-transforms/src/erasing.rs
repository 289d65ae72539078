//! Random rectangle erasing.
//!
//! Draw order per image: the gate, then for each of up to 10 attempts the
//! area fraction and the log aspect ratio. The first fitting window draws
//! its noise (for `random` fill), then the row, then the column. If no
//! attempt fits the image is returned unchanged.

use serde::{Deserialize, Serialize};
use tracing::debug;
use visaug_core::{Image, Rect};
use visaug_ops::functional as F;

use crate::batch::BatchPolicy;
use crate::error::{invalid, TransformResult};
use crate::params::{check_probability, default_p, ordered};
use crate::random::RandomState;
use crate::transform::Augment;

/// The `random` keyword of [`ErasingValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErasingKeyword {
    /// I.i.d. standard-normal noise.
    Random,
}

/// What erased pixels receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErasingValue {
    /// Same value everywhere.
    Scalar(f64),
    /// One value per channel, or a single value.
    PerChannel(Vec<f64>),
    /// Named fill.
    Keyword(ErasingKeyword),
}

impl Default for ErasingValue {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

/// Erases a random rectangle with probability `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomErasing {
    /// Probability of erasing.
    #[serde(default = "default_p")]
    pub p: f64,
    /// Range of the erased area relative to the image.
    #[serde(default = "default_scale")]
    pub scale: [f64; 2],
    /// Range of the erased aspect ratio.
    #[serde(default = "default_ratio")]
    pub ratio: [f64; 2],
    /// Fill of the erased window.
    #[serde(default)]
    pub value: ErasingValue,
}

fn default_scale() -> [f64; 2] {
    [0.02, 0.33]
}

fn default_ratio() -> [f64; 2] {
    [0.3, 3.3]
}

impl Default for RandomErasing {
    fn default() -> Self {
        Self { p: default_p(), scale: default_scale(), ratio: default_ratio(), value: ErasingValue::default() }
    }
}

impl RandomErasing {
    /// Per-channel fill, or `None` for noise.
    fn channel_values(&self, channels: usize) -> TransformResult<Option<Vec<f64>>> {
        match &self.value {
            ErasingValue::Scalar(v) => Ok(Some(vec![*v; channels])),
            ErasingValue::PerChannel(v) if v.len() == 1 => Ok(Some(vec![v[0]; channels])),
            ErasingValue::PerChannel(v) if v.len() == channels => Ok(Some(v.clone())),
            ErasingValue::PerChannel(v) => Err(invalid(format!(
                "erasing value should be a single number or have {channels} values (one per channel), got {}",
                v.len()
            ))),
            ErasingValue::Keyword(ErasingKeyword::Random) => Ok(None),
        }
    }

    /// Draws the window and its planar values, or `None` when nothing fits.
    pub fn get_params(
        &self,
        channels: usize,
        height: usize,
        width: usize,
        rs: &mut RandomState,
    ) -> TransformResult<Option<(Rect, Vec<f64>)>> {
        let fill = self.channel_values(channels)?;
        let area = (height * width) as f64;
        let log_ratio = [self.ratio[0].ln(), self.ratio[1].ln()];

        for _ in 0..10 {
            let erase_area = area * rs.uniform(self.scale[0], self.scale[1]);
            let aspect = rs.uniform(log_ratio[0], log_ratio[1]).exp();
            let h = (erase_area * aspect).sqrt().round_ties_even();
            let w = (erase_area / aspect).sqrt().round_ties_even();
            if !(h < height as f64 && w < width as f64) || h < 1.0 || w < 1.0 {
                continue;
            }
            let (h, w) = (h as usize, w as usize);
            let values = match &fill {
                Some(per_channel) => per_channel.iter().flat_map(|v| std::iter::repeat_n(*v, h * w)).collect(),
                None => rs.normal_vec(channels * h * w),
            };
            let i = rs.randint(0, (height - h + 1) as i64);
            let j = rs.randint(0, (width - w + 1) as i64);
            return Ok(Some((Rect::new(i, j, h as i64, w as i64), values)));
        }
        Ok(None)
    }
}

impl Augment for RandomErasing {
    fn name(&self) -> &'static str {
        "RandomErasing"
    }

    fn validate(&self) -> TransformResult<()> {
        check_probability("p", self.p)?;
        let scale = ordered("scale", self.scale)?;
        let ratio = ordered("ratio", self.ratio)?;
        if !(0.0..=1.0).contains(&scale[0]) || !(0.0..=1.0).contains(&scale[1]) {
            return Err(invalid(format!("scale should be between 0 and 1, got {scale:?}")));
        }
        if ratio[0] <= 0.0 {
            return Err(invalid(format!("ratio should be positive, got {ratio:?}")));
        }
        if let ErasingValue::PerChannel(v) = &self.value {
            if v.is_empty() {
                return Err(invalid("erasing value list must not be empty"));
            }
        }
        Ok(())
    }

    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::PerElement
    }

    fn forward(&self, img: &Image, rs: &mut RandomState) -> TransformResult<Image> {
        // Fill length is checked before the gate.
        self.channel_values(img.channels())?;
        if !(rs.rand() < self.p) {
            return Ok(img.clone());
        }
        match self.get_params(img.channels(), img.height(), img.width(), rs)? {
            Some((rect, values)) => {
                debug!(%rect, "RandomErasing window");
                Ok(F::erase(img, rect, &values)?)
            }
            None => {
                debug!("RandomErasing found no window, returning input");
                Ok(img.clone())
            }
        }
    }
}
