//! YAML pipeline configuration.
//!
//! A config is either a bare tagged transform or a document with an
//! optional seed and a `pipeline`. The pipeline may be a single transform
//! or a list, which is read as a `compose`:
//!
//! ```yaml
//! seed: 42
//! pipeline:
//!   - type: random_resized_crop
//!     size: 224
//!   - type: color_jitter
//!     brightness: 0.4
//!   - type: normalize
//!     mean: [0.485, 0.456, 0.406]
//!     std: [0.229, 0.224, 0.225]
//! ```
//!
//! Loaded pipelines are validated before they are returned.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::random::RandomState;
use crate::transform::Transform;

/// Seed plus pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seed for [`PipelineConfig::random_state`]; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Root transform.
    pub pipeline: Transform,
}

impl PipelineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// [`TransformError::NotFound`] if `path` does not exist, plus everything
    /// [`PipelineConfig::from_yaml_str`] reports.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> TransformResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TransformError::NotFound { path: path.to_path_buf() });
        }
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading pipeline config");
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> TransformResult<Self> {
        let raw: Value = serde_yaml::from_str(yaml)?;
        let config = Self::from_value(raw)?;
        config.pipeline.validate()?;
        Ok(config)
    }

    fn from_value(raw: Value) -> TransformResult<Self> {
        let Value::Mapping(mut map) = raw else {
            return Ok(Self { seed: None, pipeline: pipeline_from_value(raw)? });
        };
        let Some(pipeline) = map.remove("pipeline") else {
            return Ok(Self { seed: None, pipeline: serde_yaml::from_value(Value::Mapping(map))? });
        };
        let seed = match map.remove("seed") {
            Some(seed) => serde_yaml::from_value(seed)?,
            None => None,
        };
        if let Some(key) = map.keys().next() {
            return Err(TransformError::Core(visaug_core::Error::InvalidArgument(format!(
                "unknown config key {}",
                serde_yaml::to_string(key)?.trim()
            ))));
        }
        Ok(Self { seed, pipeline: pipeline_from_value(pipeline)? })
    }

    /// Random state seeded from the config.
    pub fn random_state(&self) -> RandomState {
        match self.seed {
            Some(seed) => RandomState::new(seed),
            None => RandomState::from_entropy(),
        }
    }
}

fn pipeline_from_value(value: Value) -> TransformResult<Transform> {
    match value {
        Value::Sequence(_) => Ok(Transform::compose(serde_yaml::from_value(value)?)),
        other => Ok(serde_yaml::from_value(other)?),
    }
}

impl Transform {
    /// Parses and validates a pipeline from YAML, ignoring any seed.
    pub fn from_yaml_str(yaml: &str) -> TransformResult<Self> {
        Ok(PipelineConfig::from_yaml_str(yaml)?.pipeline)
    }

    /// Reads a pipeline from a YAML file, ignoring any seed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> TransformResult<Self> {
        Ok(PipelineConfig::from_yaml_file(path)?.pipeline)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> TransformResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_transform() {
        let t = Transform::from_yaml_str("type: random_horizontal_flip\np: 0.25\n").unwrap();
        assert_eq!(t.name(), "RandomHorizontalFlip");
    }

    #[test]
    fn test_list_pipeline() {
        let yaml = "seed: 7\npipeline:\n  - type: resize\n    size: 32\n  - type: center_crop\n    size: [24, 20]\n";
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.pipeline.name(), "Compose");
        assert_eq!(config.pipeline.children().len(), 2);
    }

    #[test]
    fn test_validation_runs() {
        let err = Transform::from_yaml_str("type: random_rotation\ndegrees: -5\n").unwrap_err();
        assert!(matches!(err.kind(), Some(visaug_core::Error::InvalidArgument(_))));
        let err = PipelineConfig::from_yaml_str("pipeline: {type: pad, padding: [1]}\nsede: 3\n").unwrap_err();
        assert!(err.to_string().contains("sede"));
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            Transform::from_yaml_str("type: warp_drive\n"),
            Err(TransformError::Yaml(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let t = Transform::from_yaml_str("type: color_jitter\nbrightness: 0.4\nhue: [-0.1, 0.1]\n").unwrap();
        let back = Transform::from_yaml_str(&t.to_yaml_string().unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PipelineConfig::from_yaml_file("/no/such/config.yaml"),
            Err(TransformError::NotFound { .. })
        ));
    }
}
