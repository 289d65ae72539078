//! Artifact files and YAML configs on disk.

use std::fs;

use tempfile::tempdir;
use visaug_core::{Error, Image, Shape};
use visaug_transforms::{artifact, PipelineConfig, RandomState, Transform, TransformError};

use crate::{catalogue, image_hash, pattern, CATALOGUE_YAML};

#[test]
fn test_artifact_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.vaug");
    let t = Transform::compose(catalogue());

    artifact::save(&t, &path).unwrap();
    let loaded = artifact::load(&path).unwrap();
    assert_eq!(loaded, t);

    let img = Image::Grid(pattern(Shape::image(3, 20, 24)));
    for seed in [0, 3, 77] {
        let a = t.apply(&img, &mut RandomState::new(seed)).unwrap();
        let b = loaded.apply(&img, &mut RandomState::new(seed)).unwrap();
        assert_eq!(image_hash(&a), image_hash(&b), "seed {seed}");
    }
}

#[test]
fn test_every_transform_survives_reload() {
    let img = Image::Grid(pattern(Shape::batch(2, 3, 20, 24)));
    for t in catalogue() {
        let loaded = artifact::from_bytes(&artifact::to_bytes(&t).unwrap()).unwrap();
        assert_eq!(loaded, t, "{}", t.name());
        let a = t.apply(&img, &mut RandomState::new(8)).unwrap();
        let b = loaded.apply(&img, &mut RandomState::new(8)).unwrap();
        assert_eq!(a, b, "{}", t.name());
    }
}

#[test]
fn test_artifact_body_is_tagged_json() {
    let t = Transform::compose(catalogue());
    let bytes = artifact::to_bytes(&t).unwrap();
    let header = artifact::read_header(&bytes).unwrap();
    assert_eq!(header.version, artifact::FORMAT_VERSION);
    assert_eq!(header.body_len, bytes.len() - 6);

    let body: serde_json::Value = serde_json::from_slice(&bytes[6..]).unwrap();
    assert_eq!(body["transform"]["type"], "compose");
    assert_eq!(body["transform"]["transforms"][0]["type"], "resize");
    assert_eq!(body["transform"]["transforms"].as_array().unwrap().len(), 25);
}

#[test]
fn test_corrupt_artifacts_rejected() {
    let t = Transform::compose(catalogue());
    let good = artifact::to_bytes(&t).unwrap();

    let mut bad_magic = good.clone();
    bad_magic[0] = b'X';
    assert!(matches!(artifact::from_bytes(&bad_magic), Err(TransformError::Artifact(_))));

    let mut bad_version = good.clone();
    bad_version[4] = 9;
    assert!(matches!(artifact::from_bytes(&bad_version), Err(TransformError::Artifact(_))));

    assert!(matches!(artifact::from_bytes(&good[..3]), Err(TransformError::Artifact(_))));
    assert!(matches!(artifact::from_bytes(&good[..good.len() - 2]), Err(TransformError::Json(_))));
}

#[test]
fn test_invalid_options_rejected_on_load() {
    let mut bytes = artifact::MAGIC.to_vec();
    bytes.extend_from_slice(&artifact::FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(br#"{"transform": {"type": "random_horizontal_flip", "p": 1.5}}"#);
    let err = artifact::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err.kind(), Some(Error::InvalidArgument(_))), "{err}");
}

#[test]
fn test_missing_files() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.vaug");
    assert!(matches!(artifact::load(&missing), Err(TransformError::NotFound { .. })));
    assert!(matches!(PipelineConfig::from_yaml_file(&missing), Err(TransformError::NotFound { .. })));
}

#[test]
fn test_yaml_file_to_artifact() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("train.yaml");
    fs::write(&config_path, CATALOGUE_YAML).unwrap();

    let config = PipelineConfig::from_yaml_file(&config_path).unwrap();
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.pipeline.name(), "Compose");
    assert_eq!(config.pipeline.count(), 1 + 25 + 2 + 2 + 2);

    let artifact_path = dir.path().join("train.vaug");
    artifact::save(&config.pipeline, &artifact_path).unwrap();
    assert_eq!(artifact::load(&artifact_path).unwrap(), config.pipeline);
}

#[test]
fn test_yaml_round_trip() {
    let t = Transform::compose(catalogue());
    let yaml = t.to_yaml_string().unwrap();
    assert_eq!(Transform::from_yaml_str(&yaml).unwrap(), t);
}

#[test]
fn test_yaml_errors() {
    let unknown_type = "type: random_teleport\np: 0.5\n";
    assert!(matches!(Transform::from_yaml_str(unknown_type), Err(TransformError::Yaml(_))));

    let bad_key = "seed: 1\npipeline:\n  - type: random_invert\nextra: true\n";
    let err = PipelineConfig::from_yaml_str(bad_key).unwrap_err();
    assert!(matches!(err.kind(), Some(Error::InvalidArgument(_))));

    let bad_range = "type: color_jitter\nbrightness: [1.5, 0.5]\n";
    let err = Transform::from_yaml_str(bad_range).unwrap_err();
    assert!(matches!(err.kind(), Some(Error::InvalidArgument(_))));
}
