//! CLI command implementations

pub mod check;
pub mod compile;
pub mod demo;
pub mod inspect;

use anyhow::{bail, Context, Result};
use std::path::Path;
use visaug_transforms::{PipelineConfig, Transform};

/// Load and validate a pipeline config
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::from_yaml_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Load and validate an artifact
pub fn load_artifact(path: &Path) -> Result<Transform> {
    visaug_transforms::artifact::load(path).with_context(|| format!("Failed to load artifact: {}", path.display()))
}

/// Print a transform tree, one transform per line
pub fn print_tree(transform: &Transform, depth: usize) {
    println!("{}{}", "  ".repeat(depth), transform.summary());
    for child in transform.children() {
        print_tree(child, depth + 1);
    }
}

/// Parse "HxW" (or a single "N" for a square)
pub fn parse_size(s: &str) -> Result<(usize, usize)> {
    let parse = |v: &str| -> Result<usize> {
        let n: usize = v.trim().parse().with_context(|| format!("Invalid size component: {v}"))?;
        if n == 0 {
            bail!("Size components must be positive: {s}");
        }
        Ok(n)
    };
    match s.split_once(['x', 'X']) {
        Some((h, w)) => Ok((parse(h)?, parse(w)?)),
        None => {
            let n = parse(s)?;
            Ok((n, n))
        }
    }
}
