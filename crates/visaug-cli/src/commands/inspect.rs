//! Artifact inspection command.

use crate::InspectArgs;
use anyhow::{Context, Result};
use std::fs;
use visaug_transforms::artifact;

/// Prints the artifact header and its transform tree.
pub fn run(args: InspectArgs, verbose: bool) -> Result<()> {
    let bytes = fs::read(&args.artifact).with_context(|| format!("Failed to read: {}", args.artifact.display()))?;
    let header = artifact::read_header(&bytes).context("Invalid artifact header")?;
    let transform = super::load_artifact(&args.artifact)?;

    if args.json {
        let json = serde_json::json!({
            "version": header.version,
            "body_len": header.body_len,
            "transform": transform.describe()?,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{}", args.artifact.display());
    println!("  Magic:      {}", String::from_utf8_lossy(&artifact::MAGIC));
    println!("  Version:    {}", header.version);
    println!("  Body:       {} bytes", header.body_len);
    println!("  Transforms: {}", transform.count());
    if verbose {
        println!("  Batch:      {:?}", transform.batch_policy());
    }
    println!();
    super::print_tree(&transform, 1);
    Ok(())
}
