//! Config to artifact compilation.

use crate::CompileArgs;
use anyhow::{Context, Result};
use visaug_transforms::artifact;

/// Writes the validated pipeline of a config as an artifact.
///
/// The config seed is not part of the artifact; pass it to `demo` instead.
pub fn run(args: CompileArgs, verbose: bool) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let bytes = artifact::to_bytes(&config.pipeline).context("Failed to serialize pipeline")?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("Failed to write artifact: {}", args.output.display()))?;

    println!("Wrote {} ({} bytes)", args.output.display(), bytes.len());
    if verbose {
        println!("  Format:     v{}", artifact::FORMAT_VERSION);
        println!("  Transforms: {}", config.pipeline.count());
    }
    Ok(())
}
