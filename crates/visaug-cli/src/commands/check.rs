//! Config validation command.

use crate::CheckArgs;
use anyhow::Result;
use tracing::debug;

/// Parses and validates the config, then prints the pipeline.
pub fn run(args: CheckArgs, verbose: bool) -> Result<()> {
    let config = super::load_config(&args.config)?;
    debug!(transforms = config.pipeline.count(), "config ok");

    println!("{}: OK", args.config.display());
    match config.seed {
        Some(seed) => println!("  Seed:       {seed}"),
        None => println!("  Seed:       (entropy)"),
    }
    println!("  Transforms: {}", config.pipeline.count());
    println!("  Batch:      {:?}", config.pipeline.batch_policy());
    if verbose {
        println!("  Pipeline:   {}", config.pipeline);
    }
    println!();
    super::print_tree(&config.pipeline, 1);
    Ok(())
}
