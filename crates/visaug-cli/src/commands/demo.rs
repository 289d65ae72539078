//! Runs an artifact on a synthetic image.
//!
//! The input is a diagonal gradient, so results are reproducible without
//! any image files.

use crate::DemoArgs;
use anyhow::{bail, Context, Result};
use tracing::info;
use visaug_core::{DType, Grid, Image, PackedImage, Shape};
use visaug_transforms::RandomState;

/// Diagonal gradient, each channel offset so they differ.
fn gradient(shape: Shape) -> Result<Grid> {
    let (h, w) = (shape.height, shape.width);
    let span = (h + w).saturating_sub(2).max(1) as f64;
    Ok(Grid::from_fn(shape, DType::U8, |c, y, x| {
        let t = (y + x) as f64 / span;
        (t * 255.0 + c as f64 * 40.0) % 256.0
    })?)
}

fn stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (min, max, mean)
}

/// Loads the artifact, applies it once and prints a summary of the output.
pub fn run(args: DemoArgs, verbose: bool) -> Result<()> {
    let transform = super::load_artifact(&args.artifact)?;
    let (h, w) = super::parse_size(&args.size)?;
    if !matches!(args.channels, 1 | 3 | 4) {
        bail!("Channels must be 1, 3 or 4, got {}", args.channels);
    }

    let shape = match args.batch {
        0 => Shape::image(args.channels, h, w),
        b => Shape::batch(b, args.channels, h, w),
    };
    let grid = gradient(shape)?;
    let input = if args.packed {
        Image::Packed(PackedImage::from_grid(&grid).context("Failed to pack input")?)
    } else {
        Image::Grid(grid)
    };
    info!(%shape, packed = args.packed, seed = args.seed, "demo input");

    let mut rs = RandomState::new(args.seed);
    let output = transform.apply(&input, &mut rs).context("Pipeline failed")?;

    let (min, max, mean) = stats(&output.to_grid().to_f64_vec());
    println!("Input:  {} {}", input.shape(), input.dtype());
    println!("Output: {} {}", output.shape(), output.dtype());
    println!("  Encoding:   {}", if output.is_packed() { "packed" } else { "grid" });
    println!("  Min value:  {min:.6}");
    println!("  Max value:  {max:.6}");
    println!("  Avg value:  {mean:.6}");
    if verbose {
        println!("  Pipeline:   {transform}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let g = gradient(Shape::image(1, 3, 3)).unwrap();
        assert_eq!(g.get(0, 0, 0, 0), 0.0);
        assert_eq!(g.get(0, 0, 2, 2), 255.0);
    }

    #[test]
    fn test_stats() {
        assert_eq!(stats(&[1.0, 3.0, 2.0]), (1.0, 3.0, 2.0));
        assert_eq!(stats(&[]), (0.0, 0.0, 0.0));
    }
}
