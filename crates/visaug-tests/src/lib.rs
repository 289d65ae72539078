//! Integration tests for visaug crates.
//!
//! End-to-end checks across core, ops and transforms: representation
//! parity, seed determinism, batch policies, artifact files and YAML
//! configs. Shared fixtures live here; the tests are in the submodules.

use sha2::{Digest, Sha256};
use visaug_core::{Cast, DType, Grid, Image, PackedImage, Shape};
use visaug_transforms::{PipelineConfig, Transform};

#[cfg(test)]
mod artifacts;
#[cfg(test)]
mod batching;
#[cfg(test)]
mod determinism;
#[cfg(test)]
mod parity;
#[cfg(test)]
mod scenarios;

/// One configured instance of every transform that accepts `u8` input,
/// sized for images of at least 16x16.
pub const CATALOGUE_YAML: &str = r#"
seed: 7
pipeline:
  - type: resize
    size: [12, 14]
    interpolation: bicubic
  - type: center_crop
    size: 10
  - type: random_crop
    size: 12
    padding: [2]
    padding_mode: reflect
  - type: random_resized_crop
    size: 10
    scale: [0.3, 1.0]
  - type: pad
    padding: [1, 2]
    fill: 127
  - type: random_horizontal_flip
  - type: random_vertical_flip
    p: 0.7
  - type: random_rotation
    degrees: 25
    fill: [10, 20, 30]
  - type: random_affine
    degrees: [-10, 10]
    translate: [0.1, 0.2]
    scale: [0.8, 1.2]
    shear: [-5, 5, -3, 3]
    interpolation: bilinear
  - type: random_perspective
    distortion_scale: 0.4
    p: 0.8
  - type: color_jitter
    brightness: 0.4
    contrast: 0.3
    saturation: [0.5, 1.5]
    hue: 0.1
  - type: grayscale
    num_output_channels: 3
  - type: random_grayscale
    p: 0.5
  - type: gaussian_blur
    kernel_size: [3, 5]
  - type: random_invert
  - type: random_posterize
    bits: 3
  - type: random_solarize
    threshold: 128
  - type: random_adjust_sharpness
    sharpness_factor: 2.0
  - type: random_autocontrast
  - type: random_equalize
  - type: random_erasing
    p: 0.9
    value: random
  - type: auto_augment
    policy: cifar10
  - type: random_apply
    p: 0.6
    transforms:
      - type: random_invert
        p: 1.0
      - type: random_horizontal_flip
        p: 1.0
  - type: random_choice
    p: [0.2, 0.8]
    transforms:
      - type: random_posterize
        bits: 2
        p: 1.0
      - type: random_solarize
        threshold: 64
        p: 1.0
  - type: random_order
    transforms:
      - type: random_vertical_flip
      - type: random_autocontrast
"#;

/// The transforms of [`CATALOGUE_YAML`], in order.
///
/// # Panics
///
/// If the catalogue stops parsing.
pub fn catalogue() -> Vec<Transform> {
    let config = PipelineConfig::from_yaml_str(CATALOGUE_YAML).expect("catalogue parses");
    config.pipeline.children().to_vec()
}

fn pattern_value(n: usize, c: usize, y: usize, x: usize) -> f64 {
    let checker = if (y / 4 + x / 4) % 2 == 0 { 40 } else { 0 };
    ((y * 7 + x * 3 + c * 50 + n * 13 + checker) % 256) as f64
}

/// `u8` test pattern mixing a gradient with a coarse checkerboard.
///
/// Channels differ and no row or column is constant, so flips, crops and
/// colour ops all change the output.
///
/// # Panics
///
/// On a shape with a zero dimension.
pub fn pattern(shape: Shape) -> Grid {
    let mut values = Vec::with_capacity(shape.len());
    for n in 0..shape.num_images() {
        for c in 0..shape.channels {
            for y in 0..shape.height {
                for x in 0..shape.width {
                    values.push(pattern_value(n, c, y, x));
                }
            }
        }
    }
    Grid::from_f64(shape, DType::U8, &values, Cast::Truncate).expect("pattern shape")
}

/// Float copy of [`pattern`] scaled to [0, 1].
pub fn pattern_f32(shape: Shape) -> Grid {
    let values: Vec<f64> = pattern(shape).to_f64_vec().iter().map(|v| v / 255.0).collect();
    Grid::from_f64(shape, DType::F32, &values, Cast::Truncate).expect("pattern shape")
}

/// Packed copy of an unbatched `u8` pattern.
pub fn packed_pattern(channels: usize, height: usize, width: usize) -> PackedImage {
    PackedImage::from_grid(&pattern(Shape::image(channels, height, width))).expect("packable pattern")
}

/// SHA-256 of an image's shape, dtype and samples, as lowercase hex.
pub fn image_hash(img: &Image) -> String {
    let grid = img.to_grid();
    let mut hasher = Sha256::new();
    for dim in grid.shape().dims() {
        hasher.update((dim as u64).to_le_bytes());
    }
    hasher.update(grid.dtype().to_string().as_bytes());
    for v in grid.to_f64_vec() {
        hasher.update(v.to_bits().to_le_bytes());
    }
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
