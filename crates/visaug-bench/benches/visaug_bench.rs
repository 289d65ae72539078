//! Benchmarks for visaug operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use visaug_core::{convert_dtype, Cast, DType, Fill, Grid, Image, Shape};
use visaug_ops::functional as F;
use visaug_ops::{Interpolation, PaddingMode};
use visaug_transforms::{PipelineConfig, RandomState};

const TRAIN_PIPELINE: &str = r#"
seed: 0
pipeline:
  - type: random_resized_crop
    size: 224
  - type: random_horizontal_flip
  - type: color_jitter
    brightness: 0.4
    contrast: 0.4
    saturation: 0.4
    hue: 0.1
  - type: convert_image_dtype
    dtype: float32
  - type: normalize
    mean: [0.485, 0.456, 0.406]
    std: [0.229, 0.224, 0.225]
"#;

fn image(size: usize) -> Image {
    let shape = Shape::image(3, size, size);
    let values: Vec<f64> = (0..shape.len()).map(|i| ((i * 31) % 256) as f64).collect();
    Image::Grid(Grid::from_f64(shape, DType::U8, &values, Cast::Truncate).unwrap())
}

/// Resize with each interpolation.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");

    for size in [64, 256, 512] {
        let img = image(size);
        group.throughput(Throughput::Elements((3 * size * size) as u64));
        for interp in [Interpolation::Nearest, Interpolation::Bilinear, Interpolation::Bicubic] {
            group.bench_with_input(BenchmarkId::new(format!("{interp:?}"), size), &img, |b, img| {
                b.iter(|| F::resize(black_box(img), &[size / 2], interp, None).unwrap())
            });
        }
    }

    group.finish();
}

/// Warps through the inverse-mapping resampler.
fn bench_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("warp");
    let img = image(256);
    let fill = Fill::default();
    group.throughput(Throughput::Elements(3 * 256 * 256));

    group.bench_function("rotate_bilinear", |b| {
        b.iter(|| F::rotate(black_box(&img), 17.0, Interpolation::Bilinear, false, None, &fill).unwrap())
    });

    group.bench_function("rotate_expand", |b| {
        b.iter(|| F::rotate(black_box(&img), 17.0, Interpolation::Nearest, true, None, &fill).unwrap())
    });

    let start = [[0.0, 0.0], [255.0, 0.0], [255.0, 255.0], [0.0, 255.0]];
    let end = [[10.0, 5.0], [240.0, 12.0], [250.0, 250.0], [3.0, 230.0]];
    group.bench_function("perspective", |b| {
        b.iter(|| F::perspective(black_box(&img), &start, &end, Interpolation::Bilinear, &fill).unwrap())
    });

    group.bench_function("pad_reflect", |b| {
        b.iter(|| F::pad(black_box(&img), &[16], &fill, PaddingMode::Reflect).unwrap())
    });

    group.finish();
}

/// Colour engine.
fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");
    let img = image(256);
    group.throughput(Throughput::Elements(3 * 256 * 256));

    group.bench_function("adjust_hue", |b| b.iter(|| F::adjust_hue(black_box(&img), 0.2).unwrap()));
    group.bench_function("adjust_saturation", |b| b.iter(|| F::adjust_saturation(black_box(&img), 1.5).unwrap()));
    group.bench_function("adjust_sharpness", |b| b.iter(|| F::adjust_sharpness(black_box(&img), 2.0).unwrap()));
    group.bench_function("equalize", |b| b.iter(|| F::equalize(black_box(&img)).unwrap()));
    group.bench_function("gaussian_blur_9", |b| {
        b.iter(|| F::gaussian_blur(black_box(&img), [9, 9], Some([2.0, 2.0])).unwrap())
    });
    group.bench_function("to_float32", |b| {
        b.iter(|| convert_dtype(black_box(img.as_grid().unwrap()), DType::F32).unwrap())
    });

    group.finish();
}

/// A typical training pipeline, single image and batch.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let config = PipelineConfig::from_yaml_str(TRAIN_PIPELINE).unwrap();

    let single = image(256);
    group.bench_function("train_single", |b| {
        let mut rs = RandomState::new(0);
        b.iter(|| config.pipeline.apply(black_box(&single), &mut rs).unwrap())
    });

    let batch = {
        let g = single.to_grid();
        Image::Grid(Grid::stack(&vec![g; 8]).unwrap())
    };
    group.throughput(Throughput::Elements(8));
    group.bench_function("train_batch_8", |b| {
        let mut rs = RandomState::new(0);
        b.iter(|| config.pipeline.apply(black_box(&batch), &mut rs).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_resize, bench_warp, bench_color, bench_pipeline);

criterion_main!(benches);
