//! Concrete end-to-end scenarios and algebraic properties.

use approx::assert_abs_diff_eq;
use visaug_core::{convert_dtype, DType, Error, Fill, Image, Shape};
use visaug_ops::functional as F;
use visaug_ops::PaddingMode;
use visaug_transforms::{
    ErasingValue, Normalize, Pad, RandomErasing, RandomState, Resize, Size, Transform, TransformError,
};

use crate::{pattern, pattern_f32};

fn core_err(result: Result<Image, TransformError>) -> Error {
    match result {
        Err(TransformError::Core(e)) => e,
        other => panic!("expected a core error, got {other:?}"),
    }
}

#[test]
fn test_resize_shorter_edge() {
    let t = Transform::from(Resize::new(Size::Single(32)));
    let mut rs = RandomState::new(0);

    let out = t.apply(&Image::Grid(pattern(Shape::image(3, 32, 46))), &mut rs).unwrap();
    assert_eq!(out.shape(), Shape::image(3, 32, 32 * 46 / 32));

    let out = t.apply(&Image::Grid(pattern(Shape::image(3, 44, 56))), &mut rs).unwrap();
    // 56 * 32 / 44 = 40.7, truncated
    assert_eq!(out.shape(), Shape::image(3, 32, 40));
    assert_eq!(out.dtype(), DType::U8);
}

#[test]
fn test_pad_constant_border() {
    let (h, w) = (7, 10);
    let t = Transform::from(Pad {
        padding: vec![2],
        fill: Fill::Scalar(127.0),
        padding_mode: PaddingMode::Constant,
    });
    let out = t.apply(&Image::Grid(pattern(Shape::image(3, h, w))), &mut RandomState::new(0)).unwrap();
    let g = out.into_grid();
    assert_eq!(g.shape(), Shape::image(3, h + 4, w + 4));
    for c in 0..3 {
        for y in 0..h + 4 {
            for x in 0..w + 4 {
                let border = y < 2 || x < 2 || y >= h + 2 || x >= w + 2;
                if border {
                    assert_eq!(g.get(0, c, y, x), 127.0, "border at c={c} y={y} x={x}");
                }
            }
        }
    }
    // Interior is the untouched input.
    let input = pattern(Shape::image(3, h, w));
    assert_eq!(g.get(0, 1, 2, 2), input.get(0, 1, 0, 0));
    assert_eq!(g.get(0, 2, h + 1, w + 1), input.get(0, 2, h - 1, w - 1));
}

#[test]
fn test_erasing_value_length_mismatch() {
    let t = Transform::from(RandomErasing {
        value: ErasingValue::PerChannel(vec![0.1, 0.2, 0.3, 0.4]),
        ..RandomErasing::default()
    });
    let img = Image::Grid(pattern_f32(Shape::image(3, 16, 16)));
    // Raised on every seed, including those where the gate would skip.
    for seed in 0..8 {
        let err = core_err(t.apply(&img, &mut RandomState::new(seed)));
        assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    }
}

#[test]
fn test_unsafe_float_to_int64() {
    let values = vec![-0.5, 0.25, 1.5, 3.0];
    let g = visaug_core::Grid::from_f64(Shape::image(1, 2, 2), DType::F32, &values, visaug_core::Cast::Truncate).unwrap();
    assert_eq!(convert_dtype(&g, DType::I64), Err(Error::UnsafeConversion { from: DType::F32, to: DType::I64 }));
    assert!(matches!(convert_dtype(&g, DType::I32), Err(Error::UnsafeConversion { .. })));
}

#[test]
fn test_safe_conversion_round_trip() {
    let g = pattern(Shape::image(3, 5, 5));
    for dtype in [DType::F32, DType::F64, DType::I16, DType::I32, DType::I64] {
        let there = convert_dtype(&g, dtype).unwrap();
        let back = convert_dtype(&there, DType::U8).unwrap();
        for (a, b) in g.to_f64_vec().iter().zip(back.to_f64_vec()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1.0);
        }
    }
}

#[test]
fn test_normalize_inverse() {
    let mean = [0.485, 0.456, 0.406];
    let std = [0.229, 0.224, 0.225];
    let input = pattern_f32(Shape::image(3, 6, 7));
    let t = Transform::from(Normalize { mean: mean.to_vec(), std: std.to_vec() });
    let out = t.apply(&Image::Grid(input.clone()), &mut RandomState::new(0)).unwrap().into_grid();
    for c in 0..3 {
        for y in 0..6 {
            for x in 0..7 {
                let restored = out.get(0, c, y, x) * std[c] + mean[c];
                assert_abs_diff_eq!(restored, input.get(0, c, y, x), epsilon = 1e-5);
            }
        }
    }
}

#[test]
fn test_normalize_rejects_integers() {
    let t = Transform::from(Normalize { mean: vec![0.5], std: vec![0.5] });
    let err = core_err(t.apply(&Image::Grid(pattern(Shape::image(1, 4, 4))), &mut RandomState::new(0)));
    assert!(matches!(err, Error::TypeMismatch(_)));
}

#[test]
fn test_equalize_idempotent() {
    // Two levels per channel stretch to the full range.
    let two_level = visaug_core::Grid::from_fn(Shape::image(3, 32, 32), DType::U8, |c, y, x| {
        if (y + x + c) % 2 == 0 { 10.0 } else { 200.0 }
    })
    .unwrap();
    let once = F::equalize(&Image::Grid(two_level)).unwrap();
    let g = once.as_grid().unwrap();
    assert_eq!(g.get(0, 0, 0, 0), 0.0);
    assert_eq!(g.get(0, 0, 0, 1), 255.0);
    assert_eq!(F::equalize(&once).unwrap(), once);

    // A flat histogram is already equalized.
    let ramp = visaug_core::Grid::from_fn(Shape::image(1, 16, 16), DType::U8, |_, y, x| (y * 16 + x) as f64).unwrap();
    let img = Image::Grid(ramp);
    let once = F::equalize(&img).unwrap();
    assert_eq!(once, img);
    assert_eq!(F::equalize(&once).unwrap(), once);
}

#[test]
fn test_five_crop_positions() {
    let g = pattern(Shape::image(1, 9, 10));
    let img = Image::Grid(g.clone());
    let crops = F::five_crop(&img, (4, 4)).unwrap();
    assert_eq!(crops.len(), 5);
    for crop in &crops {
        assert_eq!(crop.shape(), Shape::image(1, 4, 4));
    }
    let origin = |i: usize| crops[i].as_grid().unwrap().get(0, 0, 0, 0);
    assert_eq!(origin(0), g.get(0, 0, 0, 0));
    assert_eq!(origin(1), g.get(0, 0, 0, 6));
    assert_eq!(origin(2), g.get(0, 0, 5, 0));
    assert_eq!(origin(3), g.get(0, 0, 5, 6));
    // round((9 - 4) / 2) = 2, round((10 - 4) / 2) = 3
    assert_eq!(origin(4), g.get(0, 0, 2, 3));
}

#[test]
fn test_ten_crop_mirrors() {
    let img = Image::Grid(pattern(Shape::image(3, 8, 8)));
    let crops = F::ten_crop(&img, (4, 4), false).unwrap();
    assert_eq!(crops.len(), 10);
    // Centre of the mirror is the mirrored centre when the margins are even.
    assert_eq!(crops[9], F::hflip(&crops[4]).unwrap());
    // Top-left of the mirror is the mirrored top-right.
    assert_eq!(crops[5], F::hflip(&crops[1]).unwrap());

    let crops = F::ten_crop(&img, (4, 4), true).unwrap();
    assert_eq!(crops[7], F::vflip(&crops[0]).unwrap());
}

#[test]
fn test_five_crop_too_large() {
    let img = Image::Grid(pattern(Shape::image(1, 4, 4)));
    assert!(matches!(F::five_crop(&img, (5, 2)), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_zero_area_crop_is_identity() {
    let img = Image::Grid(pattern(Shape::image(3, 6, 6)));
    let out = F::crop(&img, 1, 1, 0, 3).unwrap();
    assert_eq!(out, img);
}

#[test]
fn test_hue_on_grayscale_is_identity() {
    let img = Image::Grid(pattern(Shape::image(1, 5, 5)));
    assert_eq!(F::adjust_hue(&img, 0.3).unwrap(), img);
}

#[test]
fn test_autocontrast_flat_image_unchanged() {
    let g = visaug_core::Grid::from_fn(Shape::image(3, 4, 4), DType::U8, |_, _, _| 77.0).unwrap();
    let img = Image::Grid(g);
    assert_eq!(F::autocontrast(&img).unwrap(), img);
}
