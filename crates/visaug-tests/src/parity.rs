//! Packed versus grid encodings through the functional entry points.

use approx::assert_abs_diff_eq;
use visaug_core::{Fill, Image, Shape};
use visaug_ops::functional as F;
use visaug_ops::PaddingMode;

use crate::{packed_pattern, pattern};

type Op = Box<dyn Fn(&Image) -> visaug_core::Result<Image>>;

fn op(f: impl Fn(&Image) -> visaug_core::Result<Image> + 'static) -> Op {
    Box::new(f)
}

fn deterministic_ops() -> Vec<(&'static str, Op)> {
    vec![
        ("hflip", op(F::hflip)),
        ("vflip", op(F::vflip)),
        ("invert", op(F::invert)),
        ("crop", op(|img: &Image| F::crop(img, 2, 3, 7, 9))),
        ("crop_outside", op(|img: &Image| F::crop(img, -2, 10, 6, 8))),
        ("pad_constant", op(|img: &Image| F::pad(img, &[1, 2, 3, 4], &Fill::Scalar(9.0), PaddingMode::Constant))),
        ("pad_reflect", op(|img: &Image| F::pad(img, &[2], &Fill::default(), PaddingMode::Reflect))),
        ("pad_edge", op(|img: &Image| F::pad(img, &[3, 1], &Fill::default(), PaddingMode::Edge))),
        ("pad_symmetric", op(|img: &Image| F::pad(img, &[2, 2], &Fill::default(), PaddingMode::Symmetric))),
        ("posterize", op(|img: &Image| F::posterize(img, 3))),
        ("solarize", op(|img: &Image| F::solarize(img, 128.0))),
    ]
}

#[test]
fn test_deterministic_ops_pixel_identical() {
    for channels in [1, 3, 4] {
        let packed = Image::Packed(packed_pattern(channels, 12, 15));
        let grid = Image::Grid(pattern(Shape::image(channels, 12, 15)));
        for (name, apply) in deterministic_ops() {
            let a = apply(&packed).unwrap();
            let b = apply(&grid).unwrap();
            assert!(a.is_packed(), "{name} should keep the packed encoding");
            assert!(!b.is_packed());
            assert_eq!(a.to_grid(), b.to_grid(), "{name} differs for {channels} channels");
        }
    }
}

#[test]
fn test_float_heavy_ops_within_tolerance() {
    let packed = Image::Packed(packed_pattern(3, 10, 10));
    let grid = Image::Grid(pattern(Shape::image(3, 10, 10)));
    let ops: Vec<(&str, Op)> = vec![
        ("brightness", op(|img: &Image| F::adjust_brightness(img, 1.3))),
        ("contrast", op(|img: &Image| F::adjust_contrast(img, 0.6))),
        ("saturation", op(|img: &Image| F::adjust_saturation(img, 1.7))),
        ("hue", op(|img: &Image| F::adjust_hue(img, 0.2))),
        ("sharpness", op(|img: &Image| F::adjust_sharpness(img, 2.0))),
        ("autocontrast", op(F::autocontrast)),
        ("grayscale", op(|img: &Image| F::rgb_to_grayscale(img, 3))),
        ("equalize", op(F::equalize)),
    ];
    for (name, apply) in ops {
        let a = apply(&packed).unwrap().to_grid().to_f64_vec();
        let b = apply(&grid).unwrap().to_grid().to_f64_vec();
        assert_eq!(a.len(), b.len(), "{name}");
        for (x, y) in a.iter().zip(&b) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1.0);
        }
    }
}

#[test]
fn test_geometric_ops_agree() {
    let packed = Image::Packed(packed_pattern(3, 16, 12));
    let grid = Image::Grid(pattern(Shape::image(3, 16, 12)));
    let a = F::resize(&packed, &[8], visaug_ops::Interpolation::Bilinear, None).unwrap();
    let b = F::resize(&grid, &[8], visaug_ops::Interpolation::Bilinear, None).unwrap();
    assert_eq!(a.to_grid(), b.to_grid());

    let fill = Fill::Scalar(0.0);
    let a = F::rotate(&packed, 30.0, visaug_ops::Interpolation::Nearest, true, None, &fill).unwrap();
    let b = F::rotate(&grid, 30.0, visaug_ops::Interpolation::Nearest, true, None, &fill).unwrap();
    assert_eq!(a.to_grid(), b.to_grid());
}

#[test]
fn test_five_crop_keeps_encoding() {
    let packed = Image::Packed(packed_pattern(3, 9, 9));
    let crops = F::five_crop(&packed, (4, 4)).unwrap();
    assert!(crops.iter().all(Image::is_packed));
}
