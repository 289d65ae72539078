//! Batched input versus element-wise application under each batch policy.

use visaug_core::{Grid, Image, Shape};
use visaug_transforms::{BatchPolicy, RandomState, Transform};

use crate::{catalogue, pattern};

const PER_ELEMENT: [&str; 2] = ["RandomErasing", "AutoAugment"];

fn batch() -> Grid {
    pattern(Shape::batch(4, 3, 20, 24))
}

#[test]
fn test_declared_policies() {
    for t in catalogue() {
        let expected =
            if PER_ELEMENT.contains(&t.name()) { BatchPolicy::PerElement } else { BatchPolicy::Shared };
        assert_eq!(t.batch_policy(), expected, "{}", t.name());
    }
}

#[test]
fn test_shared_draw_matches_reseeded_elements() {
    let input = batch();
    for t in catalogue().into_iter().filter(|t| t.batch_policy() == BatchPolicy::Shared) {
        for seed in [2, 9] {
            let out = t.apply(&Image::Grid(input.clone()), &mut RandomState::new(seed)).unwrap().into_grid();
            assert!(out.is_batched(), "{}", t.name());
            let outs = out.unbind();
            assert_eq!(outs.len(), 4);
            for (i, element) in input.unbind().into_iter().enumerate() {
                let alone = t.apply(&Image::Grid(element), &mut RandomState::new(seed)).unwrap().into_grid();
                assert_eq!(outs[i], alone, "{} element {i} seed {seed}", t.name());
            }
        }
    }
}

#[test]
fn test_per_element_draws_in_batch_order() {
    let input = batch();
    for t in catalogue().into_iter().filter(|t| t.batch_policy() == BatchPolicy::PerElement) {
        let out = t.apply(&Image::Grid(input.clone()), &mut RandomState::new(4)).unwrap().into_grid();

        let mut rs = RandomState::new(4);
        let sequential: Vec<Grid> = input
            .unbind()
            .into_iter()
            .map(|element| t.apply(&Image::Grid(element), &mut rs).unwrap().into_grid())
            .collect();
        assert_eq!(out, Grid::stack(&sequential).unwrap(), "{}", t.name());
    }
}

#[test]
fn test_per_element_elements_can_differ() {
    // Same image repeated: shared draws keep copies equal, per-element ones need not.
    let single = pattern(Shape::image(3, 20, 24));
    let repeated = Grid::stack(&vec![single; 6]).unwrap();
    let erasing = catalogue().into_iter().find(|t| t.name() == "RandomErasing").unwrap();
    let out = erasing.apply(&Image::Grid(repeated), &mut RandomState::new(1)).unwrap().into_grid();
    let items = out.unbind();
    assert!(items.iter().any(|g| *g != items[0]));
}

#[test]
fn test_combinator_reports_merged_policy() {
    let erasing = catalogue().into_iter().find(|t| t.name() == "RandomErasing").unwrap();
    let flip: Transform = visaug_transforms::RandomHorizontalFlip::default().into();
    assert_eq!(Transform::compose(vec![flip.clone()]).batch_policy(), BatchPolicy::Shared);
    assert_eq!(Transform::compose(vec![flip, erasing]).batch_policy(), BatchPolicy::PerElement);
}
