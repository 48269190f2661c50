mod common;

use approx::assert_abs_diff_eq;
use ndarray::{s, Array2};

use dpr_core::compute::sequential::SequentialEngine;
use dpr_core::dpr::displacement::{estimate_displacement, DisplacementField};
use dpr_core::dpr::reassign::{
    bilinear_weights, bilinear_weights_floor, reassemble, scatter_add_banded,
    scatter_add_sequential,
};
use dpr_core::params::DisplacementPolicy;

use common::{blob_frame, max_abs_diff, noise_frame};

const SAMPLE_MOVES: [f32; 11] = [
    -10.0, -7.75, -2.25, -1.0, -0.3, 0.0, 0.3, 0.999, 1.5, 4.125, 10.0,
];

#[test]
fn test_weights_sum_to_one() {
    for &dr in &SAMPLE_MOVES {
        for &dc in &SAMPLE_MOVES {
            let total: f32 = bilinear_weights(dr, dc).iter().map(|t| t.2).sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-6);
            assert!(bilinear_weights(dr, dc).iter().all(|t| t.2 >= 0.0));
        }
    }
}

#[test]
fn test_trunc_and_floor_forms_agree() {
    for &dr in &SAMPLE_MOVES {
        for &dc in &SAMPLE_MOVES {
            let mut a = Array2::<f32>::zeros((25, 25));
            let mut b = Array2::<f32>::zeros((25, 25));
            for (r, c, w) in bilinear_weights(dr, dc) {
                a[[(12 + r) as usize, (12 + c) as usize]] += w;
            }
            for (r, c, w) in bilinear_weights_floor(dr, dc) {
                b[[(12 + r) as usize, (12 + c) as usize]] += w;
            }
            assert!(max_abs_diff(&a, &b) < 1e-6, "move ({dr}, {dc})");
        }
    }
}

#[test]
fn test_integer_move_lands_exactly() {
    let mut source = Array2::<f32>::zeros((30, 30));
    source[[15, 15]] = 8.0;
    let mut field = DisplacementField::zeros((30, 30));
    field.row[[15, 15]] = -3.0;
    field.col[[15, 15]] = 2.0;

    let out = scatter_add_sequential(&source, &field, 10);
    assert_eq!(out[[12, 17]], 8.0);
    assert_eq!(out.sum(), 8.0);
}

#[test]
fn test_collisions_accumulate() {
    let mut source = Array2::<f32>::zeros((30, 30));
    source[[14, 14]] = 1.0;
    source[[16, 16]] = 2.0;
    let mut field = DisplacementField::zeros((30, 30));
    field.row[[14, 14]] = 1.0;
    field.col[[14, 14]] = 1.0;
    field.row[[16, 16]] = -1.0;
    field.col[[16, 16]] = -1.0;

    let out = scatter_add_sequential(&source, &field, 10);
    assert_eq!(out[[15, 15]], 3.0);
}

#[test]
fn test_border_pixels_not_moved() {
    let mut source = Array2::<f32>::zeros((30, 30));
    source[[2, 2]] = 5.0;
    let field = DisplacementField::zeros((30, 30));
    let out = scatter_add_sequential(&source, &field, 10);
    assert_eq!(out.sum(), 0.0);
}

#[test]
fn test_energy_conserved_within_clamp() {
    let (h, w) = (60, 70);
    let mut source = noise_frame(h, w, 21, 0.0, 10.0);
    source.slice_mut(s![..10, ..]).fill(0.0);
    source.slice_mut(s![h - 10.., ..]).fill(0.0);
    source.slice_mut(s![.., ..10]).fill(0.0);
    source.slice_mut(s![.., w - 10..]).fill(0.0);
    let field = DisplacementField {
        row: noise_frame(h, w, 1, -9.99, 19.98),
        col: noise_frame(h, w, 2, -9.99, 19.98),
    };

    let out = scatter_add_sequential(&source, &field, 10);
    let relative = (out.sum() - source.sum()).abs() / source.sum();
    assert!(relative < 1e-4, "relative energy change {relative}");
}

#[test]
fn test_banded_matches_sequential() {
    // Tall enough for several bands.
    let (h, w) = (140, 50);
    let source = noise_frame(h, w, 4, 0.0, 1.0);
    let field = DisplacementField {
        row: noise_frame(h, w, 5, -10.0, 20.0),
        col: noise_frame(h, w, 6, -10.0, 20.0),
    };
    let a = scatter_add_sequential(&source, &field, 10);
    let b = scatter_add_banded(&source, &field, 10);
    assert!(max_abs_diff(&a, &b) < 1e-4);
}

#[test]
fn test_flat_field_has_no_displacement() {
    let data = Array2::from_elem((40, 40), 7.0f32);
    let field = estimate_displacement(&data, 2.0, DisplacementPolicy::Clamp, &SequentialEngine);
    assert!(field.max_abs() < 1e-4);
}

#[test]
fn test_zero_field_is_zero_displacement() {
    let data = Array2::<f32>::zeros((30, 30));
    let field = estimate_displacement(&data, 2.0, DisplacementPolicy::Clamp, &SequentialEngine);
    assert_eq!(field.max_abs(), 0.0);
}

#[test]
fn test_displacement_points_towards_peak() {
    let data = blob_frame(60, 60, &[(30.0, 30.0)], 4.0).mapv(|v| v - 20.0);
    let field = estimate_displacement(&data, 1.0, DisplacementPolicy::Clamp, &SequentialEngine);
    // Left of the peak: move right; above: move down.
    assert!(field.col[[30, 26]] > 0.0);
    assert!(field.col[[30, 34]] < 0.0);
    assert!(field.row[[26, 30]] > 0.0);
    assert!(field.row[[34, 30]] < 0.0);
}

#[test]
fn test_clamp_bounds_every_component() {
    let data = noise_frame(50, 50, 8, 0.0, 1.0).mapv(|v| if v > 0.9 { 1000.0 * v } else { v });
    for policy in [DisplacementPolicy::Clamp, DisplacementPolicy::Discard] {
        let field = estimate_displacement(&data, 10.0, policy, &SequentialEngine);
        assert!(field.max_abs() <= 10.0);
    }
}

#[test]
fn test_reassemble_crops_both() {
    let source = Array2::from_elem((40, 50), 1.0f32);
    let field = DisplacementField::zeros((40, 50));
    let (reassembled, magnified) = reassemble(&source, &field, &SequentialEngine);
    assert_eq!(reassembled.dim(), (20, 30));
    assert_eq!(magnified.dim(), (20, 30));
    assert!(reassembled.iter().all(|&v| v == 1.0));
}
