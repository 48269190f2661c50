mod common;

use ndarray::{array, Array2};

use dpr_core::compute::parallel::ParallelEngine;
use dpr_core::compute::sequential::SequentialEngine;
use dpr_core::dpr::background::suppress_background;
use dpr_core::filters::min_filter::{min_filter_naive, min_filter_separable, sliding_min};

use common::noise_frame;

#[test]
fn test_sliding_min_clips_at_edges() {
    let line = [5.0f32, 3.0, 8.0, 1.0, 9.0, 7.0];
    assert_eq!(sliding_min(&line, 1), vec![3.0, 3.0, 1.0, 1.0, 1.0, 7.0]);
    assert_eq!(sliding_min(&line, 0), line.to_vec());
    assert_eq!(sliding_min(&line, 10), vec![1.0; 6]);
}

#[test]
fn test_separable_matches_naive() {
    let data = noise_frame(23, 31, 7, 0.0, 100.0);
    for radius in [0, 1, 2, 5, 40] {
        let naive = min_filter_naive(&data, radius);
        let fast = min_filter_separable(&data, radius, false);
        assert_eq!(naive, fast, "radius {radius}");
    }
}

#[test]
fn test_window_wider_than_frame_is_full_minimum() {
    let data = noise_frame(9, 7, 11, 5.0, 80.0);
    let global = data.iter().copied().fold(f32::INFINITY, f32::min);
    for radius in [7, 9, 1 << 40, usize::MAX] {
        assert!(min_filter_naive(&data, radius).iter().all(|&v| v == global));
        assert!(min_filter_separable(&data, radius, false)
            .iter()
            .all(|&v| v == global));
    }
    assert_eq!(sliding_min(&[4.0, 2.0, 6.0], usize::MAX), vec![2.0; 3]);
}

#[test]
fn test_separable_parallel_matches_sequential() {
    let data = noise_frame(300, 260, 3, 10.0, 50.0);
    assert_eq!(
        min_filter_separable(&data, 4, false),
        min_filter_separable(&data, 4, true)
    );
}

#[test]
fn test_suppressed_non_negative_with_zero_minimum() {
    let data = noise_frame(40, 40, 11, 100.0, 900.0);
    let out = suppress_background(&data, 5, &SequentialEngine);
    assert!(out.suppressed.iter().all(|&v| v >= 0.0));
    assert!(out.shifted.iter().all(|&v| v >= 0.0));
    let min = out.suppressed.iter().copied().fold(f32::INFINITY, f32::min);
    assert_eq!(min, 0.0);
}

#[test]
fn test_global_shift() {
    let data = array![[10.0f32, 12.0], [15.0, 11.0]];
    let out = suppress_background(&data, 0, &SequentialEngine);
    assert_eq!(out.shifted, array![[0.0f32, 2.0], [5.0, 1.0]]);
    // radius 0: every pixel is its own minimum
    assert!(out.is_degenerate());
}

#[test]
fn test_window_clipped_not_padded() {
    // A bright corner must not see anything outside the frame.
    let mut data = Array2::from_elem((5, 5), 4.0f32);
    data[[0, 0]] = 1.0;
    data[[4, 4]] = 9.0;
    let out = suppress_background(&data, 1, &SequentialEngine);
    // (4,4) window covers rows 3..=4, cols 3..=4: min is 4 - 1 = 3 after shift
    assert_eq!(out.local_min[[4, 4]], 3.0);
    assert_eq!(out.suppressed[[4, 4]], 5.0);
    assert_eq!(out.suppressed[[0, 0]], 0.0);
}

#[test]
fn test_flat_frame_is_degenerate() {
    let data = Array2::from_elem((8, 8), 42.0f32);
    let out = suppress_background(&data, 3, &SequentialEngine);
    assert!(out.is_degenerate());
}

#[test]
fn test_engines_agree() {
    let data = noise_frame(50, 60, 5, 0.0, 1000.0);
    let a = suppress_background(&data, 7, &SequentialEngine);
    let b = suppress_background(&data, 7, &ParallelEngine);
    assert_eq!(a.suppressed, b.suppressed);
}
