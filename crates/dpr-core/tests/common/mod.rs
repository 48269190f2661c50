#![allow(dead_code)]

use ndarray::Array2;

use dpr_core::params::{DprOptions, ParameterSet, TemporalMode};

/// Deterministic pseudo-random frame with values in `[offset, offset + scale)`.
pub fn noise_frame(rows: usize, cols: usize, seed: u64, offset: f32, scale: f32) -> Array2<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Array2::from_shape_fn((rows, cols), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
        offset + scale * unit
    })
}

/// Smooth blobs on a raised floor, resembling a few fluorescent emitters.
pub fn blob_frame(rows: usize, cols: usize, centers: &[(f32, f32)], sigma: f32) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mut v = 20.0f32;
        for &(cr, cc) in centers {
            let d2 = (r as f32 - cr).powi(2) + (c as f32 - cc).powi(2);
            v += 500.0 * (-d2 / (2.0 * sigma * sigma)).exp();
        }
        v
    })
}

/// All zeros except one pixel.
pub fn spot_frame(rows: usize, cols: usize, at: (usize, usize), value: f32) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros((rows, cols));
    data[at] = value;
    data
}

pub fn options(psf: f64, gain: f64, background: f64, temporal: TemporalMode) -> DprOptions {
    DprOptions::new(ParameterSet::from_values(psf, gain, Some(background), temporal).unwrap())
}

pub fn max_abs_diff(a: &Array2<f32>, b: &Array2<f32>) -> f32 {
    assert_eq!(a.dim(), b.dim());
    a.iter()
        .zip(b.iter())
        .fold(0.0f32, |acc, (x, y)| acc.max((x - y).abs()))
}

pub fn max_value(a: &Array2<f32>) -> f32 {
    a.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}
