//! Gradient-driven sub-pixel displacement estimation.
//!
//! The suppressed channel is first divided by a wide Gaussian blur of itself,
//! which flattens slow illumination changes. The Sobel gradient of that
//! normalized image, divided again by the normalized intensity, gives a
//! scale-free direction towards brighter structure. Scaled by the gain it
//! becomes the distance each upscaled pixel's energy is moved.

use ndarray::{Array2, Axis, Zip};

use crate::compute::DprEngine;
use crate::consts::{DISPLACEMENT_LIMIT, EPSILON, NORMALIZATION_SIGMA};
use crate::params::DisplacementPolicy;

/// Per-pixel displacement in upscaled pixels.
#[derive(Clone, Debug)]
pub struct DisplacementField {
    /// Displacement along axis 0 (down the rows).
    pub row: Array2<f32>,
    /// Displacement along axis 1 (across the columns).
    pub col: Array2<f32>,
}

impl DisplacementField {
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            row: Array2::zeros(shape),
            col: Array2::zeros(shape),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.row.dim()
    }

    /// Largest absolute component over both axes.
    pub fn max_abs(&self) -> f32 {
        self.row
            .iter()
            .chain(self.col.iter())
            .fold(0.0f32, |acc, &v| acc.max(v.abs()))
    }
}

/// `data / (blur(data, NORMALIZATION_SIGMA) + EPSILON)`.
pub fn normalize_local(data: &Array2<f32>, engine: &dyn DprEngine) -> Array2<f32> {
    let smoothed = engine.gaussian_blur(data, NORMALIZATION_SIGMA);
    Zip::from(data)
        .and(&smoothed)
        .map_collect(|&v, &s| v / (s + EPSILON))
}

/// Apply the limit policy to one displacement component.
pub fn limit_displacement(value: f32, policy: DisplacementPolicy) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    match policy {
        DisplacementPolicy::Clamp => value.clamp(-DISPLACEMENT_LIMIT, DISPLACEMENT_LIMIT),
        DisplacementPolicy::Discard => {
            if value.abs() > DISPLACEMENT_LIMIT {
                0.0
            } else {
                value
            }
        }
    }
}

/// Estimate the displacement field from the padded, upscaled suppressed
/// channel. `gain_value` is `0.5 * gain + 1`.
pub fn estimate_displacement(
    suppressed_up: &Array2<f32>,
    gain_value: f32,
    policy: DisplacementPolicy,
    engine: &dyn DprEngine,
) -> DisplacementField {
    let normalized = normalize_local(suppressed_up, engine);
    let grad_row = engine.sobel(&normalized, Axis(0));
    let grad_col = engine.sobel(&normalized, Axis(1));

    let to_displacement = |g: &f32, n: &f32| {
        let gradient = g / (n + EPSILON);
        limit_displacement(gain_value * gradient, policy)
    };

    DisplacementField {
        row: Zip::from(&grad_row)
            .and(&normalized)
            .map_collect(to_displacement),
        col: Zip::from(&grad_col)
            .and(&normalized)
            .map_collect(to_displacement),
    }
}
