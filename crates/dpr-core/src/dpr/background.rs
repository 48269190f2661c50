use ndarray::Array2;

use crate::compute::DprEngine;

/// Output of local background suppression. All three arrays share the
/// input frame's shape.
#[derive(Clone, Debug)]
pub struct BackgroundSuppressed {
    /// Input shifted so its global minimum is zero.
    pub shifted: Array2<f32>,
    /// Windowed minimum of `shifted`.
    pub local_min: Array2<f32>,
    /// `shifted - local_min`, non-negative by construction.
    pub suppressed: Array2<f32>,
}

impl BackgroundSuppressed {
    /// True when nothing survived suppression (flat input).
    pub fn is_degenerate(&self) -> bool {
        self.suppressed.iter().all(|&v| v == 0.0)
    }
}

/// Subtract the global minimum, then the local minimum over a
/// `(2 * window_radius + 1)^2` window clipped at the frame edges.
pub fn suppress_background(
    data: &Array2<f32>,
    window_radius: usize,
    engine: &dyn DprEngine,
) -> BackgroundSuppressed {
    let global_min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let offset = if global_min.is_finite() { global_min } else { 0.0 };
    let shifted = data.mapv(|v| v - offset);

    let local_min = engine.local_minimum(&shifted, window_radius);
    let suppressed = ndarray::Zip::from(&shifted)
        .and(&local_min)
        .map_collect(|&v, &m| (v - m).max(0.0));

    BackgroundSuppressed {
        shifted,
        local_min,
        suppressed,
    }
}
