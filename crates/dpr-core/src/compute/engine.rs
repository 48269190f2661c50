use std::sync::Arc;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::dpr::displacement::DisplacementField;
use crate::params::Interpolation;

use super::parallel::ParallelEngine;
use super::sequential::SequentialEngine;

/// Array-level operations the DPR transform is built from.
///
/// Every engine must produce the same values up to floating-point
/// rounding; they differ only in how the work is scheduled.
pub trait DprEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Minimum over the square window of half-width `radius` around each
    /// pixel, clipped to the array bounds.
    fn local_minimum(&self, data: &Array2<f32>, radius: usize) -> Array2<f32>;

    /// Resample onto `out_shape` over normalized `[-0.5, 0.5]` coordinates.
    fn resample(
        &self,
        data: &Array2<f32>,
        out_shape: (usize, usize),
        method: Interpolation,
    ) -> Array2<f32>;

    /// Separable Gaussian blur with reflecting boundaries.
    fn gaussian_blur(&self, data: &Array2<f32>, sigma: f32) -> Array2<f32>;

    /// 3x3 Sobel derivative along `axis` with reflecting boundaries.
    fn sobel(&self, data: &Array2<f32>, axis: Axis) -> Array2<f32>;

    /// Move every pixel inside the `border`-wide frame of `source` by its
    /// displacement, splitting it bilinearly over four destinations, and sum
    /// the contributions into a zeroed array of the same shape.
    fn scatter_add(
        &self,
        source: &Array2<f32>,
        field: &DisplacementField,
        border: usize,
    ) -> Array2<f32>;
}

/// Which engine to run the transform on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePreference {
    /// Pick the fastest available engine.
    #[default]
    Auto,
    /// Explicit pixel loops on the calling thread.
    Sequential,
    /// Whole-array operations spread over the Rayon pool.
    Parallel,
}

impl std::fmt::Display for EnginePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Sequential => write!(f, "Sequential"),
            Self::Parallel => write!(f, "Parallel"),
        }
    }
}

pub fn create_engine(preference: &EnginePreference) -> Arc<dyn DprEngine> {
    match preference {
        EnginePreference::Sequential => Arc::new(SequentialEngine),
        EnginePreference::Auto | EnginePreference::Parallel => Arc::new(ParallelEngine),
    }
}
