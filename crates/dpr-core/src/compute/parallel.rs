use ndarray::{Array2, Axis};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::dpr::displacement::DisplacementField;
use crate::dpr::reassign::scatter_add_banded;
use crate::filters::gaussian_blur::gaussian_blur_with;
use crate::filters::interpolate::resample_array;
use crate::filters::min_filter::min_filter_separable;
use crate::filters::sobel::sobel;
use crate::params::Interpolation;

use super::DprEngine;

/// Engine using Rayon for parallelism.
///
/// Filters run row- or column-parallel once the array reaches
/// `PARALLEL_PIXEL_THRESHOLD` pixels. Reassignment always uses the banded
/// scatter, whose merge order is fixed, so results do not depend on the
/// size of the thread pool.
pub struct ParallelEngine;

fn worth_parallel(data: &Array2<f32>) -> bool {
    let (h, w) = data.dim();
    h * w >= PARALLEL_PIXEL_THRESHOLD
}

impl DprEngine for ParallelEngine {
    fn name(&self) -> &str {
        "Parallel/Rayon"
    }

    fn local_minimum(&self, data: &Array2<f32>, radius: usize) -> Array2<f32> {
        min_filter_separable(data, radius, worth_parallel(data))
    }

    fn resample(
        &self,
        data: &Array2<f32>,
        out_shape: (usize, usize),
        method: Interpolation,
    ) -> Array2<f32> {
        let parallel = out_shape.0 * out_shape.1 >= PARALLEL_PIXEL_THRESHOLD;
        resample_array(data, out_shape, method, parallel)
    }

    fn gaussian_blur(&self, data: &Array2<f32>, sigma: f32) -> Array2<f32> {
        gaussian_blur_with(data, sigma, worth_parallel(data))
    }

    fn sobel(&self, data: &Array2<f32>, axis: Axis) -> Array2<f32> {
        sobel(data, axis, worth_parallel(data))
    }

    fn scatter_add(
        &self,
        source: &Array2<f32>,
        field: &DisplacementField,
        border: usize,
    ) -> Array2<f32> {
        scatter_add_banded(source, field, border)
    }
}
