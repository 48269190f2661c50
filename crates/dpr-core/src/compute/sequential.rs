use ndarray::{Array2, Axis};

use crate::dpr::displacement::DisplacementField;
use crate::dpr::reassign::scatter_add_sequential;
use crate::filters::gaussian_blur::gaussian_blur_with;
use crate::filters::interpolate::resample_array;
use crate::filters::min_filter::min_filter_separable;
use crate::filters::sobel::sobel;
use crate::params::Interpolation;

use super::DprEngine;

/// Single-threaded engine: every stage is an explicit loop over pixels on
/// the calling thread, and reassignment visits pixels in row-major order.
pub struct SequentialEngine;

impl DprEngine for SequentialEngine {
    fn name(&self) -> &str {
        "Sequential"
    }

    fn local_minimum(&self, data: &Array2<f32>, radius: usize) -> Array2<f32> {
        min_filter_separable(data, radius, false)
    }

    fn resample(
        &self,
        data: &Array2<f32>,
        out_shape: (usize, usize),
        method: Interpolation,
    ) -> Array2<f32> {
        resample_array(data, out_shape, method, false)
    }

    fn gaussian_blur(&self, data: &Array2<f32>, sigma: f32) -> Array2<f32> {
        gaussian_blur_with(data, sigma, false)
    }

    fn sobel(&self, data: &Array2<f32>, axis: Axis) -> Array2<f32> {
        sobel(data, axis, false)
    }

    fn scatter_add(
        &self,
        source: &Array2<f32>,
        field: &DisplacementField,
        border: usize,
    ) -> Array2<f32> {
        scatter_add_sequential(source, field, border)
    }
}
