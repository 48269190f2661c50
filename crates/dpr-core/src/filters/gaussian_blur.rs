use ndarray::Array2;

use crate::consts::{GAUSSIAN_TRUNCATE, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Frame;

use super::{build_rows, reflect_index};

/// Apply Gaussian blur to a frame using separable 1D convolution.
pub fn gaussian_blur(frame: &Frame, sigma: f32) -> Frame {
    let blurred = gaussian_blur_array(&frame.data, sigma);
    let mut out = Frame::new(blurred, frame.original_bit_depth);
    out.metadata = frame.metadata.clone();
    out
}

/// Apply Gaussian blur to a raw array, parallelizing large inputs.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let (h, w) = data.dim();
    gaussian_blur_with(data, sigma, h * w >= PARALLEL_PIXEL_THRESHOLD)
}

/// Separable Gaussian blur with reflecting boundaries, kernel truncated at
/// `GAUSSIAN_TRUNCATE` sigmas.
pub fn gaussian_blur_with(data: &Array2<f32>, sigma: f32, parallel: bool) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve_rows(data, &kernel, parallel);
    convolve_cols(&row_pass, &kernel, parallel)
}

pub(crate) fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32], parallel: bool) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = (kernel.len() / 2) as isize;

    build_rows(h, w, parallel, |row| {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let src_col = reflect_index(col as isize + ki as isize - radius, w);
                    sum += data[[row, src_col]] * kv;
                }
                sum
            })
            .collect()
    })
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32], parallel: bool) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = (kernel.len() / 2) as isize;

    build_rows(h, w, parallel, |row| {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let src_row = reflect_index(row as isize + ki as isize - radius, h);
                    sum += data[[src_row, col]] * kv;
                }
                sum
            })
            .collect()
    })
}
