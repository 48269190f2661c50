//! Separable resampling between grids whose sample coordinates both span
//! `[-0.5, 0.5]` on each axis (`linspace(-0.5, 0.5, n)`).
//!
//! The cubic variant is an interpolating natural spline: it passes through
//! every input sample and has zero curvature at both ends. Applying it along
//! columns and then along rows gives the tensor-product spline surface.

use ndarray::Array2;

use crate::params::Interpolation;

use super::{build_cols, build_rows};

/// Precomputed 1D resampling from `n` to `m` samples.
#[derive(Clone, Debug)]
pub struct LineResampler {
    n: usize,
    method: Interpolation,
    /// For each output sample: left input index and fractional offset.
    taps: Vec<(usize, f64)>,
    /// Thomas-algorithm factors for the interior spline system.
    inv_denom: Vec<f64>,
}

impl LineResampler {
    pub fn new(n: usize, m: usize, method: Interpolation) -> Self {
        let taps = (0..m)
            .map(|j| {
                if n < 2 {
                    return (0, 0.0);
                }
                let u = if m > 1 {
                    j as f64 * (n - 1) as f64 / (m - 1) as f64
                } else {
                    0.0
                };
                let k = (u.floor() as usize).min(n - 2);
                (k, u - k as f64)
            })
            .collect();

        let interior = n.saturating_sub(2);
        let mut inv_denom = Vec::with_capacity(interior);
        let mut c_prev = 0.0f64;
        for _ in 0..interior {
            let inv = 1.0 / (4.0 - c_prev);
            inv_denom.push(inv);
            c_prev = inv;
        }

        Self {
            n,
            method,
            taps,
            inv_denom,
        }
    }

    pub fn output_len(&self) -> usize {
        self.taps.len()
    }

    /// Resample one line of `n` values into `m` values.
    pub fn apply(&self, line: &[f32]) -> Vec<f32> {
        debug_assert_eq!(line.len(), self.n);
        if self.n == 0 {
            return vec![0.0; self.taps.len()];
        }
        if self.n == 1 {
            return vec![line[0]; self.taps.len()];
        }

        let y: Vec<f64> = line.iter().map(|&v| v as f64).collect();
        let curvature = match self.method {
            Interpolation::CubicSpline if self.n > 2 => Some(self.second_derivatives(&y)),
            _ => None,
        };
        let h = 1.0 / (self.n - 1) as f64;

        self.taps
            .iter()
            .map(|&(k, t)| {
                let linear = (1.0 - t) * y[k] + t * y[k + 1];
                let value = match &curvature {
                    Some(m) => {
                        let s = 1.0 - t;
                        linear + h * h / 6.0 * ((s * s * s - s) * m[k] + (t * t * t - t) * m[k + 1])
                    }
                    None => linear,
                };
                value as f32
            })
            .collect()
    }

    /// Second derivatives of the natural spline through `y`, with `M[0] = M[n-1] = 0`.
    fn second_derivatives(&self, y: &[f64]) -> Vec<f64> {
        let n = self.n;
        let h = 1.0 / (n - 1) as f64;
        let scale = 6.0 / (h * h);
        let interior = n - 2;

        // Forward sweep for M[i-1] + 4 M[i] + M[i+1] = rhs[i], i = 1..n-1.
        let mut d = vec![0.0f64; interior];
        let mut d_prev = 0.0f64;
        for i in 0..interior {
            let rhs = scale * (y[i + 2] - 2.0 * y[i + 1] + y[i]);
            d[i] = (rhs - d_prev) * self.inv_denom[i];
            d_prev = d[i];
        }

        let mut m = vec![0.0f64; n];
        let mut next = 0.0f64;
        for i in (0..interior).rev() {
            let value = d[i] - self.inv_denom[i] * next;
            m[i + 1] = value;
            next = value;
        }
        m
    }
}

/// Resample a 2D array onto an `(out_h, out_w)` grid.
pub fn resample_array(
    data: &Array2<f32>,
    out_shape: (usize, usize),
    method: Interpolation,
    parallel: bool,
) -> Array2<f32> {
    let (h, w) = data.dim();
    let (out_h, out_w) = out_shape;

    let along_cols = LineResampler::new(w, out_w, method);
    let widened = build_rows(h, out_w, parallel, |row| {
        let line: Vec<f32> = data.row(row).iter().copied().collect();
        along_cols.apply(&line)
    });

    let along_rows = LineResampler::new(h, out_h, method);
    build_cols(out_h, out_w, parallel, |col| {
        let line: Vec<f32> = widened.column(col).iter().copied().collect();
        along_rows.apply(&line)
    })
}
