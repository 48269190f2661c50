use ndarray::{Array2, Axis};

use super::{build_rows, reflect_index};

const SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

/// 3x3 Sobel derivative along `axis` with reflecting boundaries.
///
/// The derivative is the central difference `f[i+1] - f[i-1]` along `axis`,
/// smoothed with `[1, 2, 1]` across it. Positive values point towards
/// increasing index.
pub fn sobel(data: &Array2<f32>, axis: Axis, parallel: bool) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }

    build_rows(h, w, parallel, |row| {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (k, &s) in SMOOTH.iter().enumerate() {
                    let offset = k as isize - 1;
                    let (fwd, back) = if axis == Axis(0) {
                        let c = reflect_index(col as isize + offset, w);
                        let r_fwd = reflect_index(row as isize + 1, h);
                        let r_back = reflect_index(row as isize - 1, h);
                        (data[[r_fwd, c]], data[[r_back, c]])
                    } else {
                        let r = reflect_index(row as isize + offset, h);
                        let c_fwd = reflect_index(col as isize + 1, w);
                        let c_back = reflect_index(col as isize - 1, w);
                        (data[[r, c_fwd]], data[[r, c_back]])
                    };
                    sum += s * (fwd - back);
                }
                sum
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_along_columns() {
        let data = Array2::from_shape_fn((5, 6), |(_, c)| c as f32);
        let gx = sobel(&data, Axis(1), false);
        let gy = sobel(&data, Axis(0), false);
        // Interior: (1 + 2 + 1) * 2 = 8
        assert!((gx[[2, 3]] - 8.0).abs() < 1e-6);
        assert!(gy[[2, 3]].abs() < 1e-6);
        // Reflected edge: f[1] - f[0] = 1 per tap
        assert!((gx[[2, 0]] - 4.0).abs() < 1e-6);
    }
}
