pub mod gaussian_blur;
pub mod interpolate;
pub mod min_filter;
pub mod sobel;

use ndarray::Array2;
use rayon::prelude::*;

/// Half-sample symmetric boundary (`d c b a | a b c d | d c b a`).
/// Handles indices any number of periods outside the array.
pub(crate) fn reflect_index(idx: isize, size: usize) -> usize {
    if size == 1 {
        return 0;
    }
    let period = 2 * size as isize;
    let m = idx.rem_euclid(period) as usize;
    if m < size {
        m
    } else {
        2 * size - 1 - m
    }
}

/// Build an `(h, w)` array one row at a time. `row_fn` must return `w` values.
pub(crate) fn build_rows<F>(h: usize, w: usize, parallel: bool, row_fn: F) -> Array2<f32>
where
    F: Fn(usize) -> Vec<f32> + Sync,
{
    let rows: Vec<Vec<f32>> = if parallel {
        (0..h).into_par_iter().map(&row_fn).collect()
    } else {
        (0..h).map(&row_fn).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Build an `(h, w)` array one column at a time. `col_fn` must return `h` values.
pub(crate) fn build_cols<F>(h: usize, w: usize, parallel: bool, col_fn: F) -> Array2<f32>
where
    F: Fn(usize) -> Vec<f32> + Sync,
{
    let cols: Vec<Vec<f32>> = if parallel {
        (0..w).into_par_iter().map(&col_fn).collect()
    } else {
        (0..w).map(&col_fn).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (col, col_data) in cols.into_iter().enumerate() {
        for (row, val) in col_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::reflect_index;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-7, 1), 0);
    }
}
