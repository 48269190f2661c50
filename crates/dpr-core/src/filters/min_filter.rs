//! Windowed minimum over a square neighbourhood.
//!
//! The window has half-width `radius` and is clipped to the array, so pixels
//! near the border see a smaller window instead of padded values. Clipping is
//! independent per axis, which makes the 2D minimum separable: a row pass
//! followed by a column pass gives exactly the same result as scanning the
//! full square.

use std::collections::VecDeque;

use ndarray::Array2;

use super::{build_cols, build_rows};

/// Reference implementation: scan the full clipped window for every pixel.
/// O(rows * cols * radius^2).
pub fn min_filter_naive(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    // A window wider than the frame covers all of it.
    let radius = radius.min(h.max(w));

    for row in 0..h {
        let r0 = row.saturating_sub(radius);
        let r1 = (row + radius).min(h - 1);
        for col in 0..w {
            let c0 = col.saturating_sub(radius);
            let c1 = (col + radius).min(w - 1);
            let mut local_min = f32::INFINITY;
            for r in r0..=r1 {
                for c in c0..=c1 {
                    local_min = local_min.min(data[[r, c]]);
                }
            }
            result[[row, col]] = local_min;
        }
    }

    result
}

/// Separable sliding-window minimum, O(rows * cols) regardless of radius.
pub fn min_filter_separable(data: &Array2<f32>, radius: usize, parallel: bool) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }

    let row_pass = build_rows(h, w, parallel, |row| {
        let line: Vec<f32> = data.row(row).iter().copied().collect();
        sliding_min(&line, radius)
    });

    build_cols(h, w, parallel, |col| {
        let line: Vec<f32> = row_pass.column(col).iter().copied().collect();
        sliding_min(&line, radius)
    })
}

/// 1D clipped sliding minimum using a monotonic deque of indices.
pub fn sliding_min(line: &[f32], radius: usize) -> Vec<f32> {
    let n = line.len();
    let radius = radius.min(n);
    let mut out = Vec::with_capacity(n);
    let mut window: VecDeque<usize> = VecDeque::with_capacity(2 * radius + 1);
    let mut next = 0usize;

    for i in 0..n {
        let right = (i + radius).min(n - 1);
        while next <= right {
            while let Some(&back) = window.back() {
                if line[back] >= line[next] {
                    window.pop_back();
                } else {
                    break;
                }
            }
            window.push_back(next);
            next += 1;
        }

        let left = i.saturating_sub(radius);
        while let Some(&front) = window.front() {
            if front < left {
                window.pop_front();
            } else {
                break;
            }
        }

        // The window always holds at least index `right`.
        out.push(window.front().map_or(line[i], |&idx| line[idx]));
    }

    out
}
