//! Weighted pixel reassignment (scatter-add).
//!
//! Each interior pixel of the padded magnified frame is moved by its
//! displacement. A move of `d` along one axis lands between the integer
//! offsets `trunc(d)` and `trunc(d) + sign(d)`, with weights
//! `1 - |frac(d)|` and `|frac(d)|`; the 2D weights are the products of the
//! two axes, so the four of them sum to one. Contributions are accumulated,
//! never overwritten.

use ndarray::{s, Array2};
use rayon::prelude::*;

use crate::compute::DprEngine;
use crate::consts::{PADDING, PARALLEL_PIXEL_THRESHOLD};

use super::displacement::DisplacementField;
use super::upscale::crop_border;

/// Rows of source pixels handled by one band of the banded scatter.
const SCATTER_BAND_ROWS: usize = 32;

/// `sign(d)` with `sign(0) = 0`.
fn step_sign(d: f32) -> isize {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// The four `(row offset, col offset, weight)` destinations of a move by
/// `(d_row, d_col)`, using truncation towards zero plus a sign step.
pub fn bilinear_weights(d_row: f32, d_col: f32) -> [(isize, isize, f32); 4] {
    let tr = d_row.trunc();
    let tc = d_col.trunc();
    let fr = (d_row - tr).abs();
    let fc = (d_col - tc).abs();
    let (ir, ic) = (tr as isize, tc as isize);
    let (sr, sc) = (step_sign(d_row), step_sign(d_col));

    [
        (ir, ic, (1.0 - fr) * (1.0 - fc)),
        (ir, ic + sc, (1.0 - fr) * fc),
        (ir + sr, ic, fr * (1.0 - fc)),
        (ir + sr, ic + sc, fr * fc),
    ]
}

/// The same four destinations written with floor-based bilinear weights.
/// Both forms distribute identical weights to identical cells.
pub fn bilinear_weights_floor(d_row: f32, d_col: f32) -> [(isize, isize, f32); 4] {
    let fr = d_row.floor();
    let fc = d_col.floor();
    let wr = d_row - fr;
    let wc = d_col - fc;
    let (ir, ic) = (fr as isize, fc as isize);

    [
        (ir, ic, (1.0 - wr) * (1.0 - wc)),
        (ir, ic + 1, (1.0 - wr) * wc),
        (ir + 1, ic, wr * (1.0 - wc)),
        (ir + 1, ic + 1, wr * wc),
    ]
}

/// Row-major scatter over the interior, one pixel at a time.
pub fn scatter_add_sequential(
    source: &Array2<f32>,
    field: &DisplacementField,
    border: usize,
) -> Array2<f32> {
    let (h, w) = source.dim();
    let mut out = Array2::<f32>::zeros((h, w));
    if h <= 2 * border || w <= 2 * border {
        return out;
    }

    for r in border..h - border {
        for c in border..w - border {
            let value = source[[r, c]];
            if value == 0.0 {
                continue;
            }
            let taps = bilinear_weights(field.row[[r, c]], field.col[[r, c]]);
            for (dr, dc, weight) in taps {
                let tr = r as isize + dr;
                let tc = c as isize + dc;
                if tr < 0 || tc < 0 || tr >= h as isize || tc >= w as isize {
                    continue;
                }
                out[[tr as usize, tc as usize]] += weight * value;
            }
        }
    }

    out
}

/// Partition-then-merge scatter: each band of source rows accumulates into a
/// private buffer covering every row it can reach, then the buffers are
/// summed into the output in band order.
pub fn scatter_add_banded(
    source: &Array2<f32>,
    field: &DisplacementField,
    border: usize,
) -> Array2<f32> {
    let (h, w) = source.dim();
    let mut out = Array2::<f32>::zeros((h, w));
    if h <= 2 * border || w <= 2 * border {
        return out;
    }

    let reach = field.max_abs().ceil() as usize + 1;
    let band_starts: Vec<usize> = (border..h - border).step_by(SCATTER_BAND_ROWS).collect();

    let scatter_band = |start: usize| -> (usize, Array2<f32>) {
        let end = (start + SCATTER_BAND_ROWS).min(h - border);
        let top = start.saturating_sub(reach);
        let bottom = (end + reach).min(h);
        let mut local = Array2::<f32>::zeros((bottom - top, w));

        for r in start..end {
            for c in border..w - border {
                let value = source[[r, c]];
                if value == 0.0 {
                    continue;
                }
                let taps = bilinear_weights_floor(field.row[[r, c]], field.col[[r, c]]);
                for (dr, dc, weight) in taps {
                    let tr = r as isize + dr;
                    let tc = c as isize + dc;
                    if tr < top as isize || tc < 0 || tr >= bottom as isize || tc >= w as isize {
                        continue;
                    }
                    local[[tr as usize - top, tc as usize]] += weight * value;
                }
            }
        }

        (top, local)
    };

    let bands: Vec<(usize, Array2<f32>)> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        band_starts.into_par_iter().map(scatter_band).collect()
    } else {
        band_starts.into_iter().map(scatter_band).collect()
    };

    for (top, local) in bands {
        let rows = local.nrows();
        let mut view = out.slice_mut(s![top..top + rows, ..]);
        view += &local;
    }

    out
}

/// Reassign the padded magnified frame with `field`, then crop the
/// `PADDING` border from the result and from the magnified frame.
/// Returns `(reassembled, magnified)`.
pub fn reassemble(
    magnified_padded: &Array2<f32>,
    field: &DisplacementField,
    engine: &dyn DprEngine,
) -> (Array2<f32>, Array2<f32>) {
    let accumulated = engine.scatter_add(magnified_padded, field, PADDING);
    (
        crop_border(&accumulated, PADDING),
        crop_border(magnified_padded, PADDING),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sign_zero() {
        assert_eq!(step_sign(0.0), 0);
        assert_eq!(step_sign(-0.0), 0);
        assert_eq!(step_sign(0.5), 1);
        assert_eq!(step_sign(-2.0), -1);
    }

    #[test]
    fn test_negative_move_splits_between_neighbours() {
        let taps = bilinear_weights(-2.25, 0.0);
        // trunc = -2, sign step to -3
        assert_eq!((taps[0].0, taps[0].1), (-2, 0));
        assert!((taps[0].2 - 0.75).abs() < 1e-6);
        assert_eq!((taps[2].0, taps[2].1), (-3, 0));
        assert!((taps[2].2 - 0.25).abs() < 1e-6);
        assert_eq!(taps[1].2, 0.0);
        assert_eq!(taps[3].2, 0.0);
    }
}
