use ndarray::{s, Array2};

use crate::compute::DprEngine;
use crate::consts::PADDING;
use crate::error::{DprError, Result};
use crate::params::Interpolation;

/// Both channels after upscaling, clamping and zero padding.
#[derive(Clone, Debug)]
pub struct UpscaledChannels {
    /// Background-suppressed channel (cubic spline), padded.
    pub suppressed: Array2<f32>,
    /// Zero-shifted raw channel, padded.
    pub raw: Array2<f32>,
    /// Upscaled shape before padding.
    pub inner_shape: (usize, usize),
}

/// Resample both channels onto `out_shape`, clamp negative overshoot to zero
/// and add a `PADDING`-wide zero border.
pub fn upscale_channels(
    suppressed: &Array2<f32>,
    shifted: &Array2<f32>,
    out_shape: (usize, usize),
    raw_interpolation: Interpolation,
    engine: &dyn DprEngine,
) -> Result<UpscaledChannels> {
    if suppressed.dim() != shifted.dim() {
        return Err(DprError::ShapeMismatch {
            expected: suppressed.dim(),
            actual: shifted.dim(),
        });
    }
    if out_shape.0 == 0 || out_shape.1 == 0 {
        return Err(DprError::InvalidDimensions {
            rows: out_shape.0,
            cols: out_shape.1,
        });
    }

    let mut suppressed_up = engine.resample(suppressed, out_shape, Interpolation::CubicSpline);
    let mut raw_up = engine.resample(shifted, out_shape, raw_interpolation);
    suppressed_up.mapv_inplace(|v| v.max(0.0));
    raw_up.mapv_inplace(|v| v.max(0.0));

    let suppressed = pad_zero(&suppressed_up, PADDING);
    let raw = pad_zero(&raw_up, PADDING);
    if suppressed.dim() != raw.dim() {
        return Err(DprError::ShapeMismatch {
            expected: suppressed.dim(),
            actual: raw.dim(),
        });
    }

    Ok(UpscaledChannels {
        suppressed,
        raw,
        inner_shape: out_shape,
    })
}

/// Surround `data` with a zero border of width `pad`.
pub fn pad_zero(data: &Array2<f32>, pad: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut padded = Array2::<f32>::zeros((h + 2 * pad, w + 2 * pad));
    padded.slice_mut(s![pad..pad + h, pad..pad + w]).assign(data);
    padded
}

/// Remove a border of width `pad` from every side.
pub fn crop_border(data: &Array2<f32>, pad: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if h <= 2 * pad || w <= 2 * pad {
        return Array2::zeros((h.saturating_sub(2 * pad), w.saturating_sub(2 * pad)));
    }
    data.slice(s![pad..h - pad, pad..w - pad]).to_owned()
}
