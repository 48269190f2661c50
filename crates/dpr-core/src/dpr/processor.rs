use ndarray::Array2;
use tracing::{debug, warn};

use crate::compute::DprEngine;
use crate::error::{DprError, Result};
use crate::frame::Frame;
use crate::params::DprOptions;

use super::background::suppress_background;
use super::displacement::estimate_displacement;
use super::reassign::reassemble;
use super::upscale::upscale_channels;

/// Result of running DPR on one frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Reassigned image, upscaled shape.
    pub reassembled: Array2<f32>,
    /// Zero-shifted input resampled onto the same grid.
    pub magnified: Array2<f32>,
    pub gain: f64,
    pub window_radius: usize,
}

impl FrameOutput {
    pub fn shape(&self) -> (usize, usize) {
        self.reassembled.dim()
    }
}

/// Shape of every per-frame output for inputs of `input_shape`.
pub fn output_shape(options: &DprOptions, input_shape: (usize, usize)) -> (usize, usize) {
    options.params.upscaled_shape(input_shape.0, input_shape.1)
}

/// Run DPR on one frame.
pub fn process_frame(
    frame: &Frame,
    options: &DprOptions,
    engine: &dyn DprEngine,
) -> Result<FrameOutput> {
    process_indexed(&frame.data, frame.metadata.frame_index, options, engine)
}

/// Run DPR on a bare array.
pub fn process_array(
    data: &Array2<f32>,
    options: &DprOptions,
    engine: &dyn DprEngine,
) -> Result<FrameOutput> {
    process_indexed(data, 0, options, engine)
}

fn process_indexed(
    data: &Array2<f32>,
    index: usize,
    options: &DprOptions,
    engine: &dyn DprEngine,
) -> Result<FrameOutput> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return Err(DprError::InvalidDimensions { rows, cols });
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(DprError::InvalidFrame {
            index,
            reason: "contains non-finite samples".into(),
        });
    }

    let params = &options.params;
    let window_radius = params.window_radius();

    let background = suppress_background(data, window_radius, engine);
    if background.is_degenerate() {
        warn!(
            frame = index,
            "Background suppression left an all-zero frame; displacements will be zero"
        );
    }

    let out_shape = output_shape(options, (rows, cols));
    let upscaled = upscale_channels(
        &background.suppressed,
        &background.shifted,
        out_shape,
        options.raw_interpolation,
        engine,
    )?;

    let field = estimate_displacement(
        &upscaled.suppressed,
        params.gain_value(),
        options.displacement_policy,
        engine,
    );
    let (reassembled, magnified) = reassemble(&upscaled.raw, &field, engine);

    debug!(
        frame = index,
        input = ?(rows, cols),
        output = ?reassembled.dim(),
        max_displacement = field.max_abs(),
        engine = engine.name(),
        "Frame reconstructed"
    );

    if reassembled.dim() != out_shape || magnified.dim() != out_shape {
        return Err(DprError::ShapeMismatch {
            expected: out_shape,
            actual: reassembled.dim(),
        });
    }

    Ok(FrameOutput {
        reassembled,
        magnified,
        gain: params.gain(),
        window_radius,
    })
}
