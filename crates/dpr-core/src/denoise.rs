//! Optional per-frame pre-denoising, applied before background suppression.

use serde::{Deserialize, Serialize};

use crate::error::{DprError, Result};
use crate::filters::gaussian_blur::gaussian_blur;
use crate::frame::Frame;

/// A shape-preserving `Frame -> Frame` transform.
pub trait Denoiser: Send + Sync {
    fn name(&self) -> &str {
        "custom"
    }

    fn denoise(&self, frame: &Frame) -> Result<Frame>;
}

impl<F> Denoiser for F
where
    F: Fn(&Frame) -> Result<Frame> + Send + Sync,
{
    fn denoise(&self, frame: &Frame) -> Result<Frame> {
        self(frame)
    }
}

/// Gaussian smoothing, a cheap stand-in for heavier denoisers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianDenoiser {
    pub sigma: f32,
}

impl Default for GaussianDenoiser {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl Denoiser for GaussianDenoiser {
    fn name(&self) -> &str {
        "Gaussian"
    }

    fn denoise(&self, frame: &Frame) -> Result<Frame> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(DprError::Denoise(format!(
                "sigma must be finite and >= 0, got {}",
                self.sigma
            )));
        }
        Ok(gaussian_blur(frame, self.sigma))
    }
}

/// Run `denoiser` on `frame`, checking that the shape survives and keeping
/// the input's frame index.
pub fn apply_denoiser(denoiser: &dyn Denoiser, frame: &Frame) -> Result<Frame> {
    let mut out = denoiser.denoise(frame)?;
    if out.shape() != frame.shape() {
        return Err(DprError::ShapeMismatch {
            expected: frame.shape(),
            actual: out.shape(),
        });
    }
    out.metadata = frame.metadata.clone();
    Ok(out)
}
