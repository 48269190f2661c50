use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compute::EnginePreference;
use crate::consts::DEFAULT_GAIN;
use crate::denoise::{Denoiser, GaussianDenoiser};
use crate::error::Result;
use crate::params::{DisplacementPolicy, DprOptions, Interpolation, ParameterSet, TemporalMode};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Reconstruction output. With temporal mode `none` and a non-TIFF
    /// extension, one file per frame is written next to it.
    pub output: PathBuf,
    /// PSF full width at half maximum, in input pixels.
    pub psf: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// Local-minimum window radius; defaults to `ceil(17 * psf)`.
    #[serde(default)]
    pub background: Option<f64>,
    #[serde(default)]
    pub temporal: TemporalMode,
    #[serde(default)]
    pub engine: EnginePreference,
    #[serde(default)]
    pub raw_interpolation: Interpolation,
    #[serde(default)]
    pub displacement_policy: DisplacementPolicy,
    /// Where to write the mean of the magnified frames, if anywhere.
    pub save_magnified: Option<PathBuf>,
    pub denoise: Option<DenoiseConfig>,
}

fn default_gain() -> f64 {
    DEFAULT_GAIN
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.tif"),
            output: PathBuf::from("dpr.tif"),
            psf: 4.0,
            gain: DEFAULT_GAIN,
            background: None,
            temporal: TemporalMode::default(),
            engine: EnginePreference::default(),
            raw_interpolation: Interpolation::default(),
            displacement_policy: DisplacementPolicy::default(),
            save_magnified: None,
            denoise: None,
        }
    }
}

impl PipelineConfig {
    /// Validate the DPR parameters and bundle them with the processing
    /// choices.
    pub fn options(&self) -> Result<DprOptions> {
        let params =
            ParameterSet::from_values(self.psf, self.gain, self.background, self.temporal)?;
        Ok(DprOptions::new(params)
            .with_raw_interpolation(self.raw_interpolation)
            .with_displacement_policy(self.displacement_policy))
    }
}

/// Pre-denoising applied to every frame before reconstruction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DenoiseConfig {
    Gaussian { sigma: f32 },
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self::Gaussian { sigma: 1.0 }
    }
}

impl DenoiseConfig {
    pub fn build(&self) -> Arc<dyn Denoiser> {
        match self {
            Self::Gaussian { sigma } => Arc::new(GaussianDenoiser { sigma: *sigma }),
        }
    }
}
