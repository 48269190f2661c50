//! Validated DPR parameters.
//!
//! A [`ParameterSet`] is built once per stack and never mutated afterwards.
//! The two derived quantities, the background window radius and the grid
//! upscale factor, are pure functions of it, so every frame processed with
//! the same set shares one output geometry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{
    DEFAULT_BACKGROUND_PER_PSF, DEFAULT_GAIN, FWHM_TO_1E_RADIUS, PIXELS_PER_PSF_RADIUS,
};
use crate::error::{DprError, Result};

/// How per-frame reconstructions are combined across the stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMode {
    /// Keep every reconstructed frame.
    #[default]
    None,
    /// Per-pixel arithmetic mean.
    Mean,
    /// Per-pixel population variance.
    #[serde(alias = "var")]
    Variance,
}

impl std::fmt::Display for TemporalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Mean => write!(f, "mean"),
            Self::Variance => write!(f, "var"),
        }
    }
}

impl FromStr for TemporalMode {
    type Err = DprError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "mean" => Ok(Self::Mean),
            "var" | "variance" => Ok(Self::Variance),
            other => Err(DprError::InvalidParameter(format!(
                "unknown temporal mode '{other}' (expected none, mean or var)"
            ))),
        }
    }
}

/// Value of a named parameter override.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Temporal(TemporalMode),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<TemporalMode> for ParamValue {
    fn from(v: TemporalMode) -> Self {
        Self::Temporal(v)
    }
}

impl ParamValue {
    fn as_number(&self, key: &str) -> Result<f64> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                DprError::InvalidParameter(format!("'{key}' expects a number, got '{s}'"))
            }),
            Self::Temporal(t) => Err(DprError::InvalidParameter(format!(
                "'{key}' expects a number, got temporal mode '{t}'"
            ))),
        }
    }

    fn as_temporal(&self) -> Result<TemporalMode> {
        match self {
            Self::Temporal(t) => Ok(*t),
            Self::Text(s) => s.parse(),
            Self::Number(v) => Err(DprError::InvalidParameter(format!(
                "'temporal' expects a mode name, got {v}"
            ))),
        }
    }
}

/// Parameter keys accepted by [`ParameterSet::with_overrides`].
pub const PARAMETER_KEYS: [&str; 3] = ["gain", "background", "temporal"];

/// Validated configuration for one DPR run.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    psf: f64,
    gain: f64,
    background: f64,
    temporal: TemporalMode,
}

impl ParameterSet {
    /// Defaults for the given PSF FWHM: `gain = 1`, `background = ceil(17 * psf)`,
    /// no temporal reduction.
    pub fn new(psf: f64) -> Result<Self> {
        Self::with_overrides::<ParamValue>(psf, &[])
    }

    /// Defaults for `psf`, then apply named overrides. Unknown keys are rejected
    /// before any value is looked at.
    pub fn with_overrides<V>(psf: f64, overrides: &[(&str, V)]) -> Result<Self>
    where
        V: Clone + Into<ParamValue>,
    {
        if let Some((key, _)) = overrides
            .iter()
            .find(|(key, _)| !PARAMETER_KEYS.contains(key))
        {
            return Err(DprError::InvalidParameter(format!(
                "unknown parameter '{key}'"
            )));
        }
        validate_psf(psf)?;

        let mut params = Self {
            psf,
            gain: DEFAULT_GAIN,
            background: (DEFAULT_BACKGROUND_PER_PSF * psf).ceil(),
            temporal: TemporalMode::None,
        };

        for (key, value) in overrides {
            let value: ParamValue = value.clone().into();
            match *key {
                "gain" => params.gain = value.as_number(key)?,
                "background" => params.background = value.as_number(key)?,
                "temporal" => params.temporal = value.as_temporal()?,
                _ => unreachable!("keys checked above"),
            }
        }

        params.validate()?;
        info!(
            psf = params.psf,
            gain = params.gain,
            background = params.background,
            temporal = %params.temporal,
            "DPR parameters"
        );
        Ok(params)
    }

    /// Build from explicit values; `background = None` uses the PSF default.
    pub fn from_values(
        psf: f64,
        gain: f64,
        background: Option<f64>,
        temporal: TemporalMode,
    ) -> Result<Self> {
        let mut overrides: Vec<(&str, ParamValue)> = vec![
            ("gain", gain.into()),
            ("temporal", temporal.into()),
        ];
        if let Some(bg) = background {
            overrides.push(("background", bg.into()));
        }
        Self::with_overrides(psf, overrides.as_slice())
    }

    fn validate(&self) -> Result<()> {
        validate_psf(self.psf)?;
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(DprError::InvalidParameter(format!(
                "gain must be finite and >= 0, got {}",
                self.gain
            )));
        }
        if !self.background.is_finite() || self.background <= 0.0 {
            return Err(DprError::InvalidParameter(format!(
                "background must be finite and > 0, got {}",
                self.background
            )));
        }
        Ok(())
    }

    pub fn psf(&self) -> f64 {
        self.psf
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn background(&self) -> f64 {
        self.background
    }

    pub fn temporal(&self) -> TemporalMode {
        self.temporal
    }

    /// Half-width of the local-minimum window: `ceil(background)`.
    pub fn window_radius(&self) -> usize {
        self.background.ceil() as usize
    }

    /// Grid magnification: `5 / (psf / 1.6651)`.
    pub fn upscale_factor(&self) -> f64 {
        PIXELS_PER_PSF_RADIUS / (self.psf / FWHM_TO_1E_RADIUS)
    }

    /// Displacement multiplier `0.5 * gain + 1`.
    pub fn gain_value(&self) -> f32 {
        (0.5 * self.gain + 1.0) as f32
    }

    /// Unpadded upscaled shape for an input of `(rows, cols)`.
    pub fn upscaled_shape(&self, rows: usize, cols: usize) -> (usize, usize) {
        let psf_radius = self.psf / FWHM_TO_1E_RADIUS;
        (
            (PIXELS_PER_PSF_RADIUS * rows as f64 / psf_radius).round() as usize,
            (PIXELS_PER_PSF_RADIUS * cols as f64 / psf_radius).round() as usize,
        )
    }
}

fn validate_psf(psf: f64) -> Result<()> {
    if !psf.is_finite() || psf <= 0.0 {
        return Err(DprError::InvalidParameter(format!(
            "psf must be finite and > 0, got {psf}"
        )));
    }
    Ok(())
}

/// Interpolation kernel used when resampling onto the finer grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Interpolating natural cubic spline.
    #[default]
    CubicSpline,
    /// Piecewise linear.
    Linear,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CubicSpline => write!(f, "Cubic Spline"),
            Self::Linear => write!(f, "Linear"),
        }
    }
}

/// What to do with displacement components beyond the limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplacementPolicy {
    /// Force to the nearest bound.
    #[default]
    Clamp,
    /// Replace with zero (the pixel keeps its energy in place on that axis).
    Discard,
}

impl std::fmt::Display for DisplacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clamp => write!(f, "Clamp"),
            Self::Discard => write!(f, "Discard"),
        }
    }
}

/// Parameters plus the processing choices that do not change the DPR model.
#[derive(Clone, Debug, PartialEq)]
pub struct DprOptions {
    pub params: ParameterSet,
    /// Resampling of the raw (zero-shifted) channel. The suppressed channel
    /// always uses the cubic spline.
    pub raw_interpolation: Interpolation,
    pub displacement_policy: DisplacementPolicy,
}

impl DprOptions {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            raw_interpolation: Interpolation::default(),
            displacement_policy: DisplacementPolicy::default(),
        }
    }

    pub fn with_raw_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.raw_interpolation = interpolation;
        self
    }

    pub fn with_displacement_policy(mut self, policy: DisplacementPolicy) -> Self {
        self.displacement_policy = policy;
        self
    }
}

impl From<ParameterSet> for DprOptions {
    fn from(params: ParameterSet) -> Self {
        Self::new(params)
    }
}
