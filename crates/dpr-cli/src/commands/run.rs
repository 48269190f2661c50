use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use dpr_core::compute::{create_engine, EnginePreference};
use dpr_core::params::{DisplacementPolicy, Interpolation, TemporalMode};
use dpr_core::pipeline::config::{DenoiseConfig, PipelineConfig};
use dpr_core::pipeline::run_pipeline;
use dpr_core::stack::TemporalOutput;
use tracing::debug;

use crate::progress::BarReporter;
use crate::summary::{print_pipeline_summary, print_result_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum TemporalArg {
    None,
    Mean,
    Var,
}

impl From<TemporalArg> for TemporalMode {
    fn from(arg: TemporalArg) -> Self {
        match arg {
            TemporalArg::None => TemporalMode::None,
            TemporalArg::Mean => TemporalMode::Mean,
            TemporalArg::Var => TemporalMode::Variance,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EngineArg {
    Auto,
    Sequential,
    Parallel,
}

impl From<EngineArg> for EnginePreference {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => EnginePreference::Auto,
            EngineArg::Sequential => EnginePreference::Sequential,
            EngineArg::Parallel => EnginePreference::Parallel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InterpolationArg {
    Cubic,
    Linear,
}

impl From<InterpolationArg> for Interpolation {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Cubic => Interpolation::CubicSpline,
            InterpolationArg::Linear => Interpolation::Linear,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Clamp,
    Discard,
}

impl From<PolicyArg> for DisplacementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Clamp => DisplacementPolicy::Clamp,
            PolicyArg::Discard => DisplacementPolicy::Discard,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Input stack (multi-page TIFF) or single image
    pub file: Option<PathBuf>,

    /// Pipeline config file (TOML); other flags are ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// PSF full width at half maximum, in input pixels
    #[arg(long)]
    pub psf: Option<f64>,

    /// Displacement gain
    #[arg(long, default_value = "1")]
    pub gain: f64,

    /// Local-minimum window radius [default: ceil(17 * psf)]
    #[arg(long)]
    pub background: Option<f64>,

    /// Temporal reduction across frames
    #[arg(long, value_enum, default_value = "none")]
    pub temporal: TemporalArg,

    /// Execution engine
    #[arg(long, value_enum, default_value = "auto")]
    pub engine: EngineArg,

    /// Resampling for the raw channel
    #[arg(long, value_enum, default_value = "cubic")]
    pub raw_interpolation: InterpolationArg,

    /// Handling of displacements beyond +-10 pixels
    #[arg(long, value_enum, default_value = "clamp")]
    pub policy: PolicyArg,

    /// Gaussian pre-denoise sigma (disabled when absent)
    #[arg(long)]
    pub denoise_sigma: Option<f32>,

    /// Also save the mean magnified frame here
    #[arg(long)]
    pub save_magnified: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "dpr.tif")]
    pub output: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)?
    };

    debug!(?config, "Resolved pipeline config");
    let engine = create_engine(&config.engine);
    print_pipeline_summary(&config, engine.name());

    let reporter = Arc::new(BarReporter::new());
    let output = run_pipeline(&config, reporter)
        .with_context(|| format!("DPR failed for {}", config.input.display()))?;

    print_result_summary(&output);
    match &output.result.output {
        TemporalOutput::Stack(frames) if output.written.len() > 1 => {
            println!("\n{} frames saved next to {}", frames.len(), config.output.display());
        }
        _ => println!("\nOutput saved to {}", config.output.display()),
    }
    if let Some(ref path) = output.magnified_path {
        println!("Magnified mean saved to {}", path.display());
    }

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> Result<PipelineConfig> {
    let Some(ref input) = args.file else {
        bail!("an input file is required unless --config is given");
    };
    let Some(psf) = args.psf else {
        bail!("--psf is required unless --config is given");
    };

    Ok(PipelineConfig {
        input: input.clone(),
        output: args.output.clone(),
        psf,
        gain: args.gain,
        background: args.background,
        temporal: args.temporal.into(),
        engine: args.engine.into(),
        raw_interpolation: args.raw_interpolation.into(),
        displacement_policy: args.policy.into(),
        save_magnified: args.save_magnified.clone(),
        denoise: args.denoise_sigma.map(|sigma| DenoiseConfig::Gaussian { sigma }),
    })
}
