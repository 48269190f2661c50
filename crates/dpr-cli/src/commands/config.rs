use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dpr_core::pipeline::config::{DenoiseConfig, PipelineConfig};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include a Gaussian pre-denoise section
    #[arg(long)]
    pub with_denoise: bool,
}

/// Print or save a default PipelineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = PipelineConfig {
        save_magnified: Some(PathBuf::from("magnified.tif")),
        denoise: args.with_denoise.then(DenoiseConfig::default),
        ..PipelineConfig::default()
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
