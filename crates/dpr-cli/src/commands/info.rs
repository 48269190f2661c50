use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dpr_core::dpr::output_shape;
use dpr_core::io::load_stack;
use dpr_core::params::{DprOptions, ParameterSet};

#[derive(Args)]
pub struct InfoArgs {
    /// Input stack (multi-page TIFF) or single image
    pub file: PathBuf,

    /// Show the derived geometry for this PSF
    #[arg(long)]
    pub psf: Option<f64>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let stack = load_stack(&args.file)?;
    let (rows, cols) = stack.frame_shape();
    let bit_depth = stack.frames()[0].original_bit_depth;

    let (min, max) = stack
        .iter()
        .flat_map(|f| f.data.iter())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    println!("File:        {}", args.file.display());
    println!("Frames:      {}", stack.len());
    println!("Dimensions:  {}x{}", cols, rows);
    println!("Bit depth:   {}", bit_depth);
    println!("Range:       {} .. {}", min, max);

    let data_mb = (rows * cols * stack.len() * std::mem::size_of::<f32>()) as f64
        / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", data_mb);

    if let Some(psf) = args.psf {
        let params = ParameterSet::new(psf)?;
        let (out_rows, out_cols) = output_shape(&DprOptions::new(params.clone()), (rows, cols));
        println!();
        println!("PSF:         {}", psf);
        println!("Upscale:     {:.4}x", params.upscale_factor());
        println!("Window:      {} px", params.window_radius());
        println!("Output:      {}x{}", out_cols, out_rows);
    }

    Ok(())
}
