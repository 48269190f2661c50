use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::info;

use crate::compute::create_engine;
use crate::denoise::{apply_denoiser, Denoiser};
use crate::error::Result;
use crate::frame::{Frame, ImageStack};
use crate::io::{is_tiff, load_stack, save_image, save_stack};
use crate::stack::{StackReducer, StackResult, TemporalOutput};

use super::config::PipelineConfig;
use super::types::{CancelFlag, PipelineOutput, PipelineStage, ProgressReporter};

/// Run the full pipeline: load, optionally denoise, reconstruct, reduce and
/// write.
pub fn run_pipeline(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput> {
    run_pipeline_with_cancel(config, reporter, None)
}

/// [`run_pipeline`] with a cancellation flag checked between frames.
pub fn run_pipeline_with_cancel(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
    cancel: Option<&CancelFlag>,
) -> Result<PipelineOutput> {
    // Reject bad parameters before touching the filesystem.
    let options = config.options()?;
    let engine = create_engine(&config.engine);

    let stack = load_input(&config.input, reporter.as_ref())?;
    let input_shape = stack.frame_shape();
    let frame_count = stack.len();
    info!(
        frames = frame_count,
        rows = input_shape.0,
        cols = input_shape.1,
        engine = engine.name(),
        "Input loaded"
    );

    let stack = match &config.denoise {
        Some(denoise) => denoise_stack(stack, denoise.build().as_ref(), reporter.as_ref())?,
        None => stack,
    };

    let result = StackReducer::new(options, engine)
        .with_expected_frames(frame_count)
        .run_parallel(&stack, reporter.as_ref(), cancel)?;

    reporter.begin_stage(PipelineStage::Writing, None);
    let written = write_outputs(&result, &config.output)?;
    let magnified_path = match &config.save_magnified {
        Some(path) => {
            save_image(&result.magnified_mean()?, path)?;
            Some(path.clone())
        }
        None => None,
    };
    reporter.finish_stage();

    info!(
        files = written.len(),
        output = %config.output.display(),
        "Pipeline complete"
    );

    Ok(PipelineOutput {
        result,
        written,
        magnified_path,
        input_shape,
        frame_count,
    })
}

/// Load the input stack under the `Reading` stage.
pub fn load_input(path: &Path, reporter: &dyn ProgressReporter) -> Result<ImageStack> {
    reporter.begin_stage(PipelineStage::Reading, None);
    let stack = load_stack(path);
    reporter.finish_stage();
    stack
}

fn denoise_stack(
    stack: ImageStack,
    denoiser: &dyn Denoiser,
    reporter: &dyn ProgressReporter,
) -> Result<ImageStack> {
    let total = stack.len();
    info!(denoiser = denoiser.name(), frames = total, "Denoising frames");
    reporter.begin_stage(PipelineStage::Denoising, Some(total));
    let done = AtomicUsize::new(0);
    let frames: Result<Vec<Frame>> = stack
        .into_frames()
        .into_par_iter()
        .map(|frame| {
            let cleaned = apply_denoiser(denoiser, &frame)?;
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            Ok(cleaned)
        })
        .collect();
    reporter.finish_stage();
    ImageStack::new(frames?)
}

/// Write the temporal output to `output`. A per-frame output goes to a
/// multi-page TIFF, or to numbered files for other formats.
pub fn write_outputs(result: &StackResult, output: &Path) -> Result<Vec<PathBuf>> {
    match &result.output {
        TemporalOutput::Reduced(image) => {
            save_image(image, output)?;
            Ok(vec![output.to_path_buf()])
        }
        TemporalOutput::Stack(frames) if is_tiff(output) => {
            save_stack(frames, output)?;
            Ok(vec![output.to_path_buf()])
        }
        TemporalOutput::Stack(frames) => {
            let mut written = Vec::with_capacity(frames.len());
            for (i, frame) in frames.iter().enumerate() {
                let path = numbered_path(output, i);
                save_image(frame, &path)?;
                written.push(path);
            }
            Ok(written)
        }
    }
}

/// `out/name.png` -> `out/name_0003.png`.
fn numbered_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".into());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{index:04}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index:04}"),
    };
    path.with_file_name(name)
}
