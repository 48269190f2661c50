use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::compute::DprEngine;
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::denoise::{apply_denoiser, Denoiser};
use crate::dpr::{process_frame, FrameOutput};
use crate::error::{DprError, Result};
use crate::frame::{Frame, ImageStack};
use crate::params::{DprOptions, TemporalMode};
use crate::pipeline::{CancelFlag, NoOpReporter, PipelineStage, ProgressReporter};

use super::temporal::{temporal_mean, TemporalAccumulator};

/// Lifecycle of a [`StackReducer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReducerState {
    /// No frame accepted yet; shapes unknown.
    Initializing,
    Accumulating,
    Reducing,
    Done,
}

/// Temporal output of a stack reconstruction.
#[derive(Clone, Debug)]
pub enum TemporalOutput {
    /// One image: per-pixel mean or variance over the stack.
    Reduced(Array2<f32>),
    /// One reassembled image per input frame, in stack order.
    Stack(Vec<Array2<f32>>),
}

impl TemporalOutput {
    /// Number of images held.
    pub fn len(&self) -> usize {
        match self {
            Self::Reduced(_) => 1,
            Self::Stack(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct StackResult {
    pub output: TemporalOutput,
    /// Magnified frames, always one per input frame.
    pub magnified: Vec<Array2<f32>>,
    pub temporal: TemporalMode,
}

impl StackResult {
    pub fn frame_count(&self) -> usize {
        self.magnified.len()
    }

    pub fn output_shape(&self) -> (usize, usize) {
        self.magnified.first().map(|m| m.dim()).unwrap_or((0, 0))
    }

    /// Mean of the magnified frames, for side-by-side comparison with a
    /// reduced reconstruction.
    pub fn magnified_mean(&self) -> Result<Array2<f32>> {
        temporal_mean(&self.magnified)
    }
}

/// Runs DPR over frames in stack order and applies the temporal reduction.
pub struct StackReducer {
    options: DprOptions,
    engine: Arc<dyn DprEngine>,
    denoiser: Option<Arc<dyn Denoiser>>,
    state: ReducerState,
    input_shape: Option<(usize, usize)>,
    output_shape: Option<(usize, usize)>,
    expected_frames: usize,
    accumulator: Option<TemporalAccumulator>,
    reassembled: Vec<Array2<f32>>,
    magnified: Vec<Array2<f32>>,
}

impl StackReducer {
    pub fn new(options: DprOptions, engine: Arc<dyn DprEngine>) -> Self {
        Self {
            options,
            engine,
            denoiser: None,
            state: ReducerState::Initializing,
            input_shape: None,
            output_shape: None,
            expected_frames: 0,
            accumulator: None,
            reassembled: Vec::new(),
            magnified: Vec::new(),
        }
    }

    /// Apply `denoiser` to every frame before reconstruction.
    pub fn with_denoiser(mut self, denoiser: Arc<dyn Denoiser>) -> Self {
        self.denoiser = Some(denoiser);
        self
    }

    /// Reserve storage for `n` frames once the output shape is known.
    pub fn with_expected_frames(mut self, n: usize) -> Self {
        self.expected_frames = n;
        self
    }

    pub fn state(&self) -> ReducerState {
        self.state
    }

    pub fn options(&self) -> &DprOptions {
        &self.options
    }

    /// Output shape, known once the first frame has been accepted.
    pub fn output_shape(&self) -> Option<(usize, usize)> {
        self.output_shape
    }

    pub fn frames_processed(&self) -> usize {
        self.magnified.len()
    }

    /// Denoise (if configured) and reconstruct one frame without touching
    /// the accumulated state.
    pub fn process(&self, frame: &Frame) -> Result<FrameOutput> {
        match &self.denoiser {
            Some(denoiser) => {
                let cleaned = apply_denoiser(denoiser.as_ref(), frame)?;
                process_frame(&cleaned, &self.options, self.engine.as_ref())
            }
            None => process_frame(frame, &self.options, self.engine.as_ref()),
        }
    }

    /// Reconstruct `frame` and accumulate it.
    pub fn push(&mut self, frame: &Frame) -> Result<()> {
        self.check_input(frame)?;
        let output = self.process(frame)?;
        self.accept(frame.shape(), output)
    }

    fn check_input(&self, frame: &Frame) -> Result<()> {
        if !matches!(
            self.state,
            ReducerState::Initializing | ReducerState::Accumulating
        ) {
            return Err(DprError::Pipeline(format!(
                "cannot accept frames in state {:?}",
                self.state
            )));
        }
        match self.input_shape {
            Some(expected) if expected != frame.shape() => Err(DprError::ShapeMismatch {
                expected,
                actual: frame.shape(),
            }),
            _ => Ok(()),
        }
    }

    /// Accumulate an already reconstructed frame.
    fn accept(&mut self, input_shape: (usize, usize), output: FrameOutput) -> Result<()> {
        let shape = output.shape();
        match self.output_shape {
            None => {
                self.input_shape = Some(input_shape);
                self.output_shape = Some(shape);
                self.magnified.reserve(self.expected_frames);
                match self.options.params.temporal() {
                    TemporalMode::None => self.reassembled.reserve(self.expected_frames),
                    _ => self.accumulator = Some(TemporalAccumulator::new(shape)),
                }
                self.state = ReducerState::Accumulating;
                debug!(input = ?input_shape, output = ?shape, "Reducer initialized");
            }
            Some(expected) if expected != shape => {
                return Err(DprError::ShapeMismatch {
                    expected,
                    actual: shape,
                });
            }
            Some(_) => {}
        }

        match self.accumulator.as_mut() {
            Some(acc) => acc.add(&output.reassembled)?,
            None => self.reassembled.push(output.reassembled),
        }
        self.magnified.push(output.magnified);
        Ok(())
    }

    /// Apply the temporal reduction and return the result.
    pub fn finish(mut self) -> Result<StackResult> {
        if self.magnified.is_empty() {
            return Err(DprError::EmptyStack);
        }
        self.state = ReducerState::Reducing;
        let temporal = self.options.params.temporal();

        let output = match (temporal, self.accumulator.take()) {
            (TemporalMode::None, _) => TemporalOutput::Stack(std::mem::take(&mut self.reassembled)),
            (TemporalMode::Mean, Some(acc)) => TemporalOutput::Reduced(acc.mean()?),
            (TemporalMode::Variance, Some(acc)) => TemporalOutput::Reduced(acc.variance()?),
            (mode, None) => {
                return Err(DprError::Pipeline(format!(
                    "no accumulator for temporal mode {mode}"
                )))
            }
        };

        self.state = ReducerState::Done;
        info!(
            frames = self.magnified.len(),
            temporal = %temporal,
            output = ?self.output_shape,
            "Stack reduced"
        );

        Ok(StackResult {
            output,
            magnified: self.magnified,
            temporal,
        })
    }

    /// Process every frame of `stack` in order, one at a time.
    pub fn run(
        mut self,
        stack: &ImageStack,
        reporter: &dyn ProgressReporter,
        cancel: Option<&CancelFlag>,
    ) -> Result<StackResult> {
        let total = stack.len();
        self.expected_frames = total;
        info!(
            frames = total,
            engine = self.engine.name(),
            temporal = %self.options.params.temporal(),
            "Reconstructing stack"
        );

        reporter.begin_stage(PipelineStage::Reconstructing, Some(total));
        for (i, frame) in stack.iter().enumerate() {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                reporter.finish_stage();
                return Err(DprError::Cancelled {
                    completed: i,
                    total,
                });
            }
            self.push(frame)?;
            reporter.advance(i + 1);
        }
        reporter.finish_stage();

        reporter.begin_stage(PipelineStage::Reducing, None);
        let result = self.finish();
        reporter.finish_stage();
        result
    }

    /// Like [`run`](Self::run), but reconstructs frames concurrently once the
    /// stack holds at least `PARALLEL_FRAME_THRESHOLD` frames. Results are
    /// accumulated in stack order, so the output matches the sequential run.
    pub fn run_parallel(
        mut self,
        stack: &ImageStack,
        reporter: &dyn ProgressReporter,
        cancel: Option<&CancelFlag>,
    ) -> Result<StackResult> {
        let total = stack.len();
        if total < PARALLEL_FRAME_THRESHOLD {
            return self.run(stack, reporter, cancel);
        }
        self.expected_frames = total;
        info!(
            frames = total,
            engine = self.engine.name(),
            temporal = %self.options.params.temporal(),
            "Reconstructing stack in parallel"
        );

        let first_shape = stack.frame_shape();
        reporter.begin_stage(PipelineStage::Reconstructing, Some(total));
        let done = AtomicUsize::new(0);
        let this = &self;
        let outputs: Vec<Result<FrameOutput>> = stack
            .frames()
            .par_iter()
            .map(|frame| {
                if cancel.is_some_and(|c| c.is_cancelled()) {
                    return Err(DprError::Cancelled {
                        completed: done.load(Ordering::Relaxed),
                        total,
                    });
                }
                let output = this.process(frame)?;
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.advance(n);
                Ok(output)
            })
            .collect();
        reporter.finish_stage();

        for output in outputs {
            let output = output?;
            self.accept(first_shape, output)?;
        }

        reporter.begin_stage(PipelineStage::Reducing, None);
        let result = self.finish();
        reporter.finish_stage();
        result
    }
}

/// Reconstruct every frame of `stack` sequentially and reduce.
pub fn reduce_stack(
    stack: &ImageStack,
    options: &DprOptions,
    engine: Arc<dyn DprEngine>,
) -> Result<StackResult> {
    StackReducer::new(options.clone(), engine).run(stack, &NoOpReporter, None)
}

/// Reconstruct every frame of `stack` with frame-level parallelism and
/// reduce. Output is identical to [`reduce_stack`].
pub fn reduce_stack_parallel(
    stack: &ImageStack,
    options: &DprOptions,
    engine: Arc<dyn DprEngine>,
) -> Result<StackResult> {
    StackReducer::new(options.clone(), engine).run_parallel(stack, &NoOpReporter, None)
}
