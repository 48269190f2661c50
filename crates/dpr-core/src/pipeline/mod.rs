pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{load_input, run_pipeline, run_pipeline_with_cancel, write_outputs};
pub use types::{CancelFlag, NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};
