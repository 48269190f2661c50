//! Per-frame Displacement-Preserving Reconstruction.
//!
//! Stages, in order: background suppression, grid upscaling, displacement
//! estimation, and reassignment. [`process_frame`] runs all four.

pub mod background;
pub mod displacement;
pub mod processor;
pub mod reassign;
pub mod upscale;

pub use processor::{output_shape, process_array, process_frame, FrameOutput};
