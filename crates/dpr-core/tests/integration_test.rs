mod common;

use std::sync::Arc;

use ndarray::Array2;
use tempfile::tempdir;

use dpr_core::dpr::output_shape;
use dpr_core::error::DprError;
use dpr_core::io::{load_image, load_stack, save_stack};
use dpr_core::params::TemporalMode;
use dpr_core::pipeline::config::{DenoiseConfig, PipelineConfig};
use dpr_core::pipeline::{run_pipeline, run_pipeline_with_cancel, CancelFlag, NoOpReporter};
use dpr_core::stack::TemporalOutput;

use common::{blob_frame, noise_frame, options};

fn write_test_stack(path: &std::path::Path, n: usize) -> Vec<Array2<f32>> {
    let frames: Vec<Array2<f32>> = (0..n)
        .map(|i| {
            let mut f = blob_frame(24, 20, &[(8.0, 6.0 + i as f32), (16.0, 13.0)], 1.7);
            f += &noise_frame(24, 20, i as u64, 0.0, 5.0);
            f
        })
        .collect();
    save_stack(&frames, path).unwrap();
    frames
}

#[test]
fn test_pipeline_mean_to_tiff() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cells.tif");
    write_test_stack(&input, 4);

    let config = PipelineConfig {
        input: input.clone(),
        output: dir.path().join("out").join("dpr.tif"),
        psf: 4.0,
        gain: 2.0,
        background: Some(10.0),
        temporal: TemporalMode::Mean,
        save_magnified: Some(dir.path().join("magnified.tif")),
        ..PipelineConfig::default()
    };
    let output = run_pipeline(&config, Arc::new(NoOpReporter)).unwrap();

    let expected_shape = output_shape(&options(4.0, 2.0, 10.0, TemporalMode::Mean), (24, 20));
    assert_eq!(output.frame_count, 4);
    assert_eq!(output.input_shape, (24, 20));
    assert_eq!(output.written, vec![config.output.clone()]);
    assert!(matches!(output.result.output, TemporalOutput::Reduced(_)));

    let written = load_stack(&config.output).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written.frame_shape(), expected_shape);

    let magnified = load_stack(&dir.path().join("magnified.tif")).unwrap();
    assert_eq!(magnified.frame_shape(), expected_shape);
    assert_eq!(output.magnified_path, config.save_magnified);
}

#[test]
fn test_pipeline_none_to_multipage_tiff() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cells.tif");
    write_test_stack(&input, 3);

    let config = PipelineConfig {
        input,
        output: dir.path().join("frames.tif"),
        psf: 4.0,
        background: Some(10.0),
        ..PipelineConfig::default()
    };
    run_pipeline(&config, Arc::new(NoOpReporter)).unwrap();
    assert_eq!(load_stack(&config.output).unwrap().len(), 3);
}

#[test]
fn test_pipeline_none_to_numbered_pngs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cells.tif");
    write_test_stack(&input, 2);

    let config = PipelineConfig {
        input,
        output: dir.path().join("dpr.png"),
        psf: 4.0,
        background: Some(10.0),
        denoise: Some(DenoiseConfig::Gaussian { sigma: 0.7 }),
        ..PipelineConfig::default()
    };
    let output = run_pipeline(&config, Arc::new(NoOpReporter)).unwrap();

    assert_eq!(
        output.written,
        vec![dir.path().join("dpr_0000.png"), dir.path().join("dpr_0001.png")]
    );
    for path in &output.written {
        let frame = load_image(path).unwrap();
        assert_eq!(frame.original_bit_depth, 8);
        assert_eq!(frame.shape(), output.result.output_shape());
    }
}

#[test]
fn test_bad_parameters_fail_before_reading() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        input: dir.path().join("does_not_exist.tif"),
        output: dir.path().join("out.tif"),
        psf: -1.0,
        ..PipelineConfig::default()
    };
    let err = run_pipeline(&config, Arc::new(NoOpReporter)).unwrap_err();
    assert!(matches!(err, DprError::InvalidParameter(_)));
    assert!(!config.output.exists());
}

#[test]
fn test_cancelled_pipeline_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cells.tif");
    write_test_stack(&input, 5);

    let config = PipelineConfig {
        input,
        output: dir.path().join("out.tif"),
        psf: 4.0,
        background: Some(10.0),
        temporal: TemporalMode::Mean,
        ..PipelineConfig::default()
    };
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = run_pipeline_with_cancel(&config, Arc::new(NoOpReporter), Some(&cancel)).unwrap_err();
    assert!(matches!(err, DprError::Cancelled { total: 5, .. }));
    assert!(!config.output.exists());
}
