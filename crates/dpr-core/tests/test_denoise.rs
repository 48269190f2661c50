mod common;

use ndarray::Array2;

use dpr_core::denoise::{apply_denoiser, Denoiser, GaussianDenoiser};
use dpr_core::error::{DprError, Result};
use dpr_core::frame::Frame;

use common::{max_value, spot_frame};

#[test]
fn test_gaussian_keeps_shape_and_index() {
    let frame = Frame::new(spot_frame(15, 11, (7, 5), 100.0), 16).with_index(4);
    let out = apply_denoiser(&GaussianDenoiser { sigma: 1.5 }, &frame).unwrap();
    assert_eq!(out.shape(), (15, 11));
    assert_eq!(out.metadata.frame_index, 4);
    assert!(max_value(&out.data) < 100.0);
    assert!((out.data.sum() - 100.0).abs() < 1e-2);
}

#[test]
fn test_gaussian_rejects_negative_sigma() {
    let frame = Frame::new(Array2::zeros((4, 4)), 8);
    let err = apply_denoiser(&GaussianDenoiser { sigma: -1.0 }, &frame).unwrap_err();
    assert!(matches!(err, DprError::Denoise(_)));
}

#[test]
fn test_shape_change_rejected() {
    let cropping = |frame: &Frame| -> Result<Frame> {
        let (h, w) = frame.shape();
        Ok(Frame::new(Array2::zeros((h - 1, w)), frame.original_bit_depth))
    };
    let frame = Frame::new(Array2::zeros((6, 6)), 8);
    let err = apply_denoiser(&cropping, &frame).unwrap_err();
    assert!(matches!(
        err,
        DprError::ShapeMismatch {
            expected: (6, 6),
            actual: (5, 6)
        }
    ));
}

#[test]
fn test_closure_name_default() {
    let identity = |frame: &Frame| -> Result<Frame> { Ok(frame.clone()) };
    assert_eq!(identity.name(), "custom");
    assert_eq!(GaussianDenoiser::default().name(), "Gaussian");
}
