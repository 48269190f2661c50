mod common;

use ndarray::{array, Array2};
use tempfile::tempdir;

use dpr_core::error::DprError;
use dpr_core::io::{load_image, load_stack, save_image, save_stack};

use common::noise_frame;

#[test]
fn test_tiff_stack_roundtrip_keeps_float_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stack.tif");
    let frames: Vec<Array2<f32>> = (0..3)
        .map(|i| noise_frame(9, 13, i, 0.0, 4000.0))
        .collect();

    save_stack(&frames, &path).unwrap();
    let stack = load_stack(&path).unwrap();

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.frame_shape(), (9, 13));
    for (i, (frame, original)) in stack.iter().zip(&frames).enumerate() {
        assert_eq!(frame.metadata.frame_index, i);
        assert_eq!(frame.original_bit_depth, 32);
        assert_eq!(&frame.data, original);
    }
}

#[test]
fn test_save_image_tiff_single_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("one.tiff");
    let data = array![[0.5f32, 1.5, 2.5], [3.5, 4.5, 5.5]];
    save_image(&data, &path).unwrap();

    let stack = load_stack(&path).unwrap();
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.frames()[0].data, data);
}

#[test]
fn test_png_is_normalized_to_8_bit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.png");
    let data = array![[100.0f32, 150.0], [200.0, 100.0]];
    save_image(&data, &path).unwrap();

    let frame = load_image(&path).unwrap();
    assert_eq!(frame.original_bit_depth, 8);
    assert_eq!(frame.data, array![[0.0f32, 127.0], [255.0, 0.0]]);
}

#[test]
fn test_png_loads_as_single_frame_stack() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("single.png");
    save_image(&array![[1.0f32, 2.0], [3.0, 4.0]], &path).unwrap();
    let stack = load_stack(&path).unwrap();
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.frame_shape(), (2, 2));
}

#[test]
fn test_16_bit_png_keeps_native_units() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw16.png");
    let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(
        3,
        1,
        vec![0u16, 1200, 65535],
    )
    .unwrap();
    img.save(&path).unwrap();

    let frame = load_image(&path).unwrap();
    assert_eq!(frame.original_bit_depth, 16);
    assert_eq!(frame.data, array![[0.0f32, 1200.0, 65535.0]]);
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_stack(&dir.path().join("absent.tif")).unwrap_err();
    assert!(matches!(err, DprError::Io(_)));
}

#[test]
fn test_empty_stack_not_saved() {
    let dir = tempdir().unwrap();
    let err = save_stack(&[], &dir.path().join("empty.tif")).unwrap_err();
    assert!(matches!(err, DprError::EmptyStack));
}
