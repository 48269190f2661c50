use ndarray::Array2;

use crate::error::{DprError, Result};

/// A single grayscale microscopy frame.
/// Pixel values are non-negative f32 intensities in the camera's native units.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (rows, cols)
    pub data: Array2<f32>,
    /// Original bit depth of the source samples (8, 16 or 32)
    pub original_bit_depth: u8,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.metadata.frame_index = index;
        self
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
}

/// Ordered sequence of equal-shaped frames. The order is the time axis.
#[derive(Clone, Debug)]
pub struct ImageStack {
    frames: Vec<Frame>,
}

impl ImageStack {
    /// Build a stack, checking that it is non-empty and every frame shares
    /// the first frame's shape. Frame indices are rewritten to stack order.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let first = frames.first().ok_or(DprError::EmptyStack)?;
        let expected = first.shape();
        for frame in &frames {
            if frame.shape() != expected {
                return Err(DprError::ShapeMismatch {
                    expected,
                    actual: frame.shape(),
                });
            }
        }
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_index(i))
            .collect();
        Ok(Self { frames })
    }

    /// Build a stack from bare arrays (bit depth recorded as 32).
    pub fn from_arrays(arrays: Vec<Array2<f32>>) -> Result<Self> {
        Self::new(arrays.into_iter().map(|a| Frame::new(a, 32)).collect())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shape shared by every frame, `(rows, cols)`.
    pub fn frame_shape(&self) -> (usize, usize) {
        self.frames[0].shape()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a ImageStack {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
