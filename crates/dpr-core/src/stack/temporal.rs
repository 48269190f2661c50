use ndarray::{Array2, Zip};

use crate::error::{DprError, Result};

/// Per-pixel mean over `frames`, accumulated in f64.
pub fn temporal_mean(frames: &[Array2<f32>]) -> Result<Array2<f32>> {
    let shape = common_shape(frames)?;
    let n = frames.len() as f64;

    let mut sum = Array2::<f64>::zeros(shape);
    for frame in frames {
        Zip::from(&mut sum).and(frame).for_each(|s, &v| *s += v as f64);
    }

    Ok(sum.mapv(|s| (s / n) as f32))
}

/// Per-pixel population variance (divide by N) over `frames`.
///
/// Two passes: mean first, then the mean squared deviation.
pub fn temporal_variance(frames: &[Array2<f32>]) -> Result<Array2<f32>> {
    let shape = common_shape(frames)?;
    let n = frames.len() as f64;

    let mut mean = Array2::<f64>::zeros(shape);
    for frame in frames {
        Zip::from(&mut mean).and(frame).for_each(|m, &v| *m += v as f64);
    }
    mean.mapv_inplace(|m| m / n);

    let mut sq = Array2::<f64>::zeros(shape);
    for frame in frames {
        Zip::from(&mut sq)
            .and(frame)
            .and(&mean)
            .for_each(|s, &v, &m| {
                let d = v as f64 - m;
                *s += d * d;
            });
    }

    Ok(sq.mapv(|s| (s / n) as f32))
}

fn common_shape(frames: &[Array2<f32>]) -> Result<(usize, usize)> {
    let first = frames.first().ok_or(DprError::EmptyStack)?;
    let shape = first.dim();
    for frame in &frames[1..] {
        if frame.dim() != shape {
            return Err(DprError::ShapeMismatch {
                expected: shape,
                actual: frame.dim(),
            });
        }
    }
    Ok(shape)
}

/// Streaming mean and variance (Welford) for frames that arrive one at a
/// time.
#[derive(Clone, Debug)]
pub struct TemporalAccumulator {
    count: usize,
    mean: Array2<f64>,
    m2: Array2<f64>,
}

impl TemporalAccumulator {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            count: 0,
            mean: Array2::zeros(shape),
            m2: Array2::zeros(shape),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.mean.dim()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn add(&mut self, frame: &Array2<f32>) -> Result<()> {
        if frame.dim() != self.shape() {
            return Err(DprError::ShapeMismatch {
                expected: self.shape(),
                actual: frame.dim(),
            });
        }
        self.count += 1;
        let k = self.count as f64;
        Zip::from(&mut self.mean)
            .and(&mut self.m2)
            .and(frame)
            .for_each(|mean, m2, &v| {
                let x = v as f64;
                let delta = x - *mean;
                *mean += delta / k;
                *m2 += delta * (x - *mean);
            });
        Ok(())
    }

    pub fn mean(&self) -> Result<Array2<f32>> {
        if self.count == 0 {
            return Err(DprError::EmptyStack);
        }
        Ok(self.mean.mapv(|m| m as f32))
    }

    pub fn variance(&self) -> Result<Array2<f32>> {
        if self.count == 0 {
            return Err(DprError::EmptyStack);
        }
        let n = self.count as f64;
        Ok(self.m2.mapv(|m| (m / n).max(0.0) as f32))
    }
}
