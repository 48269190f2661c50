/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Zero border (in upscaled pixels) added around both magnified channels.
/// Reassignment only reads interior pixels, so every destination stays in bounds.
pub const PADDING: usize = 10;

/// Largest displacement magnitude (in upscaled pixels) accepted per axis.
pub const DISPLACEMENT_LIMIT: f32 = 10.0;

/// Guard added to every denominator in the normalization and gradient steps.
pub const EPSILON: f32 = 1e-5;

/// Gaussian sigma (upscaled pixels) of the local illumination estimate.
pub const NORMALIZATION_SIGMA: f32 = 10.0;

/// Gaussian kernels are truncated at this many standard deviations.
pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

/// Ratio between the FWHM of a Gaussian PSF and its 1/e radius.
pub const FWHM_TO_1E_RADIUS: f64 = 1.6651;

/// Target sampling: upscaled pixels per PSF 1/e radius.
pub const PIXELS_PER_PSF_RADIUS: f64 = 5.0;

/// Default background radius is this multiple of the PSF FWHM.
pub const DEFAULT_BACKGROUND_PER_PSF: f64 = 17.0;

/// Default displacement gain.
pub const DEFAULT_GAIN: f64 = 1.0;
