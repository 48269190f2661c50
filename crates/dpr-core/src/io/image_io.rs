use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat};
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tracing::debug;

use crate::error::{DprError, Result};
use crate::frame::{Frame, ImageStack};

/// True for `.tif` / `.tiff` (any case).
pub fn is_tiff(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("tif" | "tiff")
    )
}

/// Load an image stack. TIFF files yield one frame per page; any other
/// format the `image` crate understands yields a single frame.
/// Sample values keep the file's native units.
pub fn load_stack(path: &Path) -> Result<ImageStack> {
    let frames = if is_tiff(path) {
        load_tiff_pages(path)?
    } else {
        vec![load_image(path)?]
    };
    debug!(path = %path.display(), frames = frames.len(), "Loaded stack");
    ImageStack::new(frames)
}

/// Load a single grayscale image through the `image` crate.
/// Color images are reduced to luminance.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    dynamic_to_frame(img)
}

fn dynamic_to_frame(img: DynamicImage) -> Result<Frame> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let (samples, bit_depth): (Vec<f32>, u8) = match img {
        DynamicImage::ImageLuma8(buf) => (buf.into_raw().into_iter().map(f32::from).collect(), 8),
        DynamicImage::ImageLuma16(buf) => {
            (buf.into_raw().into_iter().map(f32::from).collect(), 16)
        }
        float @ (DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)) => {
            (float.to_luma32f().into_raw(), 32)
        }
        other => match other.color().bytes_per_pixel() / other.color().channel_count() {
            1 => (
                other.to_luma8().into_raw().into_iter().map(f32::from).collect(),
                8,
            ),
            _ => (
                other.to_luma16().into_raw().into_iter().map(f32::from).collect(),
                16,
            ),
        },
    };
    samples_to_frame((h, w), samples, bit_depth, 0)
}

/// Wrap decoded samples as a frame, rejecting a sample count that does not
/// fill `shape`.
fn samples_to_frame(
    shape: (usize, usize),
    samples: Vec<f32>,
    bit_depth: u8,
    index: usize,
) -> Result<Frame> {
    let (h, w) = shape;
    let data = Array2::from_shape_vec(shape, samples).map_err(|_| DprError::InvalidFrame {
        index,
        reason: format!("sample count does not match {h}x{w}"),
    })?;
    Ok(Frame::new(data, bit_depth).with_index(index))
}

fn load_tiff_pages(path: &Path) -> Result<Vec<Frame>> {
    let mut decoder = Decoder::new(File::open(path)?)?.with_limits(Limits::unlimited());
    let mut frames = Vec::new();

    loop {
        frames.push(decode_tiff_page(&mut decoder, frames.len())?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    Ok(frames)
}

fn decode_tiff_page(decoder: &mut Decoder<File>, page: usize) -> Result<Frame> {
    match decoder.colortype()? {
        tiff::ColorType::Gray(_) => {}
        other => {
            return Err(DprError::UnsupportedFormat(format!(
                "TIFF page {page}: expected grayscale, got {other:?}"
            )));
        }
    }

    let (w, h) = decoder.dimensions()?;
    let (samples, bit_depth): (Vec<f32>, u8) = match decoder.read_image()? {
        DecodingResult::U8(buf) => (buf.into_iter().map(f32::from).collect(), 8),
        DecodingResult::U16(buf) => (buf.into_iter().map(f32::from).collect(), 16),
        DecodingResult::U32(buf) => (buf.into_iter().map(|v| v as f32).collect(), 32),
        DecodingResult::I8(buf) => (buf.into_iter().map(f32::from).collect(), 8),
        DecodingResult::I16(buf) => (buf.into_iter().map(f32::from).collect(), 16),
        DecodingResult::I32(buf) => (buf.into_iter().map(|v| v as f32).collect(), 32),
        DecodingResult::F32(buf) => (buf, 32),
        DecodingResult::F64(buf) => (buf.into_iter().map(|v| v as f32).collect(), 32),
        other => {
            return Err(DprError::UnsupportedFormat(format!(
                "TIFF page {page}: sample format {other:?}"
            )));
        }
    };

    samples_to_frame((h as usize, w as usize), samples, bit_depth, page)
}

/// Min-max stretch to 0..=255. A constant image is cast directly, clamped
/// to the 8-bit range.
pub fn normalize_to_u8(data: &Array2<f32>) -> Array2<u8> {
    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if max > min {
        let range = max - min;
        data.mapv(|v| ((v - min) / range * 255.0) as u8)
    } else {
        data.mapv(|v| v.clamp(0.0, 255.0) as u8)
    }
}

/// Save one image, choosing the format from the extension: TIFF keeps
/// 32-bit float samples, everything else is normalized to 8 bits.
pub fn save_image(data: &Array2<f32>, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    if is_tiff(path) {
        return save_stack(std::slice::from_ref(data), path);
    }

    let (h, w) = data.dim();
    let bytes: Vec<u8> = normalize_to_u8(data).iter().copied().collect();
    let img = GrayImage::from_raw(w as u32, h as u32, bytes).ok_or_else(|| {
        DprError::InvalidDimensions { rows: h, cols: w }
    })?;
    let format = ImageFormat::from_path(path)?;
    img.save_with_format(path, format)?;
    Ok(())
}

/// Save images as pages of one 32-bit float TIFF.
pub fn save_stack(images: &[Array2<f32>], path: &Path) -> Result<()> {
    if images.is_empty() {
        return Err(DprError::EmptyStack);
    }
    ensure_parent(path)?;

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    for image in images {
        let (h, w) = image.dim();
        let samples: Vec<f32> = image.iter().copied().collect();
        encoder.write_image::<colortype::Gray32Float>(w as u32, h as u32, &samples)?;
    }
    debug!(path = %path.display(), pages = images.len(), "Wrote TIFF");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
