use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::utils::{CampusError, Result};

/// Display size an image will be drawn at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Largest power-of-two subsample factor `s` with
/// `(height / 2) / s >= target.height` and `(width / 2) / s >= target.width`
///
/// The comparison is inclusive: 800x800 for a 100x100 target gives 4.
pub fn sample_size(width: u32, height: u32, target: TargetSize) -> u32 {
    let target_w = target.width.max(1);
    let target_h = target.height.max(1);
    let half_w = width / 2;
    let half_h = height / 2;

    let mut sample = 1u32;
    while let Some(next) = sample.checked_mul(2) {
        if half_h / next >= target_h && half_w / next >= target_w {
            sample = next;
        } else {
            break;
        }
    }
    sample
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CampusError::Decode(e.to_string()))
}

/// Decode `bytes`, downsampled for `target` when one is given
///
/// Bounds are read first so the subsample factor is known before the pixel
/// data is decoded.
pub fn decode(bytes: &[u8], target: Option<TargetSize>) -> Result<DynamicImage> {
    let Some(target) = target else {
        return reader(bytes)?
            .decode()
            .map_err(|e| CampusError::Decode(e.to_string()));
    };

    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| CampusError::Decode(e.to_string()))?;
    let sample = sample_size(width, height, target);

    // No subsampling decoder in `image`: the full-resolution frame is decoded
    // and then shrunk, so peak memory is that of the source image.
    let image = reader(bytes)?
        .decode()
        .map_err(|e| CampusError::Decode(e.to_string()))?;

    if sample == 1 {
        return Ok(image);
    }

    Ok(image.resize_exact(
        (width / sample).max(1),
        (height / sample).max(1),
        FilterType::Triangle,
    ))
}
