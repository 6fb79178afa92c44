// Control-region selection
// Maps a rubber-band rectangle drawn on a scaled-down preview back into
// original image pixels and cuts the control sample out of the subject

use crate::error::{Result, RobodocError};
use crate::segmentation::ensure_non_empty;
use image::DynamicImage;
use log::debug;
use robodoc_common::{CropRect, DisplayRect, ImageSize, MIN_CONTROL_SIDE};

/// Size at which an image of `original` size is previewed inside `limit`.
///
/// Oversized axes are scaled down by the smaller of the per-axis ratios so the
/// aspect ratio is kept; images that already fit are never enlarged.
pub fn fit_to_display(original: ImageSize, limit: ImageSize) -> ImageSize {
    let axis_scale = |dim: u32, max: u32| {
        if dim > max {
            f64::from(max) / f64::from(dim)
        } else {
            1.0
        }
    };
    let scale = axis_scale(original.width, limit.width).min(axis_scale(original.height, limit.height));

    ImageSize::new(
        ((f64::from(original.width) * scale) as u32).max(1),
        ((f64::from(original.height) * scale) as u32).max(1),
    )
}

/// Transform a display-space selection into original image pixels.
///
/// Each coordinate and extent is multiplied by its axis scale
/// (`original / display`) and truncated. The origin is clamped into the image
/// and the extents are cut so the rectangle never leaves it.
///
/// Returns `Ok(None)` for a zero-area selection and `RegionTooSmall` when
/// either side ends up at or below [`MIN_CONTROL_SIDE`] pixels.
pub fn display_to_original(
    rect: DisplayRect,
    display: ImageSize,
    original: ImageSize,
) -> Result<Option<CropRect>> {
    if display.is_empty() || original.is_empty() {
        return Err(RobodocError::InvalidImage(format!(
            "cannot map a selection between {} display and {} original",
            display, original
        )));
    }

    let rect = rect.normalized();
    if rect.is_empty() {
        return Ok(None);
    }

    let scale_x = f64::from(original.width) / f64::from(display.width);
    let scale_y = f64::from(original.height) / f64::from(display.height);

    let x = scaled(rect.x, scale_x).clamp(0, i64::from(original.width) - 1);
    let y = scaled(rect.y, scale_y).clamp(0, i64::from(original.height) - 1);
    let width = scaled(rect.width, scale_x).min(i64::from(original.width) - x);
    let height = scaled(rect.height, scale_y).min(i64::from(original.height) - y);

    // All four values are within [0, original] here.
    let crop = CropRect::new(x as u32, y as u32, width as u32, height as u32);
    debug!(
        "Selection {:?} on {} display maps to {} in {} original",
        rect, display, crop, original
    );

    ensure_control_size(&crop)?;
    Ok(Some(crop))
}

fn scaled(value: i32, scale: f64) -> i64 {
    (f64::from(value) * scale).trunc() as i64
}

/// Reject control regions whose width or height is not above the minimum
pub fn ensure_control_size(rect: &CropRect) -> Result<()> {
    if rect.width <= MIN_CONTROL_SIDE || rect.height <= MIN_CONTROL_SIDE {
        return Err(RobodocError::RegionTooSmall {
            width: rect.width,
            height: rect.height,
            min: MIN_CONTROL_SIDE,
        });
    }
    Ok(())
}

/// Copy the control region `rect` out of `subject`
pub fn crop_control(subject: &DynamicImage, rect: CropRect) -> Result<DynamicImage> {
    let size = ensure_non_empty(subject, "subject")?;
    ensure_control_size(&rect)?;
    if !rect.fits_within(size) {
        return Err(RobodocError::InvalidImage(format!(
            "control region {} exceeds the {} subject",
            rect, size
        )));
    }
    Ok(subject.crop_imm(rect.x, rect.y, rect.width, rect.height))
}
