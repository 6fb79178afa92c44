// Raster export module
// Writes the three-panel composite and the alpha-masked injury region

use crate::error::{Result, RobodocError};
use crate::segmentation::ensure_non_empty;
use crate::tracing::fill_mask;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::info;
use robodoc_common::{Contour, ImageSize};
use std::path::Path;

/// Decode a raster image file (PNG, JPEG, BMP, TIFF, ...)
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = image::open(path).map_err(|e| {
        RobodocError::InvalidImage(format!("failed to open {}: {}", path.display(), e))
    })?;
    ensure_non_empty(&img, "input")?;
    info!(
        "Loaded {} ({}×{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Subject pixels inside the filled contours, fully transparent elsewhere.
///
/// Opaque pixels keep the subject's RGB; transparent ones are black.
pub fn masked_region(subject: &DynamicImage, contours: &[Contour]) -> Result<RgbaImage> {
    if contours.is_empty() {
        return Err(RobodocError::Export("no contours to export".to_string()));
    }
    let size = ensure_non_empty(subject, "subject")?;
    let mask = fill_mask(contours, size);
    let rgb = subject.to_rgb8();

    let mut out = RgbaImage::new(size.width, size.height);
    for ((dst, src), m) in out.pixels_mut().zip(rgb.pixels()).zip(mask.pixels()) {
        *dst = if m[0] != 0 {
            Rgba([src[0], src[1], src[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
    }
    Ok(out)
}

/// Write the contour-masked subject as a PNG with an alpha channel.
///
/// The file is always PNG-encoded regardless of the destination extension.
pub fn export_masked_region(
    subject: &DynamicImage,
    contours: &[Contour],
    destination: &Path,
) -> Result<()> {
    let region = masked_region(subject, contours)?;
    region
        .save_with_format(destination, ImageFormat::Png)
        .map_err(|e| {
            RobodocError::Export(format!("failed to write {}: {}", destination.display(), e))
        })?;

    info!(
        "Exported {} contour region(s) to {}",
        contours.len(),
        destination.display()
    );
    Ok(())
}

/// Write the composite verbatim, in the format implied by the extension
/// (PNG when there is none or it is unknown).
pub fn export_composite(composite: &image::RgbImage, destination: &Path) -> Result<()> {
    let size = ImageSize::new(composite.width(), composite.height());
    if size.is_empty() {
        return Err(RobodocError::Export("composite image is empty".to_string()));
    }

    let format = ImageFormat::from_path(destination).unwrap_or(ImageFormat::Png);
    composite
        .save_with_format(destination, format)
        .map_err(|e| {
            RobodocError::Export(format!("failed to write {}: {}", destination.display(), e))
        })?;

    info!(
        "Saved {} composite as {:?} to {}",
        size,
        format,
        destination.display()
    );
    Ok(())
}
