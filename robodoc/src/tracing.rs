// Contour tracing module
// Extracts outer boundaries from a binary mask and rasterizes them back into
// a filled mask

use crate::segmentation::FOREGROUND;
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;
use robodoc_common::{Contour, ImageSize, PixelPoint};
use std::collections::HashSet;

/// Outer boundaries of the connected foreground components of `mask`.
///
/// Holes and anything nested inside a hole are skipped. Every boundary pixel
/// is kept in tracing order, with no polygon simplification.
pub fn trace_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let traced = find_contours::<i32>(mask);
    let total = traced.len();

    let contours: Vec<Contour> = traced
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            Contour::new(
                c.points
                    .into_iter()
                    .map(|p| PixelPoint::new(p.x, p.y))
                    .collect(),
            )
        })
        .collect();

    debug!(
        "Traced {} border(s), kept {} external contour(s)",
        total,
        contours.len()
    );
    contours
}

/// Rasterize `contours` into a mask of `size` with their interiors filled.
///
/// Boundary pixels are stamped first; any non-boundary pixel that cannot
/// reach the image edge through a 4-connected path is enclosed by an
/// 8-connected boundary and is therefore interior. Points outside the image
/// are ignored.
pub fn fill_mask(contours: &[Contour], size: ImageSize) -> GrayImage {
    let mut boundary = GrayImage::new(size.width, size.height);
    if size.is_empty() || contours.is_empty() {
        return boundary;
    }

    for point in contours.iter().flat_map(|c| c.points.iter()) {
        if let Some((x, y)) = in_bounds(*point, size) {
            boundary.put_pixel(x, y, Luma([FOREGROUND]));
        }
    }

    // Every pixel of a strip this thin lies on the image edge.
    if size.width < 3 || size.height < 3 {
        return boundary;
    }

    // Boundary pixels act as background here, so only the gaps get labels.
    let labels = connected_components(&boundary, Connectivity::Four, Luma([FOREGROUND]));

    let (w, h) = (size.width, size.height);
    let mut outside: HashSet<u32> = HashSet::new();
    for x in 0..w {
        outside.insert(labels.get_pixel(x, 0)[0]);
        outside.insert(labels.get_pixel(x, h - 1)[0]);
    }
    for y in 0..h {
        outside.insert(labels.get_pixel(0, y)[0]);
        outside.insert(labels.get_pixel(w - 1, y)[0]);
    }
    outside.remove(&0);

    let mut mask = GrayImage::new(w, h);
    for (dst, label) in mask.pixels_mut().zip(labels.pixels()) {
        let inside = label[0] == 0 || !outside.contains(&label[0]);
        if inside {
            *dst = Luma([FOREGROUND]);
        }
    }
    mask
}

fn in_bounds(point: PixelPoint, size: ImageSize) -> Option<(u32, u32)> {
    let x = u32::try_from(point.x).ok()?;
    let y = u32::try_from(point.y).ok()?;
    (x < size.width && y < size.height).then_some((x, y))
}
