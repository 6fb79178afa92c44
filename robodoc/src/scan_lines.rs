// Scan-line sampling of a filled mask
// One vertical line per non-empty column, thinned out by a fixed step

use image::GrayImage;
use robodoc_common::{PixelPoint, ScanLine};

/// One candidate line for every column of `mask` that contains foreground,
/// in column order. Each line holds one point per foreground row.
pub fn column_scan_lines(mask: &GrayImage) -> Vec<ScanLine> {
    let (width, height) = mask.dimensions();
    (0..width)
        .filter_map(|x| {
            let points: Vec<PixelPoint> = (0..height)
                .filter(|&y| mask.get_pixel(x, y)[0] != 0)
                .map(|y| PixelPoint::new(x as i32, y as i32))
                .collect();
            (!points.is_empty()).then_some(ScanLine {
                x: x as i32,
                points,
            })
        })
        .collect()
}

/// Keep every `step`-th line, starting with the first.
///
/// A step of 0 is treated as 1. The result holds
/// `ceil(lines.len() / step)` lines.
pub fn subsample(lines: Vec<ScanLine>, step: u32) -> Vec<ScanLine> {
    let step = step.max(1) as usize;
    lines.into_iter().step_by(step).collect()
}
