use crate::error::Result;
use crate::render::compose_analysis;
use crate::scan_lines::{column_scan_lines, subsample};
use crate::segmentation::{count_foreground, segment_difference};
use crate::tracing::{fill_mask, trace_external_contours};
use image::{DynamicImage, RgbImage};
use log::{info, warn};
use robodoc_common::{AnalysisParams, Contour, ImageSize};

/// Output of one analysis run; replaced wholesale by the next one
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Subject, subject with outlines, outlines plus scan lines
    pub composite: RgbImage,
    /// Full external contour set, before any scan-line thinning
    pub contours: Vec<Contour>,
    /// Foreground pixels of the filled contour mask
    pub masked_pixels: usize,
    /// Scan lines drawn in the third panel
    pub scan_lines_drawn: usize,
}

impl AnalysisResult {
    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }
}

/// Highlight where `subject` differs from the healthy `control` sample.
///
/// The control is resampled to the subject size, both are reduced to
/// luminance, differenced, smoothed with the fixed 19×19 Gaussian and
/// thresholded. External contours of the result drive the outline panel; a
/// filled mask of those contours drives the scan-line panel, keeping every
/// `line_step`-th non-empty column (0 is treated as 1).
pub fn compute_difference(
    subject: &DynamicImage,
    control: &DynamicImage,
    threshold: u8,
    line_step: u32,
) -> Result<AnalysisResult> {
    let segmentation = segment_difference(subject, control, threshold)?;
    let contours = trace_external_contours(&segmentation.mask);

    let size = ImageSize::new(subject.width(), subject.height());
    let filled = fill_mask(&contours, size);
    let candidates = column_scan_lines(&filled);
    let candidate_count = candidates.len();
    let lines = subsample(candidates, line_step);

    let subject_rgb = subject.to_rgb8();
    let composite = compose_analysis(&subject_rgb, &contours, &lines);

    if contours.is_empty() {
        warn!(
            "No region differs from the control above threshold {}",
            threshold
        );
    }
    info!(
        "Analysis complete: {} contour region(s), {} of {} scan line(s) drawn",
        contours.len(),
        lines.len(),
        candidate_count
    );

    Ok(AnalysisResult {
        composite,
        masked_pixels: count_foreground(&filled),
        scan_lines_drawn: lines.len(),
        contours,
    })
}

/// [`compute_difference`] driven by an [`AnalysisParams`] value
pub fn analyze(
    subject: &DynamicImage,
    control: &DynamicImage,
    params: &AnalysisParams,
) -> Result<AnalysisResult> {
    compute_difference(subject, control, params.threshold, params.line_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    #[test]
    fn single_pixel_subject_is_analyzed() {
        let control = solid(20, 20, 90);

        let unchanged = compute_difference(&solid(1, 1, 90), &control, 50, 10).unwrap();
        assert_eq!(unchanged.contour_count(), 0);
        assert_eq!(unchanged.composite.dimensions(), (3, 1));

        let injured = compute_difference(&solid(1, 1, 250), &control, 50, 10).unwrap();
        assert_eq!(injured.contour_count(), 1);
        assert_eq!(injured.masked_pixels, 1);
        assert_eq!(injured.scan_lines_drawn, 1);
    }

    #[test]
    fn thin_strips_are_analyzed() {
        let control = solid(20, 20, 90);
        for (w, h) in [(1, 50), (50, 1), (2, 2)] {
            let result = compute_difference(&solid(w, h, 90), &control, 50, 1).unwrap();
            assert_eq!(result.contour_count(), 0);
            assert_eq!(result.composite.dimensions(), (3 * w, h));
        }
    }
}
