use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the square Gaussian kernel applied to the difference map.
pub const BLUR_KERNEL_SIZE: usize = 19;

/// Standard deviation of the difference-map Gaussian, in pixels.
pub const BLUR_SIGMA: f32 = 4.0;

/// Inclusive bounds of the segmentation threshold.
pub const THRESHOLD_MIN: u8 = 3;
pub const THRESHOLD_MAX: u8 = 190;

/// Inclusive bounds of the scan-line step.
pub const LINE_STEP_MIN: u32 = 1;
pub const LINE_STEP_MAX: u32 = 50;

/// A control region must be strictly wider and taller than this, in original pixels.
pub const MIN_CONTROL_SIDE: u32 = 10;

/// Largest size an image is shown at for rubber-band selection.
pub const DEFAULT_DISPLAY_LIMIT: ImageSize = ImageSize {
    width: 800,
    height: 600,
};

/// Integer pixel coordinate, x to the right and y downward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive pixel bounds of a point set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y + 1) as u32
    }
}

/// Closed outer boundary of one connected foreground region.
///
/// Every boundary pixel is kept, in tracing order; the last point connects
/// back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<PixelPoint>,
}

impl Contour {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `None` for a contour without points
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |b, p| BoundingBox {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Vertical run of foreground samples in a single image column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLine {
    pub x: i32,
    /// One point per foreground row, top to bottom
    pub points: Vec<PixelPoint>,
}

/// Width × height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies entirely inside an image of `size`
    pub fn fits_within(&self, size: ImageSize) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(size.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(size.height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}×{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Rubber-band rectangle in display pixels.
///
/// Width and height may be negative when the drag went up or left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DisplayRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by a drag from `origin` to `end`
    pub fn from_drag(origin: (i32, i32), end: (i32, i32)) -> Self {
        Self::new(
            origin.0,
            origin.1,
            end.0.saturating_sub(origin.0),
            end.1.saturating_sub(origin.1),
        )
        .normalized()
    }

    /// Flip negative extents so that width and height are non-negative.
    /// Values saturate at the `i32` range.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0 {
            (self.x.saturating_add(self.width), self.width.saturating_neg())
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0 {
            (self.y.saturating_add(self.height), self.height.saturating_neg())
        } else {
            (self.y, self.height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// User-tunable knobs of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Smoothed differences above this value count as injury
    pub threshold: u8,
    /// Keep every `line_step`-th scan line
    pub line_step: u32,
}

impl AnalysisParams {
    pub fn new(threshold: u8, line_step: u32) -> Self {
        Self {
            threshold,
            line_step,
        }
    }

    /// Fold both values into their valid ranges
    pub fn clamped(&self) -> Self {
        Self {
            threshold: self.threshold.clamp(THRESHOLD_MIN, THRESHOLD_MAX),
            line_step: self.line_step.clamp(LINE_STEP_MIN, LINE_STEP_MAX),
        }
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            threshold: 50,
            line_step: 10,
        }
    }
}

impl fmt::Display for AnalysisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "threshold {}, line step {}", self.threshold, self.line_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contour_bounding_box_spans_all_points() {
        let contour = Contour::new(vec![
            PixelPoint::new(4, 2),
            PixelPoint::new(9, 3),
            PixelPoint::new(6, 7),
        ]);
        let bbox = contour.bounding_box().unwrap();
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (4, 2, 9, 7));
        assert_eq!((bbox.width(), bbox.height()), (6, 6));
        assert!(Contour::new(Vec::new()).bounding_box().is_none());
    }

    #[test]
    fn drag_up_and_left_is_normalized() {
        let rect = DisplayRect::from_drag((50, 40), (20, 10));
        assert_eq!(rect, DisplayRect::new(20, 10, 30, 30));
    }

    #[test]
    fn extreme_extents_saturate() {
        let rect = DisplayRect::new(-5, 10, i32::MIN, -20).normalized();
        assert_eq!(rect, DisplayRect::new(i32::MIN, -10, i32::MAX, 20));

        let rect = DisplayRect::from_drag((i32::MAX, 0), (i32::MIN, 30));
        assert_eq!(rect.width, i32::MAX);
        assert!(rect.width >= 0 && rect.height >= 0);
    }

    #[test]
    fn params_clamp_into_range() {
        assert_eq!(AnalysisParams::new(0, 0).clamped(), AnalysisParams::new(3, 1));
        assert_eq!(
            AnalysisParams::new(255, 99).clamped(),
            AnalysisParams::new(190, 50)
        );
        assert_eq!(AnalysisParams::default().clamped(), AnalysisParams::default());
    }

    #[test]
    fn params_fill_missing_fields_from_defaults() {
        let params: AnalysisParams = serde_json::from_str(r#"{"threshold": 80}"#).unwrap();
        assert_eq!(params, AnalysisParams::new(80, 10));
    }

    #[test]
    fn crop_rect_bounds_check() {
        let size = ImageSize::new(100, 50);
        assert!(CropRect::new(90, 40, 10, 10).fits_within(size));
        assert!(!CropRect::new(91, 40, 10, 10).fits_within(size));
    }
}
