// Visualization overlays
// Draws contour outlines and scan lines onto copies of the subject and lays
// the panels out side by side

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use robodoc_common::{Contour, ScanLine};

pub const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const CONTOUR_THICKNESS: u32 = 5;
pub const SCAN_LINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const SCAN_LINE_THICKNESS: u32 = 2;

/// Stroke every contour as a closed outline of the given thickness
pub fn draw_contours(img: &mut RgbImage, contours: &[Contour], color: Rgb<u8>, thickness: u32) {
    let radius = (thickness / 2) as i32;
    for contour in contours {
        let n = contour.points.len();
        for (i, p) in contour.points.iter().enumerate() {
            if radius > 0 {
                draw_filled_circle_mut(img, (p.x, p.y), radius, color);
            }
            // Closing segment included
            let next = contour.points[(i + 1) % n];
            draw_line_segment_mut(
                img,
                (p.x as f32, p.y as f32),
                (next.x as f32, next.y as f32),
                color,
            );
        }
    }
}

/// Draw each scan line as an open polyline through its points
pub fn draw_scan_lines(img: &mut RgbImage, lines: &[ScanLine], color: Rgb<u8>, thickness: u32) {
    for line in lines {
        for offset in 0..thickness.max(1) as i32 {
            let dx = offset as f32;
            match line.points.as_slice() {
                [] => {}
                [only] => draw_line_segment_mut(
                    img,
                    (only.x as f32 + dx, only.y as f32),
                    (only.x as f32 + dx, only.y as f32),
                    color,
                ),
                points => {
                    for pair in points.windows(2) {
                        draw_line_segment_mut(
                            img,
                            (pair[0].x as f32 + dx, pair[0].y as f32),
                            (pair[1].x as f32 + dx, pair[1].y as f32),
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Concatenate equally tall panels left to right
pub fn hstack(panels: &[&RgbImage]) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).sum();
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let mut canvas = RgbImage::new(width, height);

    let mut x = 0i64;
    for panel in panels {
        imageops::replace(&mut canvas, *panel, x, 0);
        x += i64::from(panel.width());
    }
    canvas
}

/// Three-panel visualization: subject, subject with outlines, outlines plus
/// scan lines.
pub fn compose_analysis(subject: &RgbImage, contours: &[Contour], lines: &[ScanLine]) -> RgbImage {
    let mut contoured = subject.clone();
    draw_contours(&mut contoured, contours, CONTOUR_COLOR, CONTOUR_THICKNESS);

    let mut lined = contoured.clone();
    draw_scan_lines(&mut lined, lines, SCAN_LINE_COLOR, SCAN_LINE_THICKNESS);

    hstack(&[subject, &contoured, &lined])
}

#[cfg(test)]
mod tests {
    use super::*;
    use robodoc_common::PixelPoint;

    fn square_contour(x0: i32, y0: i32, side: i32) -> Contour {
        let mut points = Vec::new();
        for x in x0..x0 + side {
            points.push(PixelPoint::new(x, y0));
        }
        for y in y0 + 1..y0 + side {
            points.push(PixelPoint::new(x0 + side - 1, y));
        }
        for x in (x0..x0 + side - 1).rev() {
            points.push(PixelPoint::new(x, y0 + side - 1));
        }
        for y in (y0 + 1..y0 + side - 1).rev() {
            points.push(PixelPoint::new(x0, y));
        }
        Contour::new(points)
    }

    #[test]
    fn outline_is_thick_and_interior_untouched() {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([200, 150, 100]));
        draw_contours(&mut img, &[square_contour(10, 10, 40)], CONTOUR_COLOR, 5);

        assert_eq!(*img.get_pixel(10, 30), CONTOUR_COLOR);
        assert_eq!(*img.get_pixel(8, 30), CONTOUR_COLOR);
        assert_eq!(*img.get_pixel(12, 30), CONTOUR_COLOR);
        assert_eq!(*img.get_pixel(30, 30), Rgb([200, 150, 100]));
        assert_eq!(*img.get_pixel(2, 2), Rgb([200, 150, 100]));
    }

    #[test]
    fn scan_line_covers_its_column_span() {
        let mut img = RgbImage::new(20, 20);
        let line = ScanLine {
            x: 5,
            points: (3..9).map(|y| PixelPoint::new(5, y)).collect(),
        };
        draw_scan_lines(&mut img, &[line], SCAN_LINE_COLOR, 2);
        for y in 3..9 {
            assert_eq!(*img.get_pixel(5, y), SCAN_LINE_COLOR);
            assert_eq!(*img.get_pixel(6, y), SCAN_LINE_COLOR);
        }
        assert_eq!(*img.get_pixel(5, 10), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(7, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn composite_has_three_panels() {
        let subject = RgbImage::from_pixel(30, 20, Rgb([10, 20, 30]));
        let composite = compose_analysis(&subject, &[], &[]);
        assert_eq!(composite.dimensions(), (90, 20));
        assert_eq!(*composite.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*composite.get_pixel(45, 10), Rgb([10, 20, 30]));
        assert_eq!(*composite.get_pixel(89, 19), Rgb([10, 20, 30]));
    }
}
