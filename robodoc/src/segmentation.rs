// Difference-map segmentation
// Aligns the control sample to the subject, differences their luminance and
// thresholds the smoothed result into a binary injury mask

use crate::error::{Result, RobodocError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;
use log::debug;
use robodoc_common::{ImageSize, BLUR_KERNEL_SIZE, BLUR_SIGMA};

/// Foreground value of every binary mask produced by the engine
pub const FOREGROUND: u8 = 255;

/// Intermediate maps of one segmentation run
pub struct Segmentation {
    /// Smoothed absolute luminance difference
    pub difference: GrayImage,
    /// `FOREGROUND` where `difference` exceeds the threshold, 0 elsewhere
    pub mask: GrayImage,
}

impl Segmentation {
    pub fn foreground_pixels(&self) -> usize {
        count_foreground(&self.mask)
    }
}

/// Run steps 1-5 of the difference engine: align, luminance, absolute
/// difference, Gaussian smoothing and binary threshold.
pub fn segment_difference(
    subject: &DynamicImage,
    control: &DynamicImage,
    threshold: u8,
) -> Result<Segmentation> {
    let size = ensure_non_empty(subject, "subject")?;
    ensure_non_empty(control, "control")?;

    let aligned = align_to(control, size);
    if aligned.dimensions() != (size.width, size.height) {
        return Err(RobodocError::InvalidImage(format!(
            "control resampled to {}×{}, expected {}",
            aligned.width(),
            aligned.height(),
            size
        )));
    }

    let subject_luma = luminance(subject);
    let control_luma = luminance(&aligned);
    let raw = absolute_difference(&subject_luma, &control_luma);
    let difference = smooth_difference(&raw);
    let mask = threshold_mask(&difference, threshold);

    let peak = difference.pixels().map(|p| p[0]).max().unwrap_or(0);
    debug!(
        "Difference map {}: peak {} after blur, {} pixel(s) above threshold {}",
        size,
        peak,
        count_foreground(&mask),
        threshold
    );

    Ok(Segmentation { difference, mask })
}

/// Reject zero-sized images, returning the size otherwise
pub fn ensure_non_empty(image: &DynamicImage, role: &str) -> Result<ImageSize> {
    let size = ImageSize::new(image.width(), image.height());
    if size.is_empty() {
        return Err(RobodocError::InvalidImage(format!(
            "{} image is empty ({})",
            role, size
        )));
    }
    Ok(size)
}

/// Resample `control` to exactly `size` with bilinear filtering
pub fn align_to(control: &DynamicImage, size: ImageSize) -> DynamicImage {
    if control.dimensions() == (size.width, size.height) {
        return control.clone();
    }
    debug!(
        "Resampling control {}×{} to {}",
        control.width(),
        control.height(),
        size
    );
    control.resize_exact(size.width, size.height, FilterType::Triangle)
}

/// Single-channel brightness; grayscale input passes through untouched.
///
/// Colour is weighted with the BT.601 coefficients (0.299 R + 0.587 G +
/// 0.114 B), rounded to the nearest grey level.
pub fn luminance(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    if !image.color().has_color() {
        return image.to_luma8();
    }
    map_colors(&image.to_rgb8(), |p| {
        let [r, g, b] = p.0.map(u32::from);
        Luma([((299 * r + 587 * g + 114 * b + 500) / 1000) as u8])
    })
}

/// Per-pixel |a - b| of two equally sized luminance images
pub fn absolute_difference(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut out = GrayImage::new(a.width(), a.height());
    for ((dst, pa), pb) in out.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        *dst = Luma([pa[0].abs_diff(pb[0])]);
    }
    out
}

/// Normalized 1D Gaussian with `size` taps centred on the middle one
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Apply the fixed 19×19 Gaussian to a difference map.
///
/// Suppresses single-pixel noise left by registration error. Border pixels
/// are extended by replication.
pub fn smooth_difference(difference: &GrayImage) -> GrayImage {
    let kernel = gaussian_kernel(BLUR_KERNEL_SIZE, BLUR_SIGMA);
    separable_filter_equal(difference, &kernel)
}

/// Binary segmentation: values strictly above `threshold` become foreground
pub fn threshold_mask(map: &GrayImage, threshold: u8) -> GrayImage {
    contrast::threshold(map, threshold, ThresholdType::Binary)
}

pub fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gray(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(BLUR_KERNEL_SIZE, BLUR_SIGMA);
        assert_eq!(kernel.len(), 19);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
        }
        assert!(kernel[9] > kernel[8]);
    }

    #[test]
    fn absolute_difference_is_order_independent() {
        let a = gray(4, 3, 200);
        let b = gray(4, 3, 30);
        assert_eq!(absolute_difference(&a, &b), absolute_difference(&b, &a));
        assert!(absolute_difference(&a, &b).pixels().all(|p| p[0] == 170));
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let mut map = gray(3, 1, 0);
        map.put_pixel(0, 0, Luma([49]));
        map.put_pixel(1, 0, Luma([50]));
        map.put_pixel(2, 0, Luma([51]));
        let mask = threshold_mask(&map, 50);
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 0, 255]);
    }

    #[test]
    fn uniform_map_survives_blur() {
        let smoothed = smooth_difference(&gray(30, 30, 80));
        assert!(smoothed.pixels().all(|p| (79..=80).contains(&p[0])));
    }

    #[test]
    fn grayscale_input_passes_through() {
        let mut g = gray(5, 5, 12);
        g.put_pixel(2, 2, Luma([240]));
        assert_eq!(luminance(&DynamicImage::ImageLuma8(g.clone())), g);
    }

    #[test]
    fn colour_uses_bt601_weights() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([50, 100, 100])
            } else {
                Rgb([250, 100, 100])
            }
        });
        let luma = luminance(&DynamicImage::ImageRgb8(img));
        assert_eq!(luma.get_pixel(0, 0)[0], 85);
        assert_eq!(luma.get_pixel(1, 0)[0], 145);
        assert_eq!(
            luminance(&DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]))))
                .get_pixel(0, 0)[0],
            255
        );
    }

    #[test]
    fn red_patch_clears_default_threshold() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([50, 100, 100]));
        for y in 30..70 {
            for x in 30..70 {
                img.put_pixel(x, y, Rgb([250, 100, 100]));
            }
        }
        let subject = DynamicImage::ImageRgb8(img);
        let control = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([50, 100, 100])));

        let seg = segment_difference(&subject, &control, 50).unwrap();
        assert!((59..=60).contains(&seg.difference.get_pixel(50, 50)[0]));
        assert_eq!(seg.mask.get_pixel(50, 50)[0], FOREGROUND);
        assert_eq!(seg.mask.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn control_is_resampled_to_subject_size() {
        let control = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 7, Rgb([9, 9, 9])));
        let aligned = align_to(&control, ImageSize::new(40, 30));
        assert_eq!(aligned.dimensions(), (40, 30));
    }

    #[test]
    fn identical_images_have_no_signal() {
        let mut img = RgbImage::from_pixel(50, 40, Rgb([120, 90, 60]));
        img.put_pixel(10, 10, Rgb([255, 0, 0]));
        let subject = DynamicImage::ImageRgb8(img);
        let seg = segment_difference(&subject, &subject, 3).unwrap();
        assert!(seg.difference.pixels().all(|p| p[0] == 0));
        assert_eq!(seg.foreground_pixels(), 0);
    }

    #[test]
    fn empty_control_is_rejected() {
        let subject = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        let control = DynamicImage::ImageRgb8(RgbImage::new(0, 5));
        assert!(matches!(
            segment_difference(&subject, &control, 50),
            Err(RobodocError::InvalidImage(_))
        ));
    }
}
