use image::{DynamicImage, Rgb, RgbImage};

pub const BACKGROUND: u8 = 20;
pub const INJURY: u8 = 220;

/// Uniform grey image with a brighter solid rectangle painted in.
pub fn subject_with_rect(
    width: u32,
    height: u32,
    rect: (u32, u32, u32, u32),
) -> DynamicImage {
    let (rx, ry, rw, rh) = rect;
    let img = RgbImage::from_fn(width, height, |x, y| {
        let inside = x >= rx && x < rx + rw && y >= ry && y < ry + rh;
        let v = if inside { INJURY } else { BACKGROUND };
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(img)
}

/// Uniform control sample matching the background of `subject_with_rect`.
pub fn uniform_control(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([BACKGROUND, BACKGROUND, BACKGROUND]),
    ))
}

/// Deterministic colour noise, for tests that need varied pixel values.
pub fn textured(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    });
    DynamicImage::ImageRgb8(img)
}
