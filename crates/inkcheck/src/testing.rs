//! Image fixtures for unit tests.

use crate::diff::encode_png;
use image::{Rgba, RgbaImage};

/// PNG of a single colour
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    png_with_pixels(width, height, color, &[])
}

/// PNG of `base` colour with individual pixels overridden
pub fn png_with_pixels(
    width: u32,
    height: u32,
    base: [u8; 4],
    pixels: &[(u32, u32, [u8; 4])],
) -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(width, height, Rgba(base));
    for &(x, y, color) in pixels {
        img.put_pixel(x, y, Rgba(color));
    }
    encode_png(&img).expect("fixture encodes")
}
