//! Poster decode and scale primitives

use image::imageops::FilterType;

use crate::error::Result;

use super::Poster;

/// Decode raw image bytes and aspect-fill scale to the target footprint
///
/// Aspect-fill: the result fills `width`x`height` exactly, cropping
/// overflow rather than letterboxing. Resampling is Lanczos3 (smooth).
/// Undecodable bytes map to `Error::Corrupt`.
pub fn decode_and_scale(bytes: &[u8], width: u32, height: u32) -> Result<Poster> {
    let img = image::load_from_memory(bytes)?;
    let scaled = img.resize_to_fill(width, height, FilterType::Lanczos3);
    let rgb = scaled.to_rgb8();

    Ok(Poster::new(rgb.as_raw().clone(), rgb.width(), rgb.height()))
}

#[cfg(test)]
pub(crate) fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
