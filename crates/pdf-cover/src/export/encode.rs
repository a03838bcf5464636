//! Raster encoders for image exports

use crate::types::*;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

/// Encode a composited raster
pub fn encode_image(image: &RgbaImage, encoding: ImageEncoding) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match encoding {
        ImageEncoding::Png => {
            PngEncoder::new(&mut bytes).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        ImageEncoding::Jpeg { quality } => {
            // JPEG has no alpha channel; composites are opaque anyway
            let rgb: RgbImage = image.convert();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}
