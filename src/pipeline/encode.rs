//! Image encoding: rendered page → JPEG bytes for the model request.
//!
//! The upstream pipeline has always submitted JPEG to the model, so
//! rendered pages are re-encoded as JPEG rather than PNG. pdfium hands
//! back RGBA bitmaps and JPEG has no alpha channel, so pages are flattened
//! to RGB first.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Re-encode a rendered page as JPEG bytes.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;
    debug!("Encoded page → {} JPEG bytes", buf.len());

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_rgba_page() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let bytes = encode_jpeg(&img).expect("encode should succeed");
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(bytes.len() > 2);
    }
}
