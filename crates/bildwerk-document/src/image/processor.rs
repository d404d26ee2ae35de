// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, stretch to an exact size, and encode. Operates on
// in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use bildwerk_core::error::BildwerkError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&data)?
///     .resize_exact(144, 81)
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, GIF, BMP, TIFF).
    ///
    /// The format is sniffed from the bytes, not taken from any file name.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, BildwerkError> {
        let img = image::load_from_memory(data).map_err(|err| {
            BildwerkError::Decode(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations ------------------------------------------------------

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    ///
    /// The source is stretched to cover the whole destination. Lanczos3 is
    /// the highest-quality filter `image` offers.
    #[instrument(skip(self))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Stretching image"
        );
        let resized = self.image.resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes. Alpha is kept.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, BildwerkError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    /// Alpha is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, BildwerkError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            BildwerkError::Encode(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, BildwerkError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        BildwerkError::Encode(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            Rgba([(x * 10) as u8, 80, 160, if x % 2 == 0 { 255 } else { 0 }])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn stretches_to_exact_size() {
        let processor = ImageProcessor::from_bytes(&sample_png(20, 10))
            .unwrap()
            .resize_exact(7, 30);
        assert_eq!((processor.width(), processor.height()), (7, 30));
    }

    #[test]
    fn png_output_keeps_alpha() {
        let png = ImageProcessor::from_bytes(&sample_png(4, 4))
            .unwrap()
            .resize_exact(8, 8)
            .to_png_bytes()
            .unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn jpeg_output_is_jpeg() {
        let jpeg = ImageProcessor::from_bytes(&sample_png(4, 4))
            .unwrap()
            .to_jpeg_bytes(95)
            .unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = ImageProcessor::from_bytes(b"not an image at all");
        assert!(matches!(result, Err(BildwerkError::Decode(_))));
    }
}
