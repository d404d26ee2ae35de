// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster transcoder — picks the output format for a media part and runs the
// decode/stretch/encode pass off the async executor.

use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::units::{MAX_TARGET_DIMENSION, within_pixel_limits};
use tracing::{debug, instrument};

use super::processor::ImageProcessor;
use crate::scan::extension_of;

/// Default JPEG quality (0.95 on a 0-1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encoded output format for a resampled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless; keeps transparency.
    Png,
    /// Lossy at the given quality (1-100).
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Output format for a media part, chosen by its source extension.
    ///
    /// png, gif, and bmp become PNG; jpg/jpeg and anything else become JPEG.
    pub fn for_path(path: &str, jpeg_quality: u8) -> Self {
        match extension_of(path).as_deref() {
            Some("png" | "gif" | "bmp") => Self::Png,
            _ => Self::Jpeg {
                quality: jpeg_quality,
            },
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Host decode/encode capability.
///
/// Implementations are synchronous and CPU-bound; [`Transcoder`] runs them on
/// the blocking pool.
pub trait RasterCodec: Send + Sync {
    /// Decode `data`, stretch it to exactly `width` x `height`, and encode it
    /// as `format`. Fails with `Decode` or `Encode`.
    fn resample(&self, data: &[u8], width: u32, height: u32, format: OutputFormat)
    -> Result<Vec<u8>>;
}

/// [`RasterCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl RasterCodec for ImageCodec {
    fn resample(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        if !within_pixel_limits(width, height) {
            return Err(BildwerkError::Encode(format!(
                "target {width}x{height} exceeds the {MAX_TARGET_DIMENSION}x{MAX_TARGET_DIMENSION} pixel limit"
            )));
        }
        let processor = ImageProcessor::from_bytes(data)?;
        let (from_w, from_h) = (processor.width(), processor.height());
        let resized = processor.resize_exact(width, height);
        let encoded = match format {
            OutputFormat::Png => resized.to_png_bytes()?,
            OutputFormat::Jpeg { quality } => resized.to_jpeg_bytes(quality)?,
        };
        debug!(
            from_w,
            from_h,
            width,
            height,
            mime = format.mime_type(),
            bytes_in = data.len(),
            bytes_out = encoded.len(),
            "Image resampled"
        );
        Ok(encoded)
    }
}

/// Async front for a [`RasterCodec`]. Cheap to clone.
#[derive(Clone)]
pub struct Transcoder {
    codec: Arc<dyn RasterCodec>,
    jpeg_quality: u8,
}

impl Transcoder {
    pub fn new(codec: Arc<dyn RasterCodec>, jpeg_quality: u8) -> Self {
        Self {
            codec,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Transcode one media part to `width` x `height`. The output format is
    /// chosen from `path`'s extension.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn transcode(
        &self,
        data: Vec<u8>,
        width: u32,
        height: u32,
        path: &str,
    ) -> Result<Vec<u8>> {
        let format = OutputFormat::for_path(path, self.jpeg_quality);
        let codec = Arc::clone(&self.codec);
        tokio::task::spawn_blocking(move || codec.resample(&data, width, height, format))
            .await
            .map_err(|err| BildwerkError::Task(format!("transcode task failed: {err}")))?
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(Arc::new(ImageCodec), DEFAULT_JPEG_QUALITY)
    }
}
