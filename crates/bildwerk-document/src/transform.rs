// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document transformer — resizes every raster image in one .docx package and
// rewrites the drawing extents to match.
//
// Pipeline: open package → scan media → transcode each raster image (vector
// images skipped, failures kept at original size) → rewrite extents in the
// body, headers, and footers → repackage. Only package-level problems fail
// the document; a bad image never does.

use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{DocumentKind, ImageCounts, ProcessingOutcome, TargetSize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::archive::DocumentArchive;
use crate::image::Transcoder;
use crate::integrity::hash_bytes;
use crate::layout::{LAYOUT_PARTS, rewrite_layout};
use crate::scan::{is_vector_media, scan_media};

/// Images of one document transcoded at the same time unless configured.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// Successful transformation of one package.
struct TransformedPackage {
    counts: ImageCounts,
    message: String,
    output: Vec<u8>,
}

/// Applies one [`TargetSize`] to documents. Holds no per-document state, so
/// one transformer can serve many documents at once.
#[derive(Clone)]
pub struct DocumentTransformer {
    target: TargetSize,
    transcoder: Transcoder,
    image_concurrency: usize,
}

impl DocumentTransformer {
    pub fn new(target: TargetSize, transcoder: Transcoder) -> Self {
        Self {
            target,
            transcoder,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
        }
    }

    /// Limit how many images of one document are decoded at the same time.
    pub fn with_image_concurrency(mut self, limit: usize) -> Self {
        self.image_concurrency = limit.max(1);
        self
    }

    /// Process one document to a terminal outcome. Never returns an error:
    /// package-level failures become an `Error` outcome.
    #[instrument(skip(self, data), fields(file = %file_name, bytes_len = data.len()))]
    pub async fn transform(&self, file_name: &str, data: Vec<u8>) -> ProcessingOutcome {
        let mut outcome = ProcessingOutcome::new(file_name);
        if let Err(err) = outcome.begin() {
            error!(error = %err, "Outcome could not enter processing");
            return outcome;
        }
        outcome.input_sha256 = Some(hash_bytes(&data));

        let settled = match self.transform_package(file_name, data).await {
            Ok(package) => {
                info!(
                    processed = package.counts.processed,
                    failed = package.counts.failed,
                    skipped = package.counts.skipped,
                    "Document completed"
                );
                outcome.output_sha256 = Some(hash_bytes(&package.output));
                outcome.complete(package.counts, package.message, package.output)
            }
            Err(err) => {
                warn!(error = %err, "Document failed");
                outcome.fail_with(&err)
            }
        };
        if let Err(err) = settled {
            error!(error = %err, "Outcome was already terminal");
        }
        outcome
    }

    async fn transform_package(&self, file_name: &str, data: Vec<u8>) -> Result<TransformedPackage> {
        match DocumentKind::from_file_name(file_name) {
            DocumentKind::Docx => {}
            DocumentKind::LegacyDoc => return Err(BildwerkError::UnsupportedLegacyFormat),
            DocumentKind::Other => {
                return Err(BildwerkError::UnsupportedDocument(file_name.to_owned()));
            }
        }

        let mut archive = DocumentArchive::open(data)?;
        let media = scan_media(&archive);
        info!(media = media.len(), "Found image entries");

        let mut counts = self.resize_media(&mut archive, &media).await;
        counts.found = media.len();

        if !media.is_empty() {
            let rewritten = self.rewrite_layout_parts(&mut archive)?;
            debug!(rewritten, "Layout extents updated");
        }

        let output = archive.serialize()?;
        let message = summary_message(&counts, &self.target);
        Ok(TransformedPackage {
            counts,
            message,
            output,
        })
    }

    /// Transcode every raster image concurrently and write the successes
    /// back. Failures leave the original bytes in place.
    async fn resize_media(&self, archive: &mut DocumentArchive, media: &[String]) -> ImageCounts {
        let mut counts = ImageCounts::default();
        let (width, height) = (self.target.pixel_width(), self.target.pixel_height());
        let slots = Arc::new(Semaphore::new(self.image_concurrency));
        let mut tasks = JoinSet::new();

        for path in media {
            if is_vector_media(path) {
                debug!(path = %path, "Skipping vector image");
                counts.skipped += 1;
                continue;
            }
            // Held until the transcode finishes; bounds decoded images in memory.
            let permit = match Arc::clone(&slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    warn!(path = %path, error = %err, "No transcode slot, keeping original");
                    counts.failed += 1;
                    continue;
                }
            };
            let data = match archive.read(path) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path, error = %err, "Image unreadable, keeping original");
                    counts.failed += 1;
                    continue;
                }
            };
            let transcoder = self.transcoder.clone();
            let path = path.clone();
            tasks.spawn(async move {
                let result = transcoder.transcode(data, width, height, &path).await;
                drop(permit);
                (path, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((path, Ok(resized))) => {
                    archive.write(&path, resized);
                    counts.processed += 1;
                }
                Ok((path, Err(err))) => {
                    warn!(path = %path, error = %err, "Image failed, keeping original size");
                    counts.failed += 1;
                }
                Err(err) => {
                    warn!(error = %err, "Image task aborted, keeping original size");
                    counts.failed += 1;
                }
            }
        }
        counts
    }

    /// Rewrite extents in the body and every header/footer present.
    fn rewrite_layout_parts(&self, archive: &mut DocumentArchive) -> Result<usize> {
        let (cx, cy) = (self.target.emu_width(), self.target.emu_height());
        let mut total = 0;
        for part in LAYOUT_PARTS {
            if !archive.contains(part) {
                continue;
            }
            let markup = archive.read_text(part)?;
            let rewrite = rewrite_layout(&markup, cx, cy);
            debug!(part, rewritten = rewrite.rewritten, "Layout part scanned");
            total += rewrite.rewritten;
            if rewrite.changed_from(&markup) {
                archive.write_text(part, rewrite.markup);
            }
        }
        Ok(total)
    }
}

/// User-facing summary for a completed document.
pub fn summary_message(counts: &ImageCounts, target: &TargetSize) -> String {
    if counts.found == 0 {
        return "no processable images; original returned.".to_string();
    }
    if counts.processed == 0 {
        return format!(
            "found {} images, none processable (likely vector); original returned.",
            counts.found
        );
    }
    let mut message = format!("processed {} images to {}", counts.processed, target);
    if counts.failed > 0 {
        message.push_str(&format!(
            "; {} images failed, kept original size",
            counts.failed
        ));
    }
    message.push('.');
    message
}
