// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Bildwerk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BildwerkError, Result, ValidationError};
use crate::human_errors::{HumanError, humanize_error};
use crate::units::{self, LengthUnit};

/// Unique identifier for one batch submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of input document, inferred from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Zip-based WordprocessingML package (`.docx`).
    Docx,
    /// Pre-XML binary Word document (`.doc`). Accepted as input, never processed.
    LegacyDoc,
    /// Anything else.
    Other,
}

impl DocumentKind {
    /// Infer the document kind from a file name (case-insensitive).
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".docx") {
            Self::Docx
        } else if lower.ends_with(".doc") {
            Self::LegacyDoc
        } else {
            Self::Other
        }
    }

    /// Whether a file of this kind may be submitted at all.
    pub fn is_selectable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Target on-page size for every image in a submission.
///
/// Immutable once built. `width` and `height` are kept exactly as the user
/// entered them so messages and file names echo the user's numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSize {
    width: f64,
    height: f64,
    unit: LengthUnit,
}

impl TargetSize {
    /// Build a target size, rejecting NaN, infinite, non-positive, sub-pixel,
    /// and oversized dimensions.
    pub fn new(width: f64, height: f64, unit: LengthUnit) -> Result<Self> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        let target = Self {
            width,
            height,
            unit,
        };
        if target.pixel_width() == 0 {
            return Err(ValidationError::ZeroPixelDimension { field: "width" }.into());
        }
        if target.pixel_height() == 0 {
            return Err(ValidationError::ZeroPixelDimension { field: "height" }.into());
        }
        let (px_w, px_h) = (target.pixel_width(), target.pixel_height());
        if !units::within_pixel_limits(px_w, px_h) {
            return Err(ValidationError::TargetTooLarge {
                width: px_w,
                height: px_h,
                max: units::MAX_TARGET_DIMENSION,
            }
            .into());
        }
        Ok(target)
    }

    /// Build a target size from raw user input. Unknown unit labels fall back
    /// to centimetres.
    pub fn parse(width: &str, height: &str, unit: &str) -> Result<Self> {
        let w = parse_dimension("width", width)?;
        let h = parse_dimension("height", height)?;
        Self::new(w, h, LengthUnit::from_label_lenient(unit))
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Target width in pixels at 96 DPI.
    pub fn pixel_width(&self) -> u32 {
        units::to_pixels(self.width, self.unit)
    }

    /// Target height in pixels at 96 DPI.
    pub fn pixel_height(&self) -> u32 {
        units::to_pixels(self.height, self.unit)
    }

    /// Target width in EMUs.
    pub fn emu_width(&self) -> u64 {
        units::pixels_to_emu(self.pixel_width())
    }

    /// Target height in EMUs.
    pub fn emu_height(&self) -> u64 {
        units::pixels_to_emu(self.pixel_height())
    }

    /// `3.8x2.14cm`, the form used in output file names.
    pub fn size_label(&self) -> String {
        format!("{}x{}{}", self.width, self.height, self.unit)
    }

    /// Derive the output file name by inserting `_resized_{W}x{H}{unit}`
    /// before the original extension.
    pub fn output_file_name(&self, original: &str) -> String {
        let suffix = format!("_resized_{}", self.size_label());
        match original.rfind('.') {
            Some(dot) if dot > 0 => {
                format!("{}{}{}", &original[..dot], suffix, &original[dot..])
            }
            _ => format!("{original}{suffix}"),
        }
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}{}", self.width, self.height, self.unit)
    }
}

fn parse_dimension(field: &'static str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| {
            ValidationError::InvalidDimension {
                field,
                value: raw.to_owned(),
            }
            .into()
        })
}

fn check_dimension(field: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension {
            field,
            value: value.to_string(),
        }
        .into());
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveDimension { field, value }.into());
    }
    Ok(())
}

/// A document handed to the batch driver.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl InputDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_file_name(&self.file_name)
    }
}

/// Lifecycle of one document within a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Idle,
    Processing,
    Completed,
    Error,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Image counts for one transformed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCounts {
    /// Media entries found by the scanner (vector ones included).
    pub found: usize,
    /// Images transcoded and replaced.
    pub processed: usize,
    /// Images that failed to transcode and were kept as-is.
    pub failed: usize,
    /// Vector images left untouched.
    pub skipped: usize,
}

/// Result of processing one document.
///
/// Starts `Idle`, may move to `Processing`, and then transitions exactly once
/// to `Completed` or `Error`. Terminal states reject further transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    pub file_name: String,
    pub status: DocumentStatus,
    pub processed_image_count: usize,
    pub failed_image_count: usize,
    pub skipped_image_count: usize,
    pub message: String,
    pub error: Option<String>,
    /// Plain-English form of `error`, when it came from a [`BildwerkError`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_error: Option<HumanError>,
    /// SHA-256 of the input bytes, hex encoded.
    pub input_sha256: Option<String>,
    /// SHA-256 of the output bytes, hex encoded.
    pub output_sha256: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Rebuilt package, present only when `Completed`.
    #[serde(skip)]
    pub output_bytes: Option<Vec<u8>>,
}

impl ProcessingOutcome {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            status: DocumentStatus::Idle,
            processed_image_count: 0,
            failed_image_count: 0,
            skipped_image_count: 0,
            message: String::new(),
            error: None,
            human_error: None,
            input_sha256: None,
            output_sha256: None,
            started_at: None,
            finished_at: None,
            output_bytes: None,
        }
    }

    /// `Idle → Processing`.
    pub fn begin(&mut self) -> Result<()> {
        self.transition(DocumentStatus::Processing)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// `Idle | Processing → Completed`.
    pub fn complete(
        &mut self,
        counts: ImageCounts,
        message: impl Into<String>,
        output: Vec<u8>,
    ) -> Result<()> {
        self.transition(DocumentStatus::Completed)?;
        self.processed_image_count = counts.processed;
        self.failed_image_count = counts.failed;
        self.skipped_image_count = counts.skipped;
        self.message = message.into();
        self.output_bytes = Some(output);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// `Idle | Processing → Error`.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(DocumentStatus::Error)?;
        let error = error.into();
        self.message = error.clone();
        self.error = Some(error);
        self.output_bytes = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// [`fail`](Self::fail) with `err`, keeping its humanized form.
    pub fn fail_with(&mut self, err: &BildwerkError) -> Result<()> {
        self.fail(err.to_string())?;
        self.human_error = Some(humanize_error(err));
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == DocumentStatus::Completed
    }

    fn transition(&mut self, to: DocumentStatus) -> Result<()> {
        let allowed = match (self.status, to) {
            (DocumentStatus::Idle, DocumentStatus::Processing) => true,
            (DocumentStatus::Idle | DocumentStatus::Processing, t) => t.is_terminal(),
            _ => false,
        };
        if !allowed {
            return Err(BildwerkError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
