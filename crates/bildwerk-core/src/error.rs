// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

use crate::types::DocumentStatus;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Document errors --
    #[error("legacy .doc documents are not supported; save the file as .docx and try again")]
    UnsupportedLegacyFormat,

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("archive error: {0}")]
    Archive(String),

    // -- Image errors (recovered per image) --
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    // -- Submission errors --
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    // -- Lifecycle --
    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("background task failed: {0}")]
    Task(String),

    #[error("processing timed out after {0:?}")]
    TimedOut(std::time::Duration),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Submission-level validation failures. Raised before any document is
/// touched; no per-document outcomes exist when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no documents selected")]
    NoFiles,

    #[error("{field} is not a number: {value:?}")]
    InvalidDimension { field: &'static str, value: String },

    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveDimension { field: &'static str, value: f64 },

    #[error("{field} rounds to zero pixels")]
    ZeroPixelDimension { field: &'static str },

    #[error("target size {width}x{height} px exceeds the {max}x{max} px limit")]
    TargetTooLarge { width: u32, height: u32, max: u32 },

    #[error("too many documents: {count} selected, at most {max} allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
