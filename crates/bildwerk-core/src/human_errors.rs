// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the CLI presents it.

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, ValidationError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Something went wrong that may not happen again (I/O hiccup, timeout).
    Transient,
    /// The user must change the input (wrong size, too many files).
    ActionRequired,
    /// This document cannot be processed as-is.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `BildwerkError` into a `HumanError`.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    match err {
        BildwerkError::UnsupportedLegacyFormat => HumanError {
            message: "Old-style .doc files can't be processed.".into(),
            suggestion: "Open the file in your word processor, save it as .docx, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        BildwerkError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Only .docx documents can be resized. (File: {detail})"),
            severity: Severity::Permanent,
        },

        BildwerkError::Archive(_) => HumanError {
            message: "This document couldn't be opened.".into(),
            suggestion: "The file may be damaged or not really a .docx. Try opening it in your word processor and saving it again.".into(),
            severity: Severity::Permanent,
        },

        BildwerkError::Decode(_) | BildwerkError::Encode(_) => HumanError {
            message: "An image in this document couldn't be resized.".into(),
            suggestion: "It was left at its original size. Replace it with a JPEG or PNG if it needs resizing.".into(),
            severity: Severity::Permanent,
        },

        BildwerkError::Validation(validation) => humanize_validation(validation),

        BildwerkError::TimedOut(_) => HumanError {
            message: "This document took too long to process.".into(),
            suggestion: "Try again with fewer documents at a time, or raise the time limit.".into(),
            severity: Severity::Transient,
        },

        BildwerkError::InvalidTransition { .. } | BildwerkError::Task(_) => HumanError {
            message: "Processing stopped unexpectedly.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Transient,
        },

        BildwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied while reading or writing a file.".into(),
                    suggestion: "Check the file permissions, or choose a different output folder.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        BildwerkError::Serialization(_) => HumanError {
            message: "The configuration or report file is not valid JSON.".into(),
            suggestion: "Fix or remove the config file and try again.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_validation(err: &ValidationError) -> HumanError {
    let (message, suggestion) = match err {
        ValidationError::NoFiles => (
            "No documents were selected.".to_string(),
            "Choose one or more .docx files.".to_string(),
        ),
        ValidationError::InvalidDimension { field, value } => (
            format!("The {field} \"{value}\" isn't a number."),
            "Enter a size like 3.8 or 2.14.".to_string(),
        ),
        ValidationError::NonPositiveDimension { field, .. } => (
            format!("The {field} must be greater than zero."),
            "Enter a positive size.".to_string(),
        ),
        ValidationError::ZeroPixelDimension { field } => (
            format!("The {field} is smaller than one pixel."),
            "Enter a larger size or pick a bigger unit.".to_string(),
        ),
        ValidationError::TargetTooLarge { max, .. } => (
            "The target size is too large.".to_string(),
            format!("Choose a size of at most {max} pixels on each side."),
        ),
        ValidationError::TooManyFiles { max, .. } => (
            "Too many documents were selected.".to_string(),
            format!("Choose at most {max} documents at a time."),
        ),
        ValidationError::InvalidConcurrency => (
            "The concurrency setting is invalid.".to_string(),
            "Set it to 1 or more.".to_string(),
        ),
    };
    HumanError {
        message,
        suggestion,
        severity: Severity::ActionRequired,
    }
}
