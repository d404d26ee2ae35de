// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::units::LengthUnit;

/// Settings resolved once at process start and injected into the batch driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Target width used when none is given on the command line.
    pub default_width: f64,
    /// Target height used when none is given on the command line.
    pub default_height: f64,
    /// Unit for the default target size.
    pub default_unit: LengthUnit,
    /// Maximum number of documents per submission.
    pub max_batch_size: usize,
    /// Documents processed at the same time.
    pub max_concurrent_documents: usize,
    /// Images transcoded at the same time within one document.
    pub max_concurrent_images: usize,
    /// JPEG quality (1-100) for re-encoded JPEG output.
    pub jpeg_quality: u8,
    /// Per-document time limit in seconds. `None` means no limit.
    pub document_timeout_secs: Option<u64>,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            default_width: 3.8,
            default_height: 2.14,
            default_unit: LengthUnit::Cm,
            max_batch_size: 30,
            max_concurrent_documents: 4,
            max_concurrent_images: 4,
            jpeg_quality: 95,
            document_timeout_secs: None,
        }
    }
}

impl ResizeConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_documents == 0 || self.max_concurrent_images == 0 {
            return Err(ValidationError::InvalidConcurrency.into());
        }
        Ok(())
    }

    /// JPEG quality clamped to the encoder's accepted range.
    pub fn effective_jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ResizeConfig::from_json(r#"{ "max_batch_size": 10, "default_unit": "mm" }"#)
            .unwrap();
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.default_unit, LengthUnit::Mm);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.max_concurrent_documents, 4);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(ResizeConfig::from_json(r#"{ "max_concurrent_documents": 0 }"#).is_err());
        assert!(ResizeConfig::from_json(r#"{ "max_concurrent_images": 0 }"#).is_err());
    }

    #[test]
    fn quality_is_clamped() {
        let config = ResizeConfig {
            jpeg_quality: 0,
            ..ResizeConfig::default()
        };
        assert_eq!(config.effective_jpeg_quality(), 1);
    }
}
