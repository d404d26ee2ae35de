// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration resolution: defaults, then the JSON config file, then
// environment variables and command-line flags (clap merges those two, flags
// winning).

use std::path::{Path, PathBuf};

use bildwerk_core::config::ResizeConfig;
use bildwerk_core::error::Result;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// Values from the environment or the command line that override the file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub max_batch_size: Option<usize>,
    pub max_concurrent_documents: Option<usize>,
    pub max_concurrent_images: Option<usize>,
    pub jpeg_quality: Option<u8>,
    pub document_timeout_secs: Option<u64>,
}

/// Default config file location, `$XDG_CONFIG_HOME/bildwerk/config.json`.
pub fn default_config_path() -> PathBuf {
    config_base().join("bildwerk").join(CONFIG_FILE)
}

fn config_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}

/// Load the config file. An explicit path must exist; the default path is
/// optional and falls back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ResizeConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !required && !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(ResizeConfig::default());
    }

    let data = std::fs::read_to_string(&path)?;
    let config = ResizeConfig::from_json(&data)?;
    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Apply overrides on top of a loaded config and re-validate.
pub fn resolve(mut config: ResizeConfig, overrides: &Overrides) -> Result<ResizeConfig> {
    if let Some(max) = overrides.max_batch_size {
        config.max_batch_size = max;
    }
    if let Some(concurrency) = overrides.max_concurrent_documents {
        config.max_concurrent_documents = concurrency;
    }
    if let Some(images) = overrides.max_concurrent_images {
        config.max_concurrent_images = images;
    }
    if let Some(quality) = overrides.jpeg_quality {
        config.jpeg_quality = quality;
    }
    if let Some(secs) = overrides.document_timeout_secs {
        config.document_timeout_secs = Some(secs);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::error::{BildwerkError, ValidationError};

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bildwerk.json");
        std::fs::write(&path, r#"{"max_batch_size": 10, "default_unit": "mm"}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.default_unit, bildwerk_core::LengthUnit::Mm);
        assert_eq!(config.max_concurrent_documents, 4);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, BildwerkError::Io(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_config(Some(&path)).unwrap_err(),
            BildwerkError::Serialization(_)
        ));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let overrides = Overrides {
            max_batch_size: Some(5),
            max_concurrent_documents: Some(2),
            max_concurrent_images: Some(1),
            jpeg_quality: None,
            document_timeout_secs: Some(60),
        };
        let config = resolve(ResizeConfig::default(), &overrides).unwrap();
        assert_eq!(config.max_batch_size, 5);
        assert_eq!(config.max_concurrent_documents, 2);
        assert_eq!(config.max_concurrent_images, 1);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.document_timeout_secs, Some(60));
    }

    #[test]
    fn zero_concurrency_override_is_rejected() {
        let overrides = Overrides {
            max_concurrent_documents: Some(0),
            ..Overrides::default()
        };
        let err = resolve(ResizeConfig::default(), &overrides).unwrap_err();
        assert!(matches!(
            err,
            BildwerkError::Validation(ValidationError::InvalidConcurrency)
        ));
    }
}
