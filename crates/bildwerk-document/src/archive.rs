// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory model of a zip-based document package.
//
// Entries are enumerated once at open. Replacements are whole-entry upserts
// keyed by path; untouched entries are copied raw (still compressed) into the
// rebuilt archive so their bytes cannot drift.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use bildwerk_core::error::{BildwerkError, Result};
use tracing::{debug, info, instrument};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One entry as listed in the archive's central directory.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path inside the package, e.g. `word/media/image1.png`.
    pub path: String,
    pub is_dir: bool,
    compression: CompressionMethod,
    /// Position in the source archive; `None` for entries added after open.
    source_index: Option<usize>,
}

/// An open document package.
///
/// Owns every entry for the lifetime of one document's processing. Entries
/// are never patched in place: [`DocumentArchive::write`] supersedes the
/// whole entry.
pub struct DocumentArchive {
    source: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
    replaced: HashMap<String, Vec<u8>>,
}

impl DocumentArchive {
    /// Open a package from raw bytes.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn open(data: Vec<u8>) -> Result<Self> {
        let mut source = ZipArchive::new(Cursor::new(data))
            .map_err(|err| BildwerkError::Archive(format!("failed to open package: {err}")))?;

        let mut entries = Vec::with_capacity(source.len());
        for index in 0..source.len() {
            let file = source.by_index_raw(index).map_err(|err| {
                BildwerkError::Archive(format!("failed to read entry #{index}: {err}"))
            })?;
            entries.push(ArchiveEntry {
                path: file.name().to_owned(),
                is_dir: file.is_dir(),
                compression: file.compression(),
                source_index: Some(index),
            });
        }

        debug!(entries = entries.len(), "Package opened");
        Ok(Self {
            source,
            entries,
            replaced: HashMap::new(),
        })
    }

    /// Every entry, in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    /// Read the current bytes of an entry (replacement first, then source).
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        if let Some(data) = self.replaced.get(path) {
            return Ok(data.clone());
        }

        let mut file = self.source.by_name(path).map_err(|err| match err {
            ZipError::FileNotFound => BildwerkError::Archive(format!("no entry named {path}")),
            other => BildwerkError::Archive(format!("failed to read {path}: {other}")),
        })?;
        let mut buffer = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut buffer)
            .map_err(|err| BildwerkError::Archive(format!("failed to inflate {path}: {err}")))?;
        Ok(buffer)
    }

    /// Read an entry as UTF-8 text.
    pub fn read_text(&mut self, path: &str) -> Result<String> {
        let data = self.read(path)?;
        String::from_utf8(data)
            .map_err(|err| BildwerkError::Archive(format!("{path} is not valid UTF-8: {err}")))
    }

    /// Replace (or add) an entry wholesale.
    pub fn write(&mut self, path: &str, data: Vec<u8>) {
        if !self.contains(path) {
            self.entries.push(ArchiveEntry {
                path: path.to_owned(),
                is_dir: false,
                compression: CompressionMethod::Deflated,
                source_index: None,
            });
        }
        self.replaced.insert(path.to_owned(), data);
    }

    /// Replace an entry with text content.
    pub fn write_text(&mut self, path: &str, text: String) {
        self.write(path, text.into_bytes());
    }

    /// Number of entries replaced or added since open.
    pub fn replaced_count(&self) -> usize {
        self.replaced.len()
    }

    /// Rebuild the package. Entry order and per-entry compression method are
    /// preserved; untouched entries are copied without recompression.
    #[instrument(skip(self), fields(entries = self.entries.len(), replaced = self.replaced.len()))]
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            if let Some(data) = self.replaced.get(&entry.path) {
                let options =
                    SimpleFileOptions::default().compression_method(writable_method(entry.compression));
                writer
                    .start_file(entry.path.as_str(), options)
                    .map_err(|err| repack_error(&entry.path, err))?;
                writer
                    .write_all(data)
                    .map_err(|err| BildwerkError::Archive(format!("failed to write {}: {err}", entry.path)))?;
            } else if let Some(index) = entry.source_index {
                let file = self
                    .source
                    .by_index_raw(index)
                    .map_err(|err| repack_error(&entry.path, err))?;
                writer
                    .raw_copy_file(file)
                    .map_err(|err| repack_error(&entry.path, err))?;
            }
        }

        let cursor = writer
            .finish()
            .map_err(|err| BildwerkError::Archive(format!("failed to finish package: {err}")))?;
        let bytes = cursor.into_inner();
        info!(bytes_len = bytes.len(), "Package rebuilt");
        Ok(bytes)
    }
}

/// Methods we can re-encode with; anything exotic is written deflated.
fn writable_method(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

fn repack_error(path: &str, err: ZipError) -> BildwerkError {
    BildwerkError::Archive(format!("failed to repackage {path}: {err}"))
}
