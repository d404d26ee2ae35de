// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Media scanner — finds embedded image parts inside a document package.

use tracing::debug;

use crate::archive::DocumentArchive;

/// Package areas that hold embedded images.
pub const MEDIA_PREFIXES: [&str; 2] = ["word/media/", "word/embeddings/"];

/// Image extensions recognised as media (lowercase).
pub const MEDIA_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "emf", "wmf",
];

/// Vector formats that are found but never resampled.
pub const VECTOR_EXTENSIONS: [&str; 3] = ["svg", "emf", "wmf"];

/// Lowercase extension of the last path segment, if any.
pub fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Whether `path` names a vector image.
pub fn is_vector_media(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| VECTOR_EXTENSIONS.contains(&ext.as_str()))
}

fn is_media_path(path: &str) -> bool {
    MEDIA_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        && extension_of(path).is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Image entries of the package, in archive order. Vector images are
/// included; deciding what to resample is left to the caller.
pub fn scan_media(archive: &DocumentArchive) -> Vec<String> {
    let media: Vec<String> = archive
        .entries()
        .iter()
        .filter(|entry| !entry.is_dir && is_media_path(&entry.path))
        .map(|entry| entry.path.clone())
        .collect();
    debug!(count = media.len(), "Media entries found");
    media
}
