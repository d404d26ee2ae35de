// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input selection: keep document paths, read them into memory.

use std::path::{Path, PathBuf};

use bildwerk_core::error::Result;
use bildwerk_core::types::{DocumentKind, InputDocument};
use tracing::{debug, warn};

/// Keep `.docx` and `.doc` paths; anything else is dropped with a warning.
/// Legacy `.doc` files are kept so they get an explanatory error outcome.
pub fn select_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let selectable = DocumentKind::from_file_name(&display_name(path)).is_selectable();
            if !selectable {
                warn!(path = %path.display(), "Skipping non-document file");
            }
            selectable
        })
        .cloned()
        .collect()
}

/// Read each selected path. The document name is the final path component.
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<InputDocument>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)?;
            debug!(path = %path.display(), bytes_len = bytes.len(), "Read document");
            Ok(InputDocument::new(display_name(path), bytes))
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_documents_are_selected() {
        let paths: Vec<PathBuf> = ["a.docx", "photo.png", "dir/B.DOCX", "old.doc", "notes.txt"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let selected = select_documents(&paths);
        assert_eq!(
            selected,
            vec![
                PathBuf::from("a.docx"),
                PathBuf::from("dir/B.DOCX"),
                PathBuf::from("old.doc"),
            ]
        );
    }

    #[test]
    fn documents_are_named_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        std::fs::write(&path, b"PK").unwrap();

        let docs = read_documents(&[path]).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "report.docx");
        assert_eq!(docs[0].bytes, b"PK");
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_documents(&[dir.path().join("missing.docx")]).is_err());
    }
}
