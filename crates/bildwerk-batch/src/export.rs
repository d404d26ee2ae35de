// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of completed outputs to a directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use bildwerk_core::error::Result;
use bildwerk_core::types::{ProcessingOutcome, TargetSize};

/// Write every completed outcome's package into `dir` under its derived
/// `_resized_` name. Error outcomes are skipped and files left by earlier
/// runs are overwritten. Documents of one batch that share a name get `-2`,
/// `-3`, ... before the extension. Returns the written paths in outcome order.
#[instrument(skip(outcomes, target), fields(dir = %dir.display(), outcomes = outcomes.len()))]
pub fn export_completed(
    outcomes: &[ProcessingOutcome],
    target: &TargetSize,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    let mut taken = HashSet::new();
    for outcome in outcomes {
        let Some(bytes) = outcome.output_bytes.as_deref().filter(|_| outcome.is_completed()) else {
            debug!(file = %outcome.file_name, status = ?outcome.status, "Nothing to export");
            continue;
        };
        let name = unique_name(&target.output_file_name(base_name(&outcome.file_name)), &mut taken);
        let path = dir.join(name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes_len = bytes.len(), "Exported document");
        written.push(path);
    }

    info!(count = written.len(), "Export finished");
    Ok(written)
}

/// Final path component, so inputs given with directories land in `dir`.
fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name)
}

/// `name`, or the first `stem-N.ext` (N from 2) not yet taken in this export.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.to_owned();
    let mut n = 2;
    while !taken.insert(candidate.to_ascii_lowercase()) {
        warn!(name, n, "Output name already used in this batch");
        candidate = match name.rfind('.') {
            Some(dot) if dot > 0 => format!("{}-{n}{}", &name[..dot], &name[dot..]),
            _ => format!("{name}-{n}"),
        };
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_are_numbered() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("r_resized_1x1cm.docx", &mut taken), "r_resized_1x1cm.docx");
        assert_eq!(unique_name("r_resized_1x1cm.docx", &mut taken), "r_resized_1x1cm-2.docx");
        assert_eq!(unique_name("R_RESIZED_1x1cm.DOCX", &mut taken), "R_RESIZED_1x1cm-3.DOCX");
        assert_eq!(unique_name("plain", &mut taken), "plain");
        assert_eq!(unique_name("plain", &mut taken), "plain-2");
    }

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("reports/march/site.docx"), "site.docx");
        assert_eq!(base_name("site.docx"), "site.docx");
    }
}
