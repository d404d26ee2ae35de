// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch report rendering: a per-document summary for the terminal and a JSON
// report file.

use std::fmt::Write as _;
use std::path::Path;

use bildwerk_batch::BatchReport;
use bildwerk_core::error::Result;
use bildwerk_core::types::{DocumentStatus, ProcessingOutcome};

/// One line per document, followed by a totals line.
pub fn render_summary(report: &BatchReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let _ = writeln!(out, "{}", render_outcome(outcome));
    }
    let _ = writeln!(
        out,
        "{} of {} documents resized to {}.",
        report.completed_count(),
        report.outcomes.len(),
        report.target
    );
    out
}

fn render_outcome(outcome: &ProcessingOutcome) -> String {
    match outcome.status {
        DocumentStatus::Completed => {
            let mut line = format!("ok     {}: {}", outcome.file_name, outcome.message);
            if let Some(sha) = &outcome.output_sha256 {
                let _ = write!(line, " [sha256 {}]", short_digest(sha));
            }
            line
        }
        _ => match &outcome.human_error {
            Some(human) => format!(
                "error  {}: {} {}",
                outcome.file_name, human.message, human.suggestion
            ),
            None => format!(
                "error  {}: {}",
                outcome.file_name,
                outcome.error.as_deref().unwrap_or(&outcome.message)
            ),
        },
    }
}

fn short_digest(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}

/// Write the report (without output bytes) as pretty JSON.
pub fn write_json(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::types::{BatchId, ImageCounts, TargetSize};
    use bildwerk_core::{BildwerkError, LengthUnit};
    use chrono::Utc;

    fn report() -> BatchReport {
        let mut done = ProcessingOutcome::new("a.docx");
        done.begin().unwrap();
        done.output_sha256 = Some("0123456789abcdef0123".into());
        done.complete(
            ImageCounts {
                found: 1,
                processed: 1,
                ..ImageCounts::default()
            },
            "processed 1 images to 3.8×2.14cm.",
            vec![1, 2, 3],
        )
        .unwrap();

        let mut failed = ProcessingOutcome::new("b.doc");
        failed.fail_with(&BildwerkError::UnsupportedLegacyFormat).unwrap();

        let mut aborted = ProcessingOutcome::new("c.docx");
        aborted.fail("worker vanished").unwrap();

        BatchReport {
            id: BatchId::new(),
            target: TargetSize::new(3.8, 2.14, LengthUnit::Cm).unwrap(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes: vec![done, failed, aborted],
        }
    }

    #[test]
    fn summary_lists_each_document() {
        let text = render_summary(&report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ok     a.docx: processed 1 images to 3.8×2.14cm. [sha256 0123456789ab]",
                "error  b.doc: Old-style .doc files can't be processed. Open the file in your word processor, save it as .docx, then try again.",
                "error  c.docx: worker vanished",
                "1 of 3 documents resized to 3.8×2.14cm.",
            ]
        );
    }

    #[test]
    fn json_report_omits_output_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&report(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0]["status"], "completed");
        assert_eq!(outcomes[1]["status"], "error");
        assert_eq!(outcomes[1]["human_error"]["severity"], "action_required");
        assert!(outcomes[2].get("human_error").is_none());
        assert!(outcomes[0].get("output_bytes").is_none());
        assert_eq!(value["target"]["unit"], "cm");
    }
}
