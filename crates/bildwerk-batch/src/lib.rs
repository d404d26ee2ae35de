// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-batch — Batch submission handling.
//
// Validates a submission, runs every document through the transformer with
// bounded concurrency, reports progress, and exports completed outputs.

pub mod driver;
pub mod export;

pub use driver::{BatchDriver, BatchEvent, BatchReport, validate_submission};
pub use export::export_completed;
