// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — Core types, units, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;
pub mod units;

pub use config::ResizeConfig;
pub use error::{BildwerkError, ValidationError};
pub use types::*;
pub use units::LengthUnit;
