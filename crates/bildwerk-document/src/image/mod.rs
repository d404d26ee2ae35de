// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — exact-size resampling and the output format policy.

pub mod processor;
pub mod transcoder;

pub use processor::ImageProcessor;
pub use transcoder::{ImageCodec, OutputFormat, RasterCodec, Transcoder};
