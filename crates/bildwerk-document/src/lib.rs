// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image resizing inside WordprocessingML packages.
//
// Provides the in-memory package model, the media scanner, exact-size image
// transcoding, the drawing-extent rewriter, and the per-document transformer
// that sequences them.

pub mod archive;
pub mod image;
pub mod integrity;
pub mod layout;
pub mod scan;
pub mod transform;

// Re-export the primary structs so callers can use `bildwerk_document::DocumentTransformer` etc.
pub use archive::DocumentArchive;
pub use crate::image::{ImageCodec, ImageProcessor, OutputFormat, RasterCodec, Transcoder};
pub use layout::{LAYOUT_PARTS, LayoutRewrite, rewrite_layout};
pub use scan::scan_media;
pub use transform::DocumentTransformer;
