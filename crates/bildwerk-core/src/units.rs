// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Length units and conversion to pixels (96 DPI) and to EMUs, the native
// length unit of Office Open XML drawing markup.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// EMUs per pixel at 96 DPI (914400 EMU per inch / 96).
pub const EMU_PER_PIXEL: u64 = 9525;

/// Largest accepted target width or height in pixels.
pub const MAX_TARGET_DIMENSION: u32 = 4096;
/// Largest accepted target area in pixels (4096 x 4096).
pub const MAX_TARGET_PIXELS: u64 = 16_777_216;

/// Pixels per centimetre at 96 DPI, as used by the resize tool.
const PX_PER_CM: f64 = 37.8;
/// Pixels per millimetre at 96 DPI.
const PX_PER_MM: f64 = 3.78;
/// Pixels per inch.
const PX_PER_IN: f64 = 96.0;

/// Unit in which the user expresses the target image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Cm,
    Mm,
    In,
    Px,
}

impl LengthUnit {
    /// Short label used in messages and output file names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
            Self::Px => "px",
        }
    }

    /// Parse a unit label (case-insensitive). Returns `None` for anything
    /// that is not one of `cm`, `mm`, `in`, `px`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            "in" => Some(Self::In),
            "px" => Some(Self::Px),
            _ => None,
        }
    }

    /// Parse a unit label, treating unknown labels as centimetres.
    pub fn from_label_lenient(label: &str) -> Self {
        Self::parse(label).unwrap_or_else(|| {
            warn!(label, "unknown length unit, falling back to cm");
            Self::Cm
        })
    }

    fn pixels_per_unit(&self) -> f64 {
        match self {
            Self::Cm => PX_PER_CM,
            Self::Mm => PX_PER_MM,
            Self::In => PX_PER_IN,
            Self::Px => 1.0,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a length to whole pixels at 96 DPI.
///
/// Rounds half away from zero, once. Callers must reject NaN before calling;
/// negative results saturate to zero.
pub fn to_pixels(value: f64, unit: LengthUnit) -> u32 {
    let px = (value * unit.pixels_per_unit()).round();
    if px <= 0.0 {
        0
    } else if px >= u32::MAX as f64 {
        u32::MAX
    } else {
        px as u32
    }
}

/// Like [`to_pixels`] but takes a free-form unit label; unknown labels use
/// the centimetre formula.
pub fn to_pixels_for_label(value: f64, label: &str) -> u32 {
    to_pixels(value, LengthUnit::from_label_lenient(label))
}

/// Whether a `width` x `height` raster stays within the target size caps.
pub fn within_pixel_limits(width: u32, height: u32) -> bool {
    width <= MAX_TARGET_DIMENSION
        && height <= MAX_TARGET_DIMENSION
        && u64::from(width) * u64::from(height) <= MAX_TARGET_PIXELS
}

/// Convert pixels to EMUs.
pub fn pixels_to_emu(px: u32) -> u64 {
    u64::from(px) * EMU_PER_PIXEL
}
