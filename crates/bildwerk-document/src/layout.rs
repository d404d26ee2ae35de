// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout rewriter — sets the on-page size of every drawing in a
// WordprocessingML part.
//
// The markup is treated as text. Only the `cx`/`cy` pairs of three lexical
// shapes are touched:
//
//   <wp:extent cx=".." cy=".."        outer extent (inline and anchored)
//   <a:ext cx=".." cy=".."            shape transform extent
//   <wp:inline ...><wp:extent ...     first extent directly inside an inline
//
// Each shape requires whitespace, then `cx="digits"`, whitespace, then
// `cy="digits"`, so `<a:extLst>`, `<a:ext uri=..>`, `<wp:effectExtent ..>`
// and every other numeric attribute are left alone. A matched pair is
// normalised to a single space between attributes, which makes the rewrite
// idempotent.

use std::fmt::Write as _;

use tracing::debug;

/// Main document body part.
pub const BODY_PART: &str = "word/document.xml";

/// Every part whose drawings are resized, body first. Missing header and
/// footer parts are skipped by the caller.
pub const LAYOUT_PARTS: [&str; 9] = [
    BODY_PART,
    "word/header1.xml",
    "word/header2.xml",
    "word/header3.xml",
    "word/header4.xml",
    "word/footer1.xml",
    "word/footer2.xml",
    "word/footer3.xml",
    "word/footer4.xml",
];

const EXTENT_TAG: &str = "<wp:extent";
const SHAPE_EXT_TAG: &str = "<a:ext";
const INLINE_TAG: &str = "<wp:inline";

/// Rewritten markup plus the number of extent declarations set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRewrite {
    pub markup: String,
    /// `wp:extent` and `a:ext` declarations rewritten.
    pub rewritten: usize,
}

impl LayoutRewrite {
    pub fn changed_from(&self, original: &str) -> bool {
        self.markup != original
    }
}

/// Set every image extent in `markup` to `cx` x `cy` EMUs.
pub fn rewrite_layout(markup: &str, cx: u64, cy: u64) -> LayoutRewrite {
    let (text, outer) = rewrite_tag(markup, EXTENT_TAG, cx, cy);
    let (text, shape) = rewrite_tag(&text, SHAPE_EXT_TAG, cx, cy);
    let (text, inline) = rewrite_inline(&text, cx, cy);
    debug!(outer, shape, inline, "Extents rewritten");
    LayoutRewrite {
        markup: text,
        rewritten: outer + shape,
    }
}

/// Replace the size pair of every `tag` occurrence followed by a valid pair.
fn rewrite_tag(text: &str, tag: &str, cx: u64, cy: u64) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut count = 0;

    while let Some(pos) = rest.find(tag) {
        let after_tag = pos + tag.len();
        out.push_str(&rest[..after_tag]);
        rest = &rest[after_tag..];
        if let Some(len) = match_size_pair(rest) {
            push_size_pair(&mut out, cx, cy);
            rest = &rest[len..];
            count += 1;
        }
    }
    out.push_str(rest);
    (out, count)
}

/// Replace the size pair of an extent that immediately follows the end of a
/// `<wp:inline ...>` opening tag.
fn rewrite_inline(text: &str, cx: u64, cy: u64) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut count = 0;

    while let Some(pos) = rest.find(INLINE_TAG) {
        let after_tag = pos + INLINE_TAG.len();
        let Some(close) = rest[after_tag..].find('>') else {
            break;
        };
        let body_start = after_tag + close + 1;
        let tail = &rest[body_start..];

        let pair = tail
            .strip_prefix(EXTENT_TAG)
            .and_then(match_size_pair);
        match pair {
            Some(len) => {
                let extent_end = body_start + EXTENT_TAG.len();
                out.push_str(&rest[..extent_end]);
                push_size_pair(&mut out, cx, cy);
                rest = &rest[extent_end + len..];
                count += 1;
            }
            None => {
                out.push_str(&rest[..after_tag]);
                rest = &rest[after_tag..];
            }
        }
    }
    out.push_str(rest);
    (out, count)
}

fn push_size_pair(out: &mut String, cx: u64, cy: u64) {
    let _ = write!(out, r#" cx="{cx}" cy="{cy}""#);
}

/// Length of a leading `\s+cx="\d+"\s+cy="\d+"` in `s`, if present.
fn match_size_pair(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = skip_whitespace(bytes, 0)?;
    i = quoted_digits(bytes, i, b"cx=\"")?;
    i = skip_whitespace(bytes, i)?;
    i = quoted_digits(bytes, i, b"cy=\"")?;
    Some(i)
}

/// Skip one or more ASCII whitespace bytes starting at `i`.
fn skip_whitespace(bytes: &[u8], i: usize) -> Option<usize> {
    let end = i + bytes[i..].iter().take_while(|b| b.is_ascii_whitespace()).count();
    (end > i).then_some(end)
}

/// Match `prefix`, one or more ASCII digits, and a closing quote.
fn quoted_digits(bytes: &[u8], i: usize, prefix: &[u8]) -> Option<usize> {
    let start = i + prefix.len();
    if !bytes[i..].starts_with(prefix) {
        return None;
    }
    let end = start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if end == start || bytes.get(end) != Some(&b'"') {
        return None;
    }
    Some(end + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CX: u64 = 1_371_600;
    const CY: u64 = 771_525;

    const INLINE_DRAWING: &str = r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="5274310" cy="2966720"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="1" name="Picture 1"/><a:graphic><a:graphicData><pic:pic><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="5274310" cy="2966720"/></a:xfrm><a:extLst><a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/></a:extLst></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#;

    const ANCHOR_DRAWING: &str = "<wp:anchor distT=\"0\" simplePos=\"0\"><wp:simplePos x=\"0\" y=\"0\"/><wp:positionH relativeFrom=\"column\"><wp:posOffset>1905</wp:posOffset></wp:positionH><wp:extent\n    cx=\"1000\"\tcy=\"2000\"/><a:xfrm><a:ext  cx=\"1000\" cy=\"2000\"/></a:xfrm></wp:anchor>";

    #[test]
    fn rewrites_inline_drawing() {
        let result = rewrite_layout(INLINE_DRAWING, CX, CY);
        assert_eq!(result.rewritten, 2);
        assert!(result.markup.contains(r#"<wp:extent cx="1371600" cy="771525"/>"#));
        assert!(result.markup.contains(r#"<a:ext cx="1371600" cy="771525"/>"#));
        assert!(!result.markup.contains("5274310"));
    }

    #[test]
    fn leaves_unrelated_attributes_alone() {
        let result = rewrite_layout(INLINE_DRAWING, CX, CY);
        assert!(result.markup.contains(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#));
        assert!(result.markup.contains(r#"<a:off x="0" y="0"/>"#));
        assert!(result.markup.contains(r#"<a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/>"#));
        assert!(result.markup.contains(r#"distT="0" distB="0""#));
    }

    #[test]
    fn rewrites_anchored_drawing_with_odd_whitespace() {
        let result = rewrite_layout(ANCHOR_DRAWING, CX, CY);
        assert_eq!(result.rewritten, 2);
        assert!(result.markup.contains(r#"<wp:extent cx="1371600" cy="771525"/>"#));
        assert!(result.markup.contains(r#"<a:ext cx="1371600" cy="771525"/>"#));
        assert!(result.markup.contains("<wp:posOffset>1905</wp:posOffset>"));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let doc = format!("<w:body>{INLINE_DRAWING}<w:p/>{ANCHOR_DRAWING}</w:body>");
        let once = rewrite_layout(&doc, CX, CY);
        let twice = rewrite_layout(&once.markup, CX, CY);
        assert_eq!(once.markup, twice.markup);
        assert!(!twice.changed_from(&once.markup));
    }

    #[test]
    fn every_occurrence_is_rewritten() {
        let doc = INLINE_DRAWING.repeat(3);
        let result = rewrite_layout(&doc, CX, CY);
        assert_eq!(result.rewritten, 6);
        assert_eq!(result.markup.matches(r#"cx="1371600" cy="771525""#).count(), 6);
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let markup = r#"<wp:extent cy="1" cx="2"/><wp:extent cx="" cy="3"/><wp:extentcx="4" cy="5"/><a:ext cx="6"/>"#;
        let result = rewrite_layout(markup, CX, CY);
        assert_eq!(result.rewritten, 0);
        assert_eq!(result.markup, markup);
    }

    #[test]
    fn inline_pass_handles_extent_without_outer_match() {
        let (text, count) = rewrite_inline(r#"<wp:inline><wp:extent cx="9" cy="8"/></wp:inline>"#, 1, 2);
        assert_eq!(count, 1);
        assert_eq!(text, r#"<wp:inline><wp:extent cx="1" cy="2"/></wp:inline>"#);
    }

    #[test]
    fn markup_without_drawings_is_untouched() {
        let markup = "<w:document><w:body><w:p><w:r><w:t>héllo — 世界</w:t></w:r></w:p></w:body></w:document>";
        let result = rewrite_layout(markup, CX, CY);
        assert_eq!(result.markup, markup);
        assert_eq!(result.rewritten, 0);
    }

    #[test]
    fn unterminated_inline_tag_is_left_alone() {
        let markup = r#"<wp:inline distT="0""#;
        assert_eq!(rewrite_layout(markup, CX, CY).markup, markup);
    }
}
