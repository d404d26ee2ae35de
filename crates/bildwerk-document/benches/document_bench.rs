// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the bildwerk-document crate: the extent rewriter
// on a large body part, and one exact-size resample of a photo-sized image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use bildwerk_document::image::OutputFormat;
use bildwerk_document::{ImageCodec, ImageProcessor, RasterCodec, rewrite_layout};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Rewrite a body with 500 inline drawings separated by ordinary paragraphs.
fn bench_layout_rewrite(c: &mut Criterion) {
    let drawing = r#"<w:p><w:r><w:t>Inspection photo</w:t></w:r></w:p><w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="5274310" cy="2966720"/><wp:effectExtent l="0" t="0" r="0" b="0"/><a:graphic><a:graphicData><pic:pic><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="5274310" cy="2966720"/></a:xfrm><a:extLst><a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/></a:extLst></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;
    let body = format!("<w:document><w:body>{}</w:body></w:document>", drawing.repeat(500));

    c.bench_function("layout_rewrite (500 drawings)", |b| {
        b.iter(|| {
            let result = rewrite_layout(black_box(&body), 1_371_600, 771_525);
            black_box(result.rewritten);
        });
    });
}

/// Stretch a 640x480 JPEG to the default 144x81 target.
fn bench_resample(c: &mut Criterion) {
    let img = RgbImage::from_fn(640, 480, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let jpeg = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
        .to_jpeg_bytes(90)
        .expect("encode fixture");

    c.bench_function("resample jpeg 640x480 -> 144x81", |b| {
        b.iter(|| {
            let out = ImageCodec
                .resample(black_box(&jpeg), 144, 81, OutputFormat::Jpeg { quality: 95 })
                .expect("resample");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_layout_rewrite, bench_resample);
criterion_main!(benches);
