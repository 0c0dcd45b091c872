// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanwerk-document crate: quality assessment and
// the auto enhancement path on synthetic pages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use scanwerk_core::{EnhancementMethod, EnhancementParams};
use scanwerk_document::{ImageEnhancer, assess};

/// 200x100 page of dark "text" bars on a light background.
fn synthetic_page() -> DynamicImage {
    let img = GrayImage::from_fn(200, 100, |x, y| {
        let ink = (y % 12) < 4 && (x % 9) < 6;
        Luma([if ink { 40u8 } else { 215u8 }])
    });
    DynamicImage::ImageLuma8(img)
}

fn bench_quality_assessment(c: &mut Criterion) {
    let page = synthetic_page();
    c.bench_function("assess (200x100)", |b| {
        b.iter(|| black_box(assess(black_box(&page))));
    });
}

/// Auto enhancement on a washed-out copy of the page, which lands on the
/// denoise + contrast path.
fn bench_auto_enhancement(c: &mut Criterion) {
    let mut faded = synthetic_page().to_luma8();
    for pixel in faded.pixels_mut() {
        pixel.0[0] = 150 + pixel.0[0] / 4;
    }
    let faded = DynamicImage::ImageLuma8(faded);
    let enhancer = ImageEnhancer::new(EnhancementParams {
        template_size: 5,
        search_size: 11,
        ..Default::default()
    });

    c.bench_function("enhance auto (200x100)", |b| {
        b.iter(|| black_box(enhancer.enhance(black_box(&faded), EnhancementMethod::Auto)));
    });
}

criterion_group!(benches, bench_quality_assessment, bench_auto_enhancement);
criterion_main!(benches);
