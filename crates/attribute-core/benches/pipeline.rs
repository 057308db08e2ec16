//! Benchmarks for the attribute image pipeline.
//!
//! Run with: cargo bench -p attribute-core

use attribute_core::config::LimitsConfig;
use attribute_core::pipeline::{bounded_dimensions, ImageDecoder, MetadataExtractor, ThumbhashGenerator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode benchmark png");
    bytes
}

fn benchmark_bounded_dimensions(c: &mut Criterion) {
    c.bench_function("bounded_dimensions", |b| {
        b.iter(|| bounded_dimensions(black_box(1920), black_box(1080), black_box(100)))
    });
}

fn benchmark_metadata(c: &mut Criterion) {
    let bytes = png_bytes(1920, 1080);

    c.bench_function("metadata_extract", |b| {
        b.iter(|| {
            let _ = MetadataExtractor::extract(black_box(&bytes), "/bench.png");
        })
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let bytes: Arc<[u8]> = png_bytes(1920, 1080).into();
    let decoder = ImageDecoder::new(LimitsConfig::default());
    let rt = tokio::runtime::Runtime::new().expect("benchmark runtime");

    c.bench_function("decode_image", |b| {
        b.iter(|| {
            let _ = rt.block_on(decoder.decode_from_bytes(black_box(bytes.clone()), "/bench.png"));
        })
    });
}

fn benchmark_thumbhash(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);
    let generator = ThumbhashGenerator::default();

    c.bench_function("thumbhash_100px", |b| {
        b.iter(|| {
            let _ = generator.generate(black_box(&img), "/bench.png");
        })
    });
}

criterion_group!(
    benches,
    benchmark_bounded_dimensions,
    benchmark_metadata,
    benchmark_decode,
    benchmark_thumbhash,
);
criterion_main!(benches);
