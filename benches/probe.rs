//! Benchmarks for the per-invocation hot spots: reading an image header
//! (hinted and sniffed) and parsing a cursor position reply.

use std::hint::black_box;
use std::io::Cursor;

use cellprobe::cursor::parse_cursor_reply;
use cellprobe::{read_header, ImageKind};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{ImageFormat, RgbImage};

fn encoded(format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::new(1920, 1080)
        .write_to(&mut buf, format)
        .expect("encode benchmark image");
    buf.into_inner()
}

fn bench_headers(c: &mut Criterion) {
    let png = encoded(ImageFormat::Png);
    let jpeg = encoded(ImageFormat::Jpeg);

    let mut group = c.benchmark_group("read_header");
    group.bench_function("png_hinted", |b| {
        b.iter(|| read_header(Cursor::new(black_box(&png)), Some(ImageKind::Png)).unwrap())
    });
    group.bench_function("png_sniffed", |b| {
        b.iter(|| read_header(Cursor::new(black_box(&png)), None).unwrap())
    });
    group.bench_function("jpeg_wrong_hint", |b| {
        b.iter(|| read_header(Cursor::new(black_box(&jpeg)), Some(ImageKind::Png)).unwrap())
    });
    group.finish();
}

fn bench_reply(c: &mut Criterion) {
    c.bench_function("parse_cursor_reply", |b| {
        b.iter(|| parse_cursor_reply(black_box(b"\x1b[39;120R")).unwrap())
    });
}

criterion_group!(benches, bench_headers, bench_reply);
criterion_main!(benches);
