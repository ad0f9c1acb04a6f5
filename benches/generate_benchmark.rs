//! Benchmarks for slide generation.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slidepack::{add_slide, ImageData, PictureScale, Presentation, SlideContent};

#[path = "../tests/common/mod.rs"]
mod common;

/// Benchmark opening a template and indexing its layouts.
fn bench_open_template(c: &mut Criterion) {
    let data = common::template_bytes(true);

    let mut group = c.benchmark_group("open_template");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("five_layouts", |b| {
        b.iter(|| {
            let _ = Presentation::from_bytes(black_box(data.clone()));
        });
    });
    group.finish();
}

/// Benchmark adding text slides and saving the deck.
fn bench_text_slides(c: &mut Criterion) {
    let data = common::template_bytes(true);
    let content = SlideContent::new()
        .with_title("Quarterly results")
        .with_bodies(["Revenue grew\nCosts fell", "Outlook"]);

    let mut group = c.benchmark_group("text_slides");
    for slide_count in [1, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("slides", slide_count),
            slide_count,
            |b, &count| {
                b.iter(|| {
                    let mut prs = Presentation::from_bytes(data.clone()).unwrap();
                    for _ in 0..count {
                        add_slide(&mut prs, "title_2txt", &content).unwrap();
                    }
                    black_box(prs.to_bytes().unwrap());
                });
            },
        );
    }
    group.finish();
}

/// Benchmark picture insertion with both scale methods.
fn bench_picture_insertion(c: &mut Criterion) {
    let data = common::template_bytes(true);
    let image = ImageData::from_bytes(common::png_bytes(640, 480), "bench.png").unwrap();

    let mut group = c.benchmark_group("picture_insertion");
    for scale in [PictureScale::FillPlaceholder, PictureScale::WithinPlaceholder] {
        group.bench_with_input(BenchmarkId::new("scale", scale), &scale, |b, &scale| {
            b.iter(|| {
                let mut prs = Presentation::from_bytes(data.clone()).unwrap();
                let layout = prs.layout_index("title_2pic_3txt").unwrap();
                let id = prs.add_slide_from_layout(layout).unwrap();
                prs.insert_picture(id, 14, black_box(&image), scale).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_open_template,
    bench_text_slides,
    bench_picture_insertion,
);
criterion_main!(benches);
