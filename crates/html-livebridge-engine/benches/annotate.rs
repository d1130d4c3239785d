use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use html_livebridge_engine::annotate::{SourceMap, annotate_into, strip_tracking_attributes};
use std::hint::black_box;
mod common;

fn bench_annotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");
    group.sample_size(20);

    for size in [10, 100, 1000] {
        let content = common::generate_html_content(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            let mut source_map = SourceMap::new();
            b.iter(|| {
                let html = annotate_into(black_box(content), &mut source_map);
                black_box(html);
            });
        });
    }

    group.finish();
}

fn bench_strip(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_tracking_attributes");
    group.sample_size(20);

    let mut source_map = SourceMap::new();
    let annotated = annotate_into(&common::generate_html_content(100), &mut source_map);
    group.bench_function("100_sections", |b| {
        b.iter(|| black_box(strip_tracking_attributes(black_box(&annotated))));
    });

    group.finish();
}

criterion_group!(benches, bench_annotate, bench_strip);
criterion_main!(benches);
