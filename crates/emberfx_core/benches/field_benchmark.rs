//! Benchmark for the per-frame ember update and software rasterization.
//!
//! TARGET: a 90-particle frame well under 1 ms, leaving the 16.6 ms budget
//! to the page.
//!
//! Run with: cargo bench --package emberfx_core --bench field_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emberfx_core::{EmberConfig, EmberField, EmberRenderer, FrameCommands, HostMetrics, Pixmap};

fn config(count: usize) -> EmberConfig {
    EmberConfig {
        count,
        seed: Some(42),
        ..EmberConfig::default()
    }
}

fn benchmark_field_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_update");

    for count in [90usize, 1_000, 10_000] {
        let mut field = EmberField::new(config(count), false).unwrap();
        field.initialize(&HostMetrics::new(1280.0, 720.0, 1.0, 1280.0));
        let mut frame = FrameCommands::with_capacity(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                field.update(&mut frame);
                black_box(frame.len())
            });
        });
    }

    group.finish();
}

fn benchmark_pixmap_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixmap_frame");
    group.sample_size(20);

    for dpr in [1.0f32, 2.0] {
        let mut renderer = EmberRenderer::new(config(90), false, Pixmap::new()).unwrap();
        renderer
            .initialize(&HostMetrics::new(1280.0, 720.0, dpr, 1280.0))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("dpr", dpr), &dpr, |b, _| {
            b.iter(|| {
                renderer.update();
                black_box(renderer.surface().texels().len())
            });
        });
    }

    group.finish();
}

fn benchmark_rebuild(c: &mut Criterion) {
    let mut field = EmberField::new(config(90), false).unwrap();
    let wide = HostMetrics::new(1280.0, 720.0, 2.0, 1280.0);

    c.bench_function("pool_rebuild_90", |b| {
        b.iter(|| black_box(field.resize(black_box(&wide))));
    });
}

criterion_group!(
    benches,
    benchmark_field_update,
    benchmark_pixmap_frame,
    benchmark_rebuild
);
criterion_main!(benches);
