//! Benchmarks for normalization and patching.
//!
//! Run with: cargo bench -p ignite-render --bench diff_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ignite_dom::Document;
use ignite_render::{PatchOptions, Renderable, h, mount, normalize, render};
use std::hint::black_box;

fn table(rows: usize, tick: usize) -> Renderable {
    h("table")
        .children((0..rows).map(|row| {
            Renderable::from(
                h("tr")
                    .prop("class", if row % 2 == 0 { "even" } else { "odd" })
                    .child(h("td").child(row))
                    .child(h("td").child(format!("value {}", row + tick))),
            )
        }))
        .into()
}

// =============================================================================
// Normalization
// =============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for rows in [10, 100, 1000] {
        let view = table(rows, 0);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &view, |b, view| {
            b.iter(|| black_box(normalize(black_box(view), None)));
        });
    }
    group.finish();
}

// =============================================================================
// Patching (the steady-state hot path)
// =============================================================================

fn bench_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch");
    for rows in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("unchanged", rows), &rows, |b, &rows| {
            let doc = Document::new();
            let host = doc.create_element("div");
            let view = table(rows, 0);
            let previous = mount(&host, &view);
            let options = PatchOptions::default();
            b.iter(|| black_box(render(&host, &view, Some(previous.as_slice()), &options)));
        });

        group.bench_with_input(BenchmarkId::new("text_changes", rows), &rows, |b, &rows| {
            let doc = Document::new();
            let host = doc.create_element("div");
            let mut previous = mount(&host, &table(rows, 0));
            let options = PatchOptions::default();
            let mut tick = 0;
            b.iter(|| {
                tick += 1;
                previous = render(&host, &table(rows, tick), Some(previous.as_slice()), &options);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_patch);
criterion_main!(benches);
