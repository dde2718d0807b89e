//! # Engine Benchmarks
//!
//! Performance benchmarks for the sampling pipeline.
//!
//! Run with: `cargo bench -p imgtag-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use imgtag_core::{Engine, ImageRecord, MemoryCatalog, SerialNo, TagEntry, TagQuery, shuffle};
use std::hint::black_box;

/// Catalog with `size` images spread over ten overlapping tags.
fn create_catalog(size: u64) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    for i in 0..size {
        catalog.insert_image(ImageRecord::new(SerialNo(i), format!("img-{i}")));
    }
    for t in 0..10u64 {
        let serials = (0..size).filter(|i| i % (t + 2) == 0).map(SerialNo).collect();
        catalog.insert_tag_entry(TagEntry::new(format!("tag{t}"), serials));
    }
    catalog
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");
    for size in [100usize, 1_000, 10_000] {
        let items: Vec<u64> = (0..size as u64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| shuffle(black_box(items.clone()), black_box(1_700_000_000)));
        });
    }
    group.finish();
}

fn bench_sample_by_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_by_tags");
    let engine = Engine::default();
    for size in [1_000u64, 10_000] {
        let catalog = create_catalog(size);
        let query = TagQuery::new(vec!["tag0".into(), "tag3".into(), "TAG7".into()]).seeded(42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| engine.sample_by_tags(black_box(catalog), black_box(&query)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shuffle, bench_sample_by_tags);
criterion_main!(benches);
