//! Pagination and Search Benchmarks
//!
//! Run with: `cargo bench --bench pagination`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use covert_reader::pagination::{page_content, total_pages};
use covert_reader::search::build_occurrences;

/// Mixed ASCII and CJK text of roughly `chars` characters
fn sample_text(chars: usize) -> String {
    "The quick brown fox 跳过了懒狗. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

fn bench_pagination(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagination");
    group.measurement_time(Duration::from_secs(5));

    for size in [10_000usize, 1_000_000] {
        let text = sample_text(size);

        group.bench_with_input(BenchmarkId::new("total_pages", size), &text, |b, text| {
            b.iter(|| total_pages(black_box(text), 30))
        });

        let last = size.div_ceil(30);
        group.bench_with_input(BenchmarkId::new("last_page", size), &text, |b, text| {
            b.iter(|| page_content(black_box(text), last, 30).len())
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.measurement_time(Duration::from_secs(5));

    let text = sample_text(1_000_000);
    group.bench_function("occurrences_1m", |b| {
        b.iter(|| build_occurrences(black_box(&text), "懒狗").map(|o| o.len()))
    });

    group.finish();
}

criterion_group!(benches, bench_pagination, bench_search);
criterion_main!(benches);
