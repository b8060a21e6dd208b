//! Benchmark for callback futures: construction, map chains and sequence.
//!
//! Synchronous starters (`Future::new` resolving inline) measure the callback
//! machinery alone; deferred starters (`Future::successful`) add one runtime
//! spawn per start. Async benchmarks use `to_async(&runtime)` so the runtime is
//! shared across iterations.

use cbfuture::Future;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

fn immediate(value: i64) -> Future<i64> {
    Future::new(move |resolver| resolver.succeed(value))
}

fn run_inline(future: &Future<i64>) -> i64 {
    let slot = Arc::new(AtomicI64::new(0));
    let sink = Arc::clone(&slot);
    let mut observed = future.clone();
    observed
        .on_success(move |value| sink.store(*value, Ordering::Relaxed))
        .end();
    slot.load(Ordering::Relaxed)
}

// =============================================================================
// Inline Benchmarks
// =============================================================================

fn benchmark_inline_start(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("future_inline_start");

    group.bench_function("new_end", |bencher| {
        bencher.iter(|| black_box(run_inline(&immediate(black_box(42)))));
    });

    group.bench_function("restart", |bencher| {
        let future = immediate(42);
        bencher.iter(|| black_box(run_inline(&future)));
    });

    group.finish();
}

fn benchmark_inline_map_chain(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("future_inline_map_chain");

    for depth in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::new("map", depth), &depth, |bencher, &depth| {
            let future = (0..depth).fold(immediate(0), |future, _| future.map(|x| x + 1));
            bencher.iter(|| black_box(run_inline(&future)));
        });

        group.bench_with_input(
            BenchmarkId::new("flat_map", depth),
            &depth,
            |bencher, &depth| {
                let future =
                    (0..depth).fold(immediate(0), |future, _| future.flat_map(|x| immediate(x + 1)));
                bencher.iter(|| black_box(run_inline(&future)));
            },
        );
    }

    group.finish();
}

fn benchmark_inline_sequence(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("future_inline_sequence");

    for size in [1_i64, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("vec", size), &size, |bencher, &size| {
            let future = Future::sequence((0..size).map(immediate).collect::<Vec<_>>())
                .map(|values| values.iter().sum::<i64>());
            bencher.iter(|| black_box(run_inline(&future)));
        });
    }

    group.bench_function("tuple_4", |bencher| {
        let future = Future::sequence((immediate(1), immediate(2), immediate(3), immediate(4)))
            .map(|(a, b, c, d)| a + b + c + d);
        bencher.iter(|| black_box(run_inline(&future)));
    });

    group.finish();
}

// =============================================================================
// Deferred Benchmarks
// =============================================================================

fn benchmark_deferred(criterion: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let mut group = criterion.benchmark_group("future_deferred");

    group.bench_function("successful_await", |bencher| {
        bencher
            .to_async(&runtime)
            .iter(|| async { black_box(Future::successful(black_box(42)).await) });
    });

    group.bench_function("map_5_await", |bencher| {
        let future = Future::successful(1_i64)
            .map(|x| x + 1)
            .map(|x| x * 2)
            .map(|x| x + 3)
            .map(|x| x * 4)
            .map(|x| x + 5);
        bencher
            .to_async(&runtime)
            .iter(|| async { black_box(future.run_async().await) });
    });

    for size in [10_i64, 100] {
        group.bench_with_input(
            BenchmarkId::new("sequence_await", size),
            &size,
            |bencher, &size| {
                let future =
                    Future::sequence((0..size).map(Future::successful).collect::<Vec<_>>());
                bencher
                    .to_async(&runtime)
                    .iter(|| async { black_box(future.run_async().await) });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_inline_start,
    benchmark_inline_map_chain,
    benchmark_inline_sequence,
    benchmark_deferred
);
criterion_main!(benches);
