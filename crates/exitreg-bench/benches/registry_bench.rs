//! Registry benchmarks: registration and drain throughput.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use exitreg_core::{Args, ExitRegistry, Handler, HandlerFailure, MemorySink, args};

fn noop() -> Handler {
    Arc::new(|args: &Args| {
        black_box(args);
        Ok(())
    })
}

fn bench_register(c: &mut Criterion) {
    let counts: &[usize] = &[16, 256, 4096];
    let mut group = c.benchmark_group("register");

    for &count in counts {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("no_args", count), &count, |b, &n| {
            let handler = noop();
            b.iter(|| {
                let registry = ExitRegistry::with_sink(MemorySink::new());
                for _ in 0..n {
                    registry.register(Arc::clone(&handler), Args::none());
                }
                black_box(registry.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("bound_args", count), &count, |b, &n| {
            let handler = noop();
            b.iter(|| {
                let registry = ExitRegistry::with_sink(MemorySink::new());
                for i in 0..n {
                    registry.register(Arc::clone(&handler), args![i, "x"; kw = true]);
                }
                black_box(registry.len());
            });
        });
    }
    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let counts: &[usize] = &[16, 256, 4096];
    let mut group = c.benchmark_group("run_pending");

    for &count in counts {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("all_ok", count), &count, |b, &n| {
            let handler = noop();
            b.iter(|| {
                let registry = ExitRegistry::with_sink(MemorySink::new());
                for _ in 0..n {
                    registry.register(Arc::clone(&handler), Args::none());
                }
                black_box(registry.run_pending().is_ok());
            });
        });
        // Termination requests: capture and overwrite only, nothing is reported.
        group.bench_with_input(BenchmarkId::new("all_exit", count), &count, |b, &n| {
            let handler: Handler = Arc::new(|_: &Args| Err(HandlerFailure::exit(1)));
            b.iter(|| {
                let registry = ExitRegistry::with_sink(MemorySink::new());
                for _ in 0..n {
                    registry.register(Arc::clone(&handler), Args::none());
                }
                black_box(registry.run_pending().is_err());
            });
        });
        // Handler errors: each one captures a backtrace and renders a diagnostic.
        group.bench_with_input(BenchmarkId::new("all_error", count), &count, |b, &n| {
            let handler: Handler =
                Arc::new(|_: &Args| Err(HandlerFailure::error("BenchError", "expected")));
            b.iter(|| {
                let sink = MemorySink::new();
                let registry = ExitRegistry::with_sink(sink.clone());
                for _ in 0..n {
                    registry.register(Arc::clone(&handler), Args::none());
                }
                black_box(registry.run_pending().is_err());
                black_box(sink.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_register, bench_drain);
criterion_main!(benches);
