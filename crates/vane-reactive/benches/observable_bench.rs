//! Benchmarks for observable writes and selector forwarding.
//!
//! The interesting costs are the equality gate on the write path and the
//! per-subscriber delivery loop; suppression should be close to free.
//!
//! Run with: cargo bench -p vane-reactive --bench observable_bench

use criterion::{Criterion, criterion_group, criterion_main};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use vane_reactive::Observable;

// =============================================================================
// Write path
// =============================================================================

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("observable/set");

    group.bench_function("changed_no_subscribers", |b| {
        let cell = Observable::new(0u64);
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            cell.set(black_box(n));
        })
    });

    group.bench_function("suppressed_equal_write", |b| {
        let cell = Observable::new(42u64);
        b.iter(|| cell.set(black_box(42)))
    });

    group.bench_function("get", |b| {
        let cell = Observable::new(42u64);
        b.iter(|| black_box(cell.get()))
    });

    group.finish();
}

// =============================================================================
// Delivery loop
// =============================================================================

fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("observable/notify");

    for subscribers in [1usize, 4, 16] {
        group.bench_function(format!("fanout_{subscribers}"), |b| {
            let cell = Observable::new(0u64);
            let sink = Rc::new(Cell::new(0u64));
            let _subs: Vec<_> = (0..subscribers)
                .map(|_| {
                    let sink = Rc::clone(&sink);
                    cell.subscribe(move |v| sink.set(sink.get().wrapping_add(*v)))
                })
                .collect();
            let mut n = 0u64;
            b.iter(|| {
                n = n.wrapping_add(1);
                cell.set(black_box(n));
            })
        });
    }

    group.finish();
}

// =============================================================================
// Selector forwarding
// =============================================================================

fn bench_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector");

    group.bench_function("forwarded_change", |b| {
        let cell = Observable::new((0u64, 0u64));
        let first = cell.select(|&(a, _)| a);
        let sink = Rc::new(Cell::new(0u64));
        let sink_clone = Rc::clone(&sink);
        let _sub = first.subscribe(move |v| sink_clone.set(sink_clone.get().wrapping_add(*v)));
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            cell.set(black_box((n, 0)));
        })
    });

    group.bench_function("suppressed_projection", |b| {
        let cell = Observable::new((0u64, 0u64));
        let first = cell.select(|&(a, _)| a);
        let sink = Rc::new(Cell::new(0u64));
        let sink_clone = Rc::clone(&sink);
        let _sub = first.subscribe(move |v| sink_clone.set(sink_clone.get().wrapping_add(*v)));
        let mut n = 0u64;
        b.iter(|| {
            // Only the ignored field moves: the write is accepted upstream
            // and dropped at the selector.
            n = n.wrapping_add(1);
            cell.set(black_box((0, n)));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_notify, bench_selector);
criterion_main!(benches);
