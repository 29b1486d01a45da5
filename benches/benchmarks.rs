use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use snapstore::{create_store, Store, Update};

#[derive(Clone)]
struct State {
    counter: usize,
    items: Arc<Vec<usize>>,
}

fn state_store() -> Store<State> {
    create_store(|_| State {
        counter: 0,
        items: Arc::new(Vec::new()),
    })
}

fn store_creation_benchmark(c: &mut Criterion) {
    c.bench_function("store_creation", |b| {
        b.iter(|| create_store(|_| black_box(42_i32)));
    });
}

fn get_state_benchmark(c: &mut Criterion) {
    let store = state_store();

    c.bench_function("get_state", |b| {
        b.iter(|| {
            black_box(store.get_state());
        });
    });
}

fn noop_transition_benchmark(c: &mut Criterion) {
    let store = state_store();
    for _ in 0..10 {
        store.subscribe(|| {}).forget();
    }

    c.bench_function("noop_transition", |b| {
        b.iter(|| {
            store.set_state(Update::transform(|s: &Arc<State>| Arc::clone(s)));
        });
    });
}

fn set_state_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_state");

    for listener_count in [1, 10, 100].iter() {
        let store = state_store();

        for _ in 0..*listener_count {
            store.subscribe(|| {
                // Empty listener
            })
            .forget();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(listener_count),
            listener_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    let counter = black_box(i);
                    store.update(move |s| State {
                        counter,
                        ..s.clone()
                    });
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

fn consumer_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("consumers");

    for consumer_count in [1, 10, 100].iter() {
        let store = state_store();
        let consumers: Vec<_> = (0..*consumer_count)
            .map(|_| store.use_store(|s| Arc::clone(&s.items)))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("unrelated_change", consumer_count),
            consumer_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    let counter = black_box(i);
                    store.update(move |s| State {
                        counter,
                        ..s.clone()
                    });
                    i += 1;
                });
            },
        );
        drop(consumers);
    }
    group.finish();
}

criterion_group!(
    benches,
    store_creation_benchmark,
    get_state_benchmark,
    noop_transition_benchmark,
    set_state_benchmark,
    consumer_benchmark,
);
criterion_main!(benches);
