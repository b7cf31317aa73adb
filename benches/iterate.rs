use std::hint::black_box;

use criterion::*;

mod common;
use common::*;

use archon_ecs::prelude::*;

fn iterate_benchmark(c: &mut Criterion) {
    let (mut world, components) = world_with_components(2);
    populate(&mut world, &components, AGENTS);

    let filter = query_all(&components);
    let plan = filter.cache(&mut world);

    let mut group = c.benchmark_group("iterate");

    group.bench_function("adhoc_run_10k", |b| {
        b.iter(|| {
            let mut total = 0u64;
            filter.run(&world, |_, columns| {
                for value in columns[0].unwrap().as_slice::<u64>().unwrap() {
                    total += *value;
                }
            });
            black_box(total);
        });
    });

    group.bench_function("cached_run_10k", |b| {
        b.iter(|| {
            let mut total = 0u64;
            plan.run(&world, |_, columns| {
                for value in columns[0].unwrap().as_slice::<u64>().unwrap() {
                    total += *value;
                }
            });
            black_box(total);
        });
    });

    group.bench_function("row_iter_10k", |b| {
        b.iter(|| {
            let total: u64 = filter
                .iter(&world)
                .map(|row| *row.get::<u64>(0).unwrap())
                .sum();
            black_box(total);
        });
    });

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
