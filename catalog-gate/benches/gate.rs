//! Overhead of the gate on the hit path and under key contention.
//!
//! Run with:
//!   cargo bench -p catalog-gate --bench gate

use std::sync::Arc;
use std::time::Duration;

use catalog_gate::{Gate, GatePolicy, producer_fn};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};

type Filters = serde_json::Map<String, Value>;

fn filters(page: u64) -> Filters {
    match json!({"genre": "drama", "sorter": "popularity", "page": page}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn gate_benchmarks(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let gate = Arc::new(Gate::new(
        producer_fn(|filters: Filters| async move {
            Ok::<_, std::io::Error>(json!({"results": [filters], "hasMore": false}))
        }),
        GatePolicy::new(Duration::from_secs(3600)),
    ));

    let mut group = c.benchmark_group("gate/hit");
    for keys in [1u64, 100, 10_000] {
        runtime.block_on(async {
            for page in 0..keys {
                gate.call(filters(page)).await.unwrap();
            }
        });
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("json_key", keys), &keys, |b, &keys| {
            let mut counter = 0u64;
            b.to_async(&runtime).iter(|| {
                let page = counter % keys;
                counter = counter.wrapping_add(1);
                let gate = gate.clone();
                async move { gate.call(filters(page)).await.unwrap() }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("gate/contended");
    for tasks in [8usize, 64] {
        group.throughput(Throughput::Elements(tasks as u64));
        group.bench_with_input(BenchmarkId::new("same_key", tasks), &tasks, |b, &tasks| {
            b.to_async(&runtime).iter(|| {
                let gate = gate.clone();
                async move {
                    let handles: Vec<_> = (0..tasks)
                        .map(|_| {
                            let gate = gate.clone();
                            tokio::spawn(async move { gate.call(filters(0)).await })
                        })
                        .collect();
                    for handle in handles {
                        handle.await.unwrap().unwrap();
                    }
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, gate_benchmarks);
criterion_main!(benches);
