//! Benchmarks for cache lookup and insert under the readers-writer lock.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use sinkhole::cache::DnsCache;

fn bench_cache(c: &mut Criterion) {
    let cache = DnsCache::new(Duration::from_secs(300));
    let response = vec![0u8; 128];
    for i in 0..1000 {
        cache.put(&format!("host{i}.example.com."), &response);
    }

    let mut group = c.benchmark_group("cache");

    group.throughput(Throughput::Elements(1));
    group.bench_function(BenchmarkId::new("get", "hit"), |b| {
        b.iter(|| cache.get(black_box("host500.example.com."), black_box(0x1234)))
    });

    group.bench_function(BenchmarkId::new("get", "miss"), |b| {
        b.iter(|| cache.get(black_box("absent.example.com."), black_box(0x1234)))
    });

    group.bench_function(BenchmarkId::new("put", "overwrite"), |b| {
        b.iter(|| cache.put(black_box("host500.example.com."), black_box(&response)))
    });

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    bench_cache(&mut criterion);
    criterion.final_summary();
}
