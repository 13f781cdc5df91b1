//! Benchmarks для сборки индекса и k-NN запросов.
//!
//! Запуск: `cargo bench -p proxima-benchmark`

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxima::{
    GeoPoint, Haversine, IndexBuilder, IndexConfig, IndexedPoint, MatchEngine, PointSet,
    QueryRequest,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Случайные точки в пределах города (порядка 0.3° по каждой оси).
fn generate_points(
    count: usize,
    seed: u64,
) -> PointSet {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            IndexedPoint::new(
                i as i64,
                GeoPoint::from_lon_lat(rng.gen_range(8.40..8.70), rng.gen_range(47.30..47.45)),
            )
        })
        .collect()
}

fn generate_queries(
    count: usize,
    seed: u64,
) -> Vec<GeoPoint> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| GeoPoint::from_lon_lat(rng.gen_range(8.40..8.70), rng.gen_range(47.30..47.45)))
        .collect()
}

/// Benchmark: bulk load при разной вместимости листа.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [1_000, 10_000, 100_000] {
        let points = generate_points(size, 42);
        group.throughput(Throughput::Elements(size as u64));

        for leaf_capacity in [4, 16, 64] {
            let builder =
                IndexBuilder::new(IndexConfig::default().with_leaf_capacity(leaf_capacity));
            group.bench_with_input(
                BenchmarkId::new(format!("leaf_{leaf_capacity}"), size),
                &points,
                |b, points| b.iter(|| black_box(builder.build(points.clone()).unwrap())),
            );
        }
    }

    group.finish();
}

/// Benchmark: k-NN для обеих метрик и разных k.
fn bench_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn");
    let points = generate_points(100_000, 7);
    let queries = generate_queries(1_000, 8);

    let euclidean = IndexBuilder::default().build(points.clone()).unwrap();
    let haversine =
        IndexBuilder::new(IndexConfig::default().with_metric(Arc::new(Haversine::default())))
            .build(points)
            .unwrap();

    group.throughput(Throughput::Elements(queries.len() as u64));
    for k in [1, 10, 100] {
        for (name, index) in [("euclidean", &euclidean), ("haversine", &haversine)] {
            group.bench_with_input(BenchmarkId::new(name, k), &k, |b, &k| {
                b.iter(|| {
                    for &query in &queries {
                        black_box(index.knn(query, k));
                    }
                })
            });
        }
    }

    group.finish();
}

/// Benchmark: запросы через движок и стоимость подмены индекса.
fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let engine =
        MatchEngine::new(IndexBuilder::default().build(generate_points(50_000, 1)).unwrap());
    let requests: Vec<QueryRequest> = generate_queries(1_000, 2)
        .into_iter()
        .enumerate()
        .map(|(i, location)| QueryRequest::new(location, 5, i as i64))
        .collect();

    group.throughput(Throughput::Elements(requests.len() as u64));
    group.bench_function("query", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(engine.query(request).unwrap());
            }
        })
    });
    group.bench_function("query_batch", |b| {
        b.iter(|| black_box(engine.query_batch(&requests)))
    });

    let replacement = Arc::new(IndexBuilder::default().build(generate_points(50_000, 3)).unwrap());
    group.throughput(Throughput::Elements(1));
    group.bench_function("swap_index", |b| {
        b.iter(|| black_box(engine.swap_index(replacement.clone())))
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_knn, bench_engine);
criterion_main!(benches);
