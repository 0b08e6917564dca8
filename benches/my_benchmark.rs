use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use lsh_forest::{LshForest, StoreConfig};
use rand::Rng;
use tempfile::NamedTempFile;

const D: u32 = 16;
const L: u32 = 4;

fn random_signatures(n: usize, d: u32) -> Vec<Vec<u32>> {
    let mut rng = rand::rng();
    (0..n).map(|_| (0..d).map(|_| rng.random()).collect()).collect()
}

fn bench_batch_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_insert");
    group.sampling_mode(SamplingMode::Flat);

    for &n in &[1_000usize, 10_000, 100_000] {
        let signatures = random_signatures(n, D);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("memory", n), &signatures, |b, sigs| {
            b.iter(|| {
                let mut forest = LshForest::new(D, L, StoreConfig::Memory).unwrap();
                forest.batch_insert(sigs).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.sampling_mode(SamplingMode::Flat);

    let signatures = random_signatures(50_000, D);
    let mut forest = LshForest::new(D, L, StoreConfig::Memory).unwrap();
    forest.batch_insert(&signatures).unwrap();
    forest.rebuild_index();

    group.throughput(Throughput::Elements(1));
    group.bench_function("query_k10", |b| {
        b.iter(|| forest.query(&signatures[0], 10).unwrap());
    });
    group.finish();
}

fn bench_memory_vs_file_backed(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature_store");
    group.sampling_mode(SamplingMode::Flat);

    let signatures = random_signatures(20_000, D);
    group.throughput(Throughput::Elements(signatures.len() as u64));

    group.bench_function(BenchmarkId::new("insert", "memory"), |b| {
        b.iter(|| {
            let mut forest = LshForest::new(D, L, StoreConfig::Memory).unwrap();
            forest.batch_insert(&signatures).unwrap();
        });
    });

    group.bench_function(BenchmarkId::new("insert", "file_backed"), |b| {
        b.iter(|| {
            let tmp = NamedTempFile::new().unwrap();
            let mut forest =
                LshForest::new(D, L, StoreConfig::File(tmp.path().to_path_buf())).unwrap();
            forest.batch_insert(&signatures).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_batch_insert, bench_query, bench_memory_vs_file_backed);
criterion_main!(benches);
