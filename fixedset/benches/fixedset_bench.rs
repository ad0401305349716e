use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use fixedset::FixedSetBuilder;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_keys(count: usize, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen()).collect()
}

fn build_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [100, 10_000, 1_000_000].iter() {
        let keys = random_keys(*size, 1);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                FixedSetBuilder::new().build_from_seed(seed, keys)
            })
        });
    }
    group.finish();
}

fn contains_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    for size in [100, 10_000, 1_000_000].iter() {
        let keys = random_keys(*size, 2);
        let set = FixedSetBuilder::new()
            .build_from_seed(3, &keys)
            .expect("build succeeds");
        let queries = random_keys(1024, 4);
        let hits = &keys[..keys.len().min(1024)];
        group.throughput(Throughput::Elements((hits.len() + queries.len()) as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                let mut found = 0_usize;
                for &key in hits.iter().chain(queries.iter()) {
                    found += usize::from(set.contains(black_box(key)));
                }
                found
            })
        });
    }
    group.finish();
}

criterion_group!(benches, build_sizes, contains_sizes);
criterion_main!(benches);
