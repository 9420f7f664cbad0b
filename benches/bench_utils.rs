use criterion::{black_box, BatchSize, Criterion, Throughput};
use nanorand::{Rng, WyRand};

pub fn random_u32s(n: usize, seed: u64) -> Vec<u32> {
    let mut rng = WyRand::new_seed(seed);
    (0..n).map(|_| rng.generate()).collect()
}

pub fn random_u64s(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = WyRand::new_seed(seed);
    (0..n).map(|_| rng.generate()).collect()
}

pub fn bench_sorts<T, F>(c: &mut Criterion, group: &str, input: Vec<T>, tests: Vec<(&str, F)>)
where
    T: Clone,
    F: Fn(Vec<T>),
{
    let mut group = c.benchmark_group(group);
    group.throughput(Throughput::Elements(input.len() as u64));

    for (name, sort_fn) in tests {
        group.bench_function(name, |b| {
            b.iter_batched(
                || input.clone(),
                |input| {
                    sort_fn(black_box(input));
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}
