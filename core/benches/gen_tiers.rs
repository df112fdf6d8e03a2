use criterion::{Criterion, criterion_group, criterion_main};
use nummatch_core::{BoardGenerator, GenerateConfig, RetryRepairGenerator};

fn bench_generate_per_pair_tier(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_9x5");
    for required_pairs in [1usize, 2, 3] {
        group.bench_function(format!("{required_pairs}_pairs"), |b| {
            let config = GenerateConfig::new(45, 9, required_pairs);
            let mut generator = RetryRepairGenerator::new(0xBE5EED);
            b.iter(|| generator.generate(&config).unwrap());
        });
    }
    group.finish();
}

fn bench_generate_wide_board(c: &mut Criterion) {
    c.bench_function("generate_18x10_3_pairs", |b| {
        let config = GenerateConfig::new(180, 18, 3);
        let mut generator = RetryRepairGenerator::new(0xBE5EED);
        b.iter(|| generator.generate(&config).unwrap());
    });
}

criterion_group!(benches, bench_generate_per_pair_tier, bench_generate_wide_board);
criterion_main!(benches);
