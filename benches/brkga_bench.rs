//! Criterion benchmarks for the BRKGA-MP-IPR engine.
//!
//! Uses a synthetic sphere decoder to measure pure engine overhead
//! independent of any domain.

use brkga_mp_ipr::{
    stopping, BrkgaMpIpr, BrkgaParams, ControlParams, DecodeError, Decoder, PathRelinkType, Sense,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Minimize sum((k - 0.5)^2) over the chromosome.
struct Sphere;

impl Decoder for Sphere {
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
        Ok(keys.iter().map(|k| (k - 0.5).powi(2)).sum())
    }
}

fn bench_evolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("brkga_evolution");
    for &dim in &[20usize, 100] {
        group.bench_with_input(BenchmarkId::new("sphere", dim), &dim, |b, &dim| {
            b.iter(|| {
                let params = BrkgaParams::default().with_population_size(50);
                let mut algorithm =
                    BrkgaMpIpr::new(Sphere, Sense::Minimize, 42, dim, params, 1).unwrap();
                algorithm.set_stopping_criteria(stopping::max_iterations(50));
                let status = algorithm.run(&ControlParams::default()).unwrap();
                black_box(status.best_fitness)
            });
        });
    }
    group.finish();
}

fn bench_multi_population(c: &mut Criterion) {
    c.bench_function("brkga_three_populations_with_features", |b| {
        b.iter(|| {
            let params = BrkgaParams::default()
                .with_population_size(50)
                .with_num_independent_populations(3)
                .with_exchange(10, 2)
                .with_path_relink(15, PathRelinkType::Direct);
            let mut algorithm =
                BrkgaMpIpr::new(Sphere, Sense::Minimize, 42, 50, params, 1).unwrap();
            algorithm.set_stopping_criteria(stopping::max_iterations(30));
            let status = algorithm.run(&ControlParams::default()).unwrap();
            black_box(status.best_fitness)
        });
    });
}

criterion_group!(benches, bench_evolution, bench_multi_population);
criterion_main!(benches);
