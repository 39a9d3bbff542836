use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use route_optimizer::demo_data::clustered_stops;
use route_optimizer::distance::{DistanceMatrix, Haversine};
use route_optimizer::{
    BestTracking, FixedGenerations, GeneticRouteOptimizer, OptimizerConfig, PairingScheme,
    RandomSource,
};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = RandomSource::from_seed(1);
    let stops = clustered_stops(&mut rng, 8, 8, 4.0).unwrap();

    c.bench_function("distance_matrix_64", |b| {
        b.iter(|| DistanceMatrix::new(black_box(&stops), &Haversine))
    });

    let mut group = c.benchmark_group("optimize_route_64");
    for (name, pairing, best_tracking) in [
        ("halving_first", PairingScheme::Halving, BestTracking::FirstOffspring),
        ("padded_whole", PairingScheme::Padded, BestTracking::WholeGeneration),
    ] {
        let optimizer = GeneticRouteOptimizer::new(OptimizerConfig {
            pairing,
            best_tracking,
            ..Default::default()
        })
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(name), &stops, |b, stops| {
            b.iter(|| {
                let mut rng = RandomSource::from_seed(7);
                optimizer
                    .optimize_route_with(stops, None, &mut rng, &mut FixedGenerations, None)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
