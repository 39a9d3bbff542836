use proptest::prelude::*;
use route_optimizer::demo_data::clustered_stops;
use route_optimizer::logging::init_test_logging;
use route_optimizer::{
    recommend_seats, BestTracking, DistanceModel, Error, GeneticRouteOptimizer, Haversine,
    OptimizerConfig, PairingScheme, RandomSource, SeatPreference, Stop, StopId, Termination,
};
use std::collections::HashSet;
use std::thread;

fn ids(stops: &[Stop]) -> HashSet<StopId> {
    stops.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn optimizes_synthetic_towns_into_a_full_route() {
    init_test_logging();
    let mut rng = RandomSource::from_seed(21);
    let stops = clustered_stops(&mut rng, 3, 5, 2.0).unwrap();
    let optimizer = GeneticRouteOptimizer::new(OptimizerConfig {
        seed: Some(21),
        pairing: PairingScheme::Padded,
        best_tracking: BestTracking::WholeGeneration,
        ..Default::default()
    })
    .unwrap();

    let result = optimizer.optimize_route(&stops, None).unwrap();

    assert_eq!(result.route.len(), stops.len());
    assert_eq!(result.route.iter().cloned().collect::<HashSet<_>>(), ids(&stops));
    assert!(result.fitness > 0.0);
    assert_eq!(result.generations_run, 100);
    assert_eq!(result.termination, Termination::Completed);
}

#[test]
fn seeded_runs_agree_across_threads() {
    let mut rng = RandomSource::from_seed(3);
    let stops = clustered_stops(&mut rng, 2, 6, 3.0).unwrap();
    let optimizer = GeneticRouteOptimizer::new(OptimizerConfig {
        seed: Some(99),
        ..Default::default()
    })
    .unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| optimizer.optimize_route(&stops, None).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results[1..] {
        assert_eq!(result.route, results[0].route);
        assert_eq!(result.fitness.to_bits(), results[0].fitness.to_bits());
    }
}

#[test]
fn rejects_an_empty_stop_list() {
    let optimizer = GeneticRouteOptimizer::new(OptimizerConfig::default()).unwrap();
    assert!(matches!(
        optimizer.optimize_route(&[], None),
        Err(Error::EmptyInput)
    ));
}

#[test]
fn recommends_window_seats_around_occupied_ones() {
    let preference = SeatPreference {
        wants_window: true,
        wants_aisle: false,
        count: 2,
    };
    let occupied: HashSet<u32> = [3].into_iter().collect();

    assert_eq!(recommend_seats(&preference, 8, &occupied).unwrap(), vec![4, 7]);
}

#[test]
fn recommends_nothing_for_window_and_aisle_together() {
    let preference = SeatPreference {
        wants_window: true,
        wants_aisle: true,
        count: 1,
    };

    assert!(recommend_seats(&preference, 8, &HashSet::new())
        .unwrap()
        .is_empty());
}

fn coordinate() -> impl Strategy<Value = (f64, f64)> {
    (-90.0..=90.0f64, -180.0..=180.0f64)
}

proptest! {
    #[test]
    fn distance_is_symmetric_and_non_negative((lat_a, lon_a) in coordinate(), (lat_b, lon_b) in coordinate()) {
        let a = Stop::new("a", lat_a, lon_a);
        let b = Stop::new("b", lat_b, lon_b);

        let d = Haversine.distance(&a, &b);
        prop_assert!(d.is_finite());
        prop_assert!(d >= 0.0);
        prop_assert_eq!(d.to_bits(), Haversine.distance(&b, &a).to_bits());
        prop_assert_eq!(Haversine.distance(&a, &a), 0.0);
    }
}
