use chrono::Local;
use colored::Colorize;
use csv::Writer;
use itertools::iproduct;
use rayon::prelude::*;
use route_optimizer::demo_data::{clustered_stops, read_stops_csv};
use route_optimizer::logging::init_logging;
use route_optimizer::{
    BestTracking, DistanceModel, GeneticRouteOptimizer, Haversine, OptimizationResult,
    OptimizerConfig, PairingScheme, RandomSource, Stop, StopId,
};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs::OpenOptions;
use std::hash::{Hash, Hasher};
use std::time::Instant;

#[derive(Debug)]
pub struct BenchmarkSchema {
    stop_counts: Vec<usize>,
    population_sizes: Vec<usize>,
    generations: Vec<usize>,
    mutation_rates: Vec<f64>,
    pairings: Vec<PairingScheme>,
    best_trackings: Vec<BestTracking>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioResult {
    pub scenario: u64,
    pub repetitions: usize,
    pub stops: usize,
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub pairing: PairingScheme,
    pub best_tracking: BestTracking,
    pub mean_fitness: f64,
    pub mean_route_km: f64,
    pub mean_runtime: f64,
    pub var_fitness: f64,
    pub var_route_km: f64,
    pub var_runtime: f64,
}

#[derive(Debug)]
pub struct RunResult {
    runtime: f64,
    route_km: f64,
    result: OptimizationResult,
}

const REPETITIONS: usize = 5;
const CLUSTER_SIZE: usize = 8;
const CLUSTER_SPREAD_KM: f64 = 4.0;

fn mean_variance<T: Copy + Into<f64>>(values: &[T]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let sum: f64 = values.iter().map(|&v| v.into()).sum();
    let mean = sum / n;

    let variance = values
        .iter()
        .map(|&v| {
            let diff = v.into() - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    (mean, variance)
}

fn hash_combination(stops: usize, config: &OptimizerConfig) -> u64 {
    let mut hasher = DefaultHasher::new();

    stops.hash(&mut hasher);
    config.population_size.hash(&mut hasher);
    config.generations.hash(&mut hasher);
    config.mutation_rate.to_bits().hash(&mut hasher); // Hashing the f64 as its bit representation
    format!("{:?}", config.pairing).hash(&mut hasher);
    format!("{:?}", config.best_tracking).hash(&mut hasher);

    hasher.finish()
}

fn route_length_km(stops: &[Stop], route: &[StopId]) -> f64 {
    let by_id: HashMap<&StopId, &Stop> = stops.iter().map(|s| (&s.id, s)).collect();

    route
        .windows(2)
        .filter_map(|leg| Some((by_id.get(&leg[0])?, by_id.get(&leg[1])?)))
        .map(|(a, b)| Haversine.distance(a, b))
        .sum()
}

fn benchmark_run(
    optimizer: &GeneticRouteOptimizer,
    stops: &[Stop],
    mut rng: RandomSource,
) -> route_optimizer::Result<RunResult> {
    let start = Instant::now();
    let result = optimizer.optimize_route_with(
        stops,
        None,
        &mut rng,
        &mut route_optimizer::FixedGenerations,
        None,
    )?;
    let runtime = start.elapsed().as_secs_f64();

    Ok(RunResult {
        runtime,
        route_km: route_length_km(stops, &result.route),
        result,
    })
}

fn collect_benchmarks(
    schemas: &[BenchmarkSchema],
    fixed_stops: Option<&[Stop]>,
    file_path: &str,
) -> Result<Option<(Vec<Stop>, OptimizationResult)>, Box<dyn Error>> {
    let mut visited: HashSet<u64> = HashSet::new();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    let mut writer = Writer::from_writer(file);
    let mut rng = RandomSource::from_seed(0x5eed);
    let mut best: Option<(Vec<Stop>, OptimizationResult)> = None;

    for schema in schemas {
        for (&stop_count, &population_size, &generations, &mutation_rate, &pairing, &best_tracking) in iproduct!(
            &schema.stop_counts,
            &schema.population_sizes,
            &schema.generations,
            &schema.mutation_rates,
            &schema.pairings,
            &schema.best_trackings
        ) {
            let stops = match fixed_stops {
                Some(stops) => stops.to_vec(),
                None => clustered_stops(
                    &mut rng,
                    stop_count.div_ceil(CLUSTER_SIZE),
                    CLUSTER_SIZE,
                    CLUSTER_SPREAD_KM,
                )?,
            };

            let config = OptimizerConfig {
                population_size,
                generations,
                mutation_rate,
                pairing,
                best_tracking,
                seed: None,
            };

            let hash = hash_combination(stops.len(), &config);
            if !visited.insert(hash) {
                println!("Scenario {} already evaluated, skipping...", hash);
                continue;
            }
            println!(
                "{} {} is being run...",
                "Scenario".bold(),
                hash.to_string().bold().red()
            );

            let optimizer = GeneticRouteOptimizer::new(config.clone())?;
            let streams: Vec<RandomSource> = (0..REPETITIONS).map(|_| rng.fork()).collect();
            let runs = streams
                .into_par_iter()
                .map(|stream| benchmark_run(&optimizer, &stops, stream))
                .collect::<route_optimizer::Result<Vec<RunResult>>>()?;

            let fitness_values: Vec<f64> = runs.iter().map(|r| r.result.fitness).collect();
            let route_km_values: Vec<f64> = runs.iter().map(|r| r.route_km).collect();
            let runtime_values: Vec<f64> = runs.iter().map(|r| r.runtime).collect();

            let (mean_fitness, var_fitness) = mean_variance(&fitness_values);
            let (mean_route_km, var_route_km) = mean_variance(&route_km_values);
            let (mean_runtime, var_runtime) = mean_variance(&runtime_values);

            println!(
                "-- {} mean fitness: {:.6}, mean route: {:.1} km, mean runtime: {:.3}s",
                format!("{:3} stops", stops.len()).green(),
                mean_fitness,
                mean_route_km,
                mean_runtime
            );

            if let Some(run) = runs
                .into_iter()
                .max_by(|a, b| a.result.fitness.total_cmp(&b.result.fitness))
            {
                let is_better = best
                    .as_ref()
                    .map_or(true, |(_, b)| run.result.fitness > b.fitness);
                if is_better {
                    best = Some((stops.clone(), run.result));
                }
            }

            let result = ScenarioResult {
                scenario: hash,
                repetitions: REPETITIONS,
                stops: stops.len(),
                population_size: config.population_size,
                generations: config.generations,
                mutation_rate: config.mutation_rate,
                pairing: config.pairing,
                best_tracking: config.best_tracking,
                mean_fitness,
                mean_route_km,
                mean_runtime,
                var_fitness,
                var_route_km,
                var_runtime,
            };

            writer.serialize(result)?;
            writer.flush()?;
        }
    }

    Ok(best)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let fixed_stops = match std::env::args().nth(1) {
        Some(path) => Some(read_stops_csv(path)?),
        None => None,
    };

    let schemas = vec![
        BenchmarkSchema {
            stop_counts: vec![16, 32, 64],
            population_sizes: vec![50],
            generations: vec![100],
            mutation_rates: vec![0.1],
            pairings: vec![PairingScheme::Halving, PairingScheme::Padded],
            best_trackings: vec![BestTracking::FirstOffspring, BestTracking::WholeGeneration],
        },
        BenchmarkSchema {
            stop_counts: vec![64, 128],
            population_sizes: vec![50, 200],
            generations: vec![100, 500],
            mutation_rates: vec![0.05, 0.1, 0.3],
            pairings: vec![PairingScheme::Padded],
            best_trackings: vec![BestTracking::WholeGeneration],
        },
    ];

    let now = Local::now();
    let date_str = now.format("%Y-%m-%d_%H-%M-%S").to_string();
    let filename = format!("optimizer_results_{}.csv", date_str);

    let best = collect_benchmarks(&schemas, fixed_stops.as_deref(), &filename)?;
    println!("Results written to {}", filename);

    if let Some((stops, result)) = best {
        route_optimizer::visualization::render_route(&stops, &result, "best_route.png")?;
        println!(
            "{} fitness {:.6} over {} stops, chart saved to best_route.png",
            "Best route:".bold().green(),
            result.fitness,
            result.route.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_computes_population_mean_and_variance() {
        assert_eq!(mean_variance(&[2u32, 4, 4, 4, 5, 5, 7, 9]), (5.0, 4.0));
        assert_eq!(mean_variance(&[1.5f32]), (1.5, 0.0));
        assert_eq!(mean_variance::<f64>(&[]), (0.0, 0.0));
    }
}
