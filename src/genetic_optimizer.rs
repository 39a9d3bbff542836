use crate::distance::{DistanceModel, Distances, Haversine, Stop, StopId, MATRIX_MAX_STOPS};
use crate::errors::{Error, Result};
use crate::genetic_algorithm::Evaluator;
use crate::population::{BestTracking, PairingScheme, PopulationManager, RouteAlgorithm};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub pairing: PairingScheme,
    pub best_tracking: BestTracking,
    /// Fixed seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            pairing: PairingScheme::default(),
            best_tracking: BestTracking::default(),
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfiguration(
                "population_size must be positive".to_owned(),
            ));
        }
        if self.generations == 0 {
            return Err(Error::InvalidConfiguration(
                "generations must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfiguration(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }

        Ok(())
    }
}

/// Caller-supplied routing constraints. Accepted for forward compatibility;
/// they do not influence scoring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteConstraints {
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The full generation budget ran.
    Completed,
    /// The evaluator stopped the run early.
    Converged,
    /// A cancellation token fired between generations.
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub route: Vec<StopId>,
    pub fitness: f64,
    pub generations_run: usize,
    pub termination: Termination,
}

/// Runs the whole generation budget.
#[derive(Debug, Default)]
pub struct FixedGenerations;

impl Evaluator for FixedGenerations {
    fn can_terminate(&mut self, _best_fitness: f64, _generation: usize) -> bool {
        false
    }
}

/// Stops once the best fitness has not improved for `patience` consecutive
/// generations. A generation that improves the best never stops the run.
#[derive(Debug)]
pub struct StallEvaluator {
    patience: u32,
    best_fitness: f64,
    best_fitness_count: u32,
}

impl StallEvaluator {
    /// Fails with [`Error::InvalidConfiguration`] when `patience` is zero.
    pub fn new(patience: u32) -> Result<Self> {
        if patience == 0 {
            return Err(Error::InvalidConfiguration(
                "stall patience must be positive".to_owned(),
            ));
        }

        Ok(Self {
            patience,
            best_fitness: f64::NEG_INFINITY,
            best_fitness_count: 0,
        })
    }

    pub fn patience(&self) -> u32 {
        self.patience
    }
}

impl Evaluator for StallEvaluator {
    fn can_terminate(&mut self, best_fitness: f64, _generation: usize) -> bool {
        if self.best_fitness < best_fitness {
            self.best_fitness = best_fitness;
            self.best_fitness_count = 0;
        } else {
            self.best_fitness_count += 1;
        }

        self.best_fitness_count >= self.patience
    }
}

// Whole-generation scoring touches P * (n - 1) legs per generation, which can
// justify the matrix on small inputs. First-offspring scoring never does.
fn run_distances<'a>(
    stops: &'a [Stop],
    model: &'a dyn DistanceModel,
    best_tracking: BestTracking,
) -> Distances<'a> {
    match best_tracking {
        BestTracking::WholeGeneration if stops.len() <= MATRIX_MAX_STOPS => {
            Distances::cached(stops, model)
        }
        _ => Distances::direct(stops, model),
    }
}

/// Cooperative cancellation, checked between generations.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Orders stops with a genetic algorithm.
///
/// An optimizer holds configuration only; every call builds and drops its
/// own population, so one instance may serve many threads.
#[derive(Clone, Debug, Default)]
pub struct GeneticRouteOptimizer<D: DistanceModel = Haversine> {
    config: OptimizerConfig,
    model: D,
}

impl GeneticRouteOptimizer<Haversine> {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        Self::with_distance_model(config, Haversine)
    }
}

impl<D: DistanceModel> GeneticRouteOptimizer<D> {
    pub fn with_distance_model(config: OptimizerConfig, model: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs the full generation budget with a fresh random stream seeded from
    /// the configuration.
    pub fn optimize_route(
        &self,
        stops: &[Stop],
        constraints: Option<&RouteConstraints>,
    ) -> Result<OptimizationResult> {
        let mut rng = match self.config.seed {
            Some(seed) => RandomSource::from_seed(seed),
            None => RandomSource::from_entropy(),
        };

        self.optimize_route_with(stops, constraints, &mut rng, &mut FixedGenerations, None)
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(
            stops = stops.len(),
            generations = self.config.generations,
            population_size = self.config.population_size
        )
    )]
    pub fn optimize_route_with(
        &self,
        stops: &[Stop],
        constraints: Option<&RouteConstraints>,
        rng: &mut RandomSource,
        evaluator: &mut dyn Evaluator,
        cancellation: Option<&CancellationToken>,
    ) -> Result<OptimizationResult> {
        self.config.validate()?;
        validate_stops(stops)?;

        if let Some(constraints) = constraints {
            tracing::debug!(
                labels = constraints.labels.len(),
                "route constraints are not used in scoring"
            );
        }

        if stops.len() == 1 {
            return Ok(OptimizationResult {
                route: vec![stops[0].id.clone()],
                fitness: 0.0,
                generations_run: 0,
                termination: Termination::Completed,
            });
        }

        let distances = run_distances(stops, &self.model, self.config.best_tracking);
        tracing::debug!(cached = distances.is_cached(), "distance source selected");
        let algorithm = RouteAlgorithm {
            distances: &distances,
            population_size: self.config.population_size,
            mutation_rate: self.config.mutation_rate,
            pairing: self.config.pairing,
            best_tracking: self.config.best_tracking,
        };
        let mut manager = PopulationManager::new(algorithm, rng).ok_or_else(|| {
            Error::InvalidConfiguration("population_size must be positive".to_owned())
        })?;

        let mut termination = Termination::Completed;
        while manager.generation() < self.config.generations {
            if cancellation.is_some_and(CancellationToken::is_cancelled) {
                termination = Termination::Cancelled;
                break;
            }

            let improved = manager.advance(rng);
            tracing::debug!(
                generation = manager.generation(),
                best_fitness = manager.best_fitness(),
                population = manager.population().len(),
                improved,
                "generation complete"
            );

            if evaluator.can_terminate(manager.best_fitness(), manager.generation())
                && manager.generation() < self.config.generations
            {
                termination = Termination::Converged;
                break;
            }
        }

        let result = OptimizationResult {
            route: manager.best().to_route(stops),
            fitness: manager.best_fitness(),
            generations_run: manager.generation(),
            termination,
        };

        tracing::info!(
            fitness = result.fitness,
            generations_run = result.generations_run,
            termination = ?result.termination,
            "route optimized"
        );

        Ok(result)
    }
}

fn validate_stops(stops: &[Stop]) -> Result<()> {
    if stops.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut seen: HashSet<&StopId> = HashSet::with_capacity(stops.len());
    for stop in stops {
        if !stop.has_valid_coordinates() {
            return Err(Error::InvalidStop {
                id: stop.id.clone(),
                latitude: stop.latitude,
                longitude: stop.longitude,
            });
        }
        if !seen.insert(&stop.id) {
            return Err(Error::DuplicateStopId(stop.id.clone()));
        }
    }

    Ok(())
}
