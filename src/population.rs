use crate::chromosome::RouteChromosome;
use crate::distance::Distances;
use crate::errors::{Error, Result};
use crate::genetic_algorithm::{Algorithm, Chromosome};
use crate::random::RandomSource;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How parents are paired into offspring each generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingScheme {
    /// Pairs `(0, 1), (2, 3), ...`, a trailing odd member mates with member 0,
    /// one child per pair. The population shrinks to `ceil(P / 2)` every
    /// generation until a single member remains.
    #[default]
    Halving,
    /// Duplicates member 0 when `P` is odd, breeds two children per pair
    /// (`a x b` and `b x a`) and keeps the first `P`. Population size stays
    /// constant.
    Padded,
}

/// Which offspring are scored when looking for a new best route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestTracking {
    /// Only the first child of each generation is scored.
    #[default]
    FirstOffspring,
    /// Every child is scored; the earliest strictly-best one is considered.
    WholeGeneration,
}

/// Ordered crossover (OX).
///
/// Copies a random contiguous slice of `parent_1` into the same positions of
/// the child, then fills the remaining positions left to right with the genes
/// of `parent_2` in their original order, skipping genes already copied.
///
/// Fails with [`Error::InvalidPermutation`] when the parents differ in length.
pub fn ordered_crossover(
    parent_1: &RouteChromosome,
    parent_2: &RouteChromosome,
    rng: &mut RandomSource,
) -> Result<RouteChromosome> {
    if parent_1.len() != parent_2.len() {
        return Err(Error::InvalidPermutation {
            expected: parent_1.len(),
            found: parent_2.genes().to_vec(),
        });
    }

    Ok(crossover_pair(parent_1, parent_2, rng))
}

// Both parents are permutations of the same length, hence of the same gene set
fn crossover_pair(
    parent_1: &RouteChromosome,
    parent_2: &RouteChromosome,
    rng: &mut RandomSource,
) -> RouteChromosome {
    let size = parent_1.len();
    if size == 0 {
        return RouteChromosome::from_valid(Vec::new());
    }

    let start = rng.int_below(size);
    let span = rng.int_below(size - start) + 1;
    let end = start + span;

    let segment = &parent_1.genes()[start..end];
    let mut used = vec![false; size];
    for &gene in segment {
        used[gene] = true;
    }

    let mut fill = parent_2.genes().iter().copied().filter(|&g| !used[g]);
    let genes = (0..size)
        .map(|i| {
            if (start..end).contains(&i) {
                parent_1.genes()[i]
            } else {
                fill.next().unwrap_or(parent_1.genes()[i])
            }
        })
        .collect();

    RouteChromosome::from_valid(genes)
}

/// Swaps two uniformly drawn positions (possibly the same one).
pub fn swap_mutation(chromosome: &mut RouteChromosome, rng: &mut RandomSource) {
    let size = chromosome.len();
    if size == 0 {
        return;
    }

    let i = rng.int_below(size);
    let j = rng.int_below(size);
    chromosome.swap(i, j);
}

/// Genetic operators over route chromosomes for one optimization run.
#[derive(Debug)]
pub struct RouteAlgorithm<'a> {
    pub distances: &'a Distances<'a>,
    pub population_size: usize,
    pub mutation_rate: f64,
    pub pairing: PairingScheme,
    pub best_tracking: BestTracking,
}

impl<'a> Algorithm<RouteChromosome> for RouteAlgorithm<'a> {
    fn generate(&self, rng: &mut RandomSource) -> Vec<RouteChromosome> {
        let stop_count = self.distances.size();

        (0..self.population_size)
            .map(|_| {
                let mut genes: Vec<usize> = (0..stop_count).collect();
                rng.shuffle(&mut genes);
                RouteChromosome::from_valid(genes)
            })
            .collect()
    }

    fn crossover(&self, parents: &[RouteChromosome], rng: &mut RandomSource) -> Vec<RouteChromosome> {
        if parents.is_empty() {
            return Vec::new();
        }

        match self.pairing {
            PairingScheme::Halving => (0..parents.len())
                .step_by(2)
                .map(|i| {
                    let parent_2 = parents.get(i + 1).unwrap_or(&parents[0]);
                    crossover_pair(&parents[i], parent_2, rng)
                })
                .collect(),
            PairingScheme::Padded => {
                let mut padded: Vec<&RouteChromosome> = parents.iter().collect();
                if padded.len() % 2 == 1 {
                    padded.push(&parents[0]);
                }

                let mut children = Vec::with_capacity(padded.len());
                for pair in padded.chunks_exact(2) {
                    children.push(crossover_pair(pair[0], pair[1], rng));
                    children.push(crossover_pair(pair[1], pair[0], rng));
                }

                children.truncate(parents.len());
                children
            }
        }
    }

    fn mutate(&self, mut population: Vec<RouteChromosome>, rng: &mut RandomSource) -> Vec<RouteChromosome> {
        for chromosome in population.iter_mut() {
            if rng.chance(self.mutation_rate) {
                swap_mutation(chromosome, rng);
            }
        }

        population
    }

    fn evaluate(&self, population: &mut [RouteChromosome]) -> Option<(usize, f64)> {
        match self.best_tracking {
            BestTracking::FirstOffspring => population
                .first_mut()
                .map(|first| (0, first.score(self.distances))),
            BestTracking::WholeGeneration => {
                let scores: Vec<f64> = population
                    .par_iter_mut()
                    .map(|chromosome| chromosome.score(self.distances))
                    .collect();

                scores
                    .into_iter()
                    .enumerate()
                    .fold(None, |best: Option<(usize, f64)>, (i, fitness)| match best {
                        Some((_, b)) if fitness <= b => best,
                        _ => Some((i, fitness)),
                    })
            }
        }
    }
}

/// Owns the current generation and the best route observed during a run.
#[derive(Debug)]
pub struct PopulationManager<A: Algorithm<RouteChromosome>> {
    algorithm: A,
    population: Vec<RouteChromosome>,
    best: RouteChromosome,
    best_fitness: f64,
    generation: usize,
}

impl<A: Algorithm<RouteChromosome>> PopulationManager<A> {
    /// Builds the initial random population. The first member seeds the
    /// best-so-far.
    ///
    /// Returns `None` when the algorithm generates no members.
    pub fn new(algorithm: A, rng: &mut RandomSource) -> Option<Self> {
        let mut population = algorithm.generate(rng);
        let head = population.len().min(1);
        let (_, best_fitness) = algorithm.evaluate(&mut population[..head])?;
        let best = population[0].clone();

        Some(Self {
            algorithm,
            population,
            best,
            best_fitness,
            generation: 0,
        })
    }

    /// Breeds the next generation and updates the best route. Returns `true`
    /// if the best improved.
    pub fn advance(&mut self, rng: &mut RandomSource) -> bool {
        let children = self.algorithm.crossover(&self.population, rng);
        let mut children = self.algorithm.mutate(children, rng);
        self.generation += 1;

        let mut improved = false;
        if let Some((index, fitness)) = self.algorithm.evaluate(&mut children) {
            if fitness > self.best_fitness {
                tracing::trace!(generation = self.generation, fitness, "new best route");
                self.best = children[index].clone();
                self.best_fitness = fitness;
                improved = true;
            }
        }

        self.population = children;
        improved
    }

    pub fn population(&self) -> &[RouteChromosome] {
        &self.population
    }

    pub fn best(&self) -> &RouteChromosome {
        &self.best
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn generation(&self) -> usize {
        self.generation
    }
}
