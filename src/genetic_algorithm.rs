use crate::random::RandomSource;
use std::fmt::Debug;

// This trait represents a chromosome - a single candidate solution
// to the problem we're solving
pub trait Chromosome: Send + Sync + Debug + Clone {
    fn genes(&self) -> &[usize];
    // Cached fitness, if the chromosome has been scored since it last changed
    fn fitness(&self) -> Option<f64>;
}

// This trait represents the stopping condition of the algorithm. It is
// consulted once per generation with the best fitness seen so far.
pub trait Evaluator: Send + Debug {
    fn can_terminate(&mut self, best_fitness: f64, generation: usize) -> bool;
}

// This trait encapsulates the underlying genetic algorithm driven by the
// optimizer. Every random draw goes through the supplied `RandomSource`.
pub trait Algorithm<C: Chromosome>: Send + Sync + Debug {
    fn generate(&self, rng: &mut RandomSource) -> Vec<C>;
    fn crossover(&self, parents: &[C], rng: &mut RandomSource) -> Vec<C>;
    fn mutate(&self, population: Vec<C>, rng: &mut RandomSource) -> Vec<C>;
    // Returns the index and fitness of the best candidate among the scored members
    fn evaluate(&self, population: &mut [C]) -> Option<(usize, f64)>;
}
