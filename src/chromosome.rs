use crate::distance::{Distances, Stop, StopId};
use crate::errors::{Error, Result};
use crate::genetic_algorithm::Chromosome;

/// Substituted for zero-length legs so coincident stops score finitely.
pub const MIN_DISTANCE_KM: f64 = 1e-6;

/// A candidate route: a permutation of indices into the run's stop list.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteChromosome {
    genes: Vec<usize>,
    fitness: Option<f64>,
}

impl RouteChromosome {
    /// Builds a chromosome, failing if `order` is not a permutation of
    /// `0..stop_count`.
    pub fn new(order: Vec<usize>, stop_count: usize) -> Result<Self> {
        if !is_permutation(&order, stop_count) {
            return Err(Error::InvalidPermutation {
                expected: stop_count,
                found: order,
            });
        }

        Ok(Self::from_valid(order))
    }

    // Callers guarantee `genes` is a permutation
    pub(crate) fn from_valid(genes: Vec<usize>) -> Self {
        debug_assert!(is_permutation(&genes, genes.len()));
        Self {
            genes,
            fitness: None,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Inverse-distance sum over consecutive legs of the open path. Cached
    /// until the gene order changes.
    pub fn score(&mut self, distances: &Distances) -> f64 {
        if let Some(fitness) = self.fitness {
            return fitness;
        }

        let fitness = path_fitness(&self.genes, distances);
        self.fitness = Some(fitness);
        fitness
    }

    /// Exchanges two positions. Equal indices are a no-op.
    pub fn swap(&mut self, i: usize, j: usize) {
        if i != j {
            self.genes.swap(i, j);
            self.fitness = None;
        }
    }

    pub fn to_route(&self, stops: &[Stop]) -> Vec<StopId> {
        self.genes.iter().map(|&g| stops[g].id.clone()).collect()
    }
}

impl Chromosome for RouteChromosome {
    fn genes(&self) -> &[usize] {
        &self.genes
    }

    fn fitness(&self) -> Option<f64> {
        self.fitness
    }
}

pub fn path_fitness(genes: &[usize], distances: &Distances) -> f64 {
    genes
        .windows(2)
        .map(|leg| {
            let d = distances.get(leg[0], leg[1]);
            1.0 / if d > 0.0 { d } else { MIN_DISTANCE_KM }
        })
        .sum()
}

pub fn is_permutation(genes: &[usize], stop_count: usize) -> bool {
    if genes.len() != stop_count {
        return false;
    }

    let mut seen = vec![false; stop_count];
    for &g in genes {
        if g >= stop_count || seen[g] {
            return false;
        }
        seen[g] = true;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Haversine;

    fn line_stops() -> Vec<Stop> {
        vec![
            Stop::new("a", 0.0, 0.0),
            Stop::new("b", 0.0, 1.0),
            Stop::new("c", 0.0, 2.0),
        ]
    }

    #[test]
    fn it_rejects_non_permutations() {
        assert!(RouteChromosome::new(vec![0, 1, 2], 3).is_ok());
        assert!(matches!(
            RouteChromosome::new(vec![0, 0, 2], 3),
            Err(Error::InvalidPermutation { expected: 3, .. })
        ));
        assert!(RouteChromosome::new(vec![0, 1], 3).is_err());
        assert!(RouteChromosome::new(vec![0, 1, 3], 3).is_err());
    }

    #[test]
    fn it_scores_an_open_path() {
        let stops = line_stops();
        let distances = Distances::direct(&stops, &Haversine);
        let mut chromosome = RouteChromosome::new(vec![0, 1, 2], 3).unwrap();

        let expected = 1.0 / distances.get(0, 1) + 1.0 / distances.get(1, 2);
        assert_eq!(chromosome.score(&distances), expected);
        assert_eq!(chromosome.fitness(), Some(expected));
    }

    #[test]
    fn it_guards_zero_length_legs() {
        let stops = vec![Stop::new("a", 10.0, 10.0), Stop::new("b", 10.0, 10.0)];
        let distances = Distances::direct(&stops, &Haversine);
        let mut chromosome = RouteChromosome::new(vec![1, 0], 2).unwrap();

        let fitness = chromosome.score(&distances);
        assert!(fitness.is_finite());
        assert_eq!(fitness, 1.0 / MIN_DISTANCE_KM);
    }

    #[test]
    fn it_invalidates_cached_fitness_on_swap() {
        let stops = line_stops();
        let distances = Distances::direct(&stops, &Haversine);
        let mut chromosome = RouteChromosome::new(vec![0, 1, 2], 3).unwrap();
        chromosome.score(&distances);

        chromosome.swap(1, 1);
        assert!(chromosome.fitness().is_some());

        chromosome.swap(0, 2);
        assert_eq!(chromosome.fitness(), None);
        assert_eq!(chromosome.genes(), &[2, 1, 0]);
    }

    #[test]
    fn it_clones_independently() {
        let original = RouteChromosome::new(vec![0, 1, 2], 3).unwrap();
        let mut copy = original.clone();
        copy.swap(0, 1);

        assert_eq!(original.genes(), &[0, 1, 2]);
        assert_eq!(copy.genes(), &[1, 0, 2]);
    }

    #[test]
    fn it_maps_genes_back_to_stop_ids() {
        let stops = line_stops();
        let chromosome = RouteChromosome::new(vec![2, 0, 1], 3).unwrap();

        assert_eq!(
            chromosome.to_route(&stops),
            vec![StopId::from("c"), StopId::from("a"), StopId::from("b")]
        );
    }

    #[test]
    fn it_scores_single_stop_as_zero() {
        let stops = vec![Stop::new("solo", 1.0, 1.0)];
        let distances = Distances::direct(&stops, &Haversine);
        let mut chromosome = RouteChromosome::new(vec![0], 1).unwrap();

        assert_eq!(chromosome.score(&distances), 0.0);
    }
}
