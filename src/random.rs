use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable random stream driving every stochastic step of the optimizer.
///
/// Backed by ChaCha8, so a seed replays the same sequence on every platform.
/// A `RandomSource` is owned by one run and deliberately not `Clone`: a copy
/// would replay the same draws. Hand concurrent work a [`fork`] instead.
///
/// [`fork`]: RandomSource::fork
#[derive(Debug)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Uniform draw in [0, 1).
    pub fn uniform01(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform draw in [0, n). Panics when `n == 0`.
    pub fn int_below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// `true` with probability `p`, for `p` in [0, 1].
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform01() < p
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.int_below(i + 1);
            items.swap(i, j);
        }
    }

    /// Derives an independent stream: same key material drawn from this one,
    /// placed on a distinct ChaCha stream.
    pub fn fork(&mut self) -> Self {
        let mut seed = <ChaCha8Rng as SeedableRng>::Seed::default();
        self.rng.fill_bytes(&mut seed);
        let stream = self.rng.next_u64();

        let mut rng = ChaCha8Rng::from_seed(seed);
        rng.set_stream(stream);
        Self { rng }
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_replays_the_same_sequence_for_the_same_seed() {
        let mut a = RandomSource::from_seed(7);
        let mut b = RandomSource::from_seed(7);

        for _ in 0..100 {
            assert_eq!(a.uniform01().to_bits(), b.uniform01().to_bits());
            assert_eq!(a.int_below(13), b.int_below(13));
        }
    }

    #[test]
    fn it_keeps_draws_in_range() {
        let mut rng = RandomSource::from_seed(1);

        for _ in 0..1_000 {
            let u = rng.uniform01();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.int_below(5) < 5);
        }
        assert_eq!(rng.int_below(1), 0);
    }

    #[test]
    fn it_shuffles_into_a_permutation() {
        let mut rng = RandomSource::from_seed(3);
        let mut items: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(items, sorted);
    }

    #[test]
    fn it_handles_trivial_shuffles() {
        let mut rng = RandomSource::from_seed(3);
        let mut empty: Vec<u8> = vec![];
        rng.shuffle(&mut empty);
        let mut single = vec![42];
        rng.shuffle(&mut single);

        assert!(empty.is_empty());
        assert_eq!(single, vec![42]);
    }

    #[test]
    fn it_forks_into_distinct_deterministic_streams() {
        let mut parent_a = RandomSource::from_seed(11);
        let mut parent_b = RandomSource::from_seed(11);
        let mut child_a = parent_a.fork();
        let mut child_b = parent_b.fork();

        let from_child: Vec<u64> = (0..16).map(|_| child_a.rng.next_u64()).collect();
        let from_twin: Vec<u64> = (0..16).map(|_| child_b.rng.next_u64()).collect();
        let from_parent: Vec<u64> = (0..16).map(|_| parent_a.rng.next_u64()).collect();

        assert_eq!(from_child, from_twin);
        assert_ne!(from_child, from_parent);
    }

    #[test]
    fn it_forks_siblings_onto_unrelated_streams() {
        let mut parent = RandomSource::from_seed(5);
        let forks: Vec<Vec<u64>> = (0..4)
            .map(|_| {
                let mut child = parent.fork();
                (0..16).map(|_| child.next_u64()).collect()
            })
            .collect();

        for (i, a) in forks.iter().enumerate() {
            for b in &forks[i + 1..] {
                assert!(a.iter().all(|x| !b.contains(x)));
            }
        }
    }
}
