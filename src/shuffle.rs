use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of permutations for the shuffling strategies.
pub trait Shuffler {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl<S: Shuffler + ?Sized> Shuffler for &mut S {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        (**self).shuffle(items)
    }
}

/// Uniform shuffle backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngShuffler<R> {
    rng: R,
}

impl<R: Rng> RngShuffler<R> {
    pub fn new(rng: R) -> RngShuffler<R> {
        RngShuffler { rng }
    }
}

impl RngShuffler<SmallRng> {
    pub fn seeded(seed: u64) -> RngShuffler<SmallRng> {
        RngShuffler::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> RngShuffler<SmallRng> {
        RngShuffler::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> Shuffler for RngShuffler<R> {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        SliceRandom::shuffle(items, &mut self.rng);
    }
}

/// Leaves the sequence untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}
