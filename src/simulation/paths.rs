use crate::models::MoveDistribution;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Source of i.i.d. per-step increments. One call, one increment.
///
/// Any `FnMut() -> f64` is a sampler; `SeededWalker` binds a
/// `MoveDistribution` to an explicit rng.
pub trait MoveSampler {
    fn next_move(&mut self) -> f64;
}

impl<F: FnMut() -> f64> MoveSampler for F {
    #[inline]
    fn next_move(&mut self) -> f64 {
        self()
    }
}

/// A move distribution driven by an owned rng.
pub struct SeededWalker<'a, R> {
    moves: &'a dyn MoveDistribution,
    rng: R,
}

impl<'a, R: RngCore> SeededWalker<'a, R> {
    pub fn new(moves: &'a dyn MoveDistribution, rng: R) -> Self {
        Self { moves, rng }
    }
}

impl<'a> SeededWalker<'a, StdRng> {
    pub fn from_seed(moves: &'a dyn MoveDistribution, seed: u64) -> Self {
        Self::new(moves, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> MoveSampler for SeededWalker<'_, R> {
    #[inline]
    fn next_move(&mut self) -> f64 {
        self.moves.draw(&mut self.rng)
    }
}

/// Lazy sequence of cumulative values of one sample path.
///
/// Yields the value after each step (not the start), so a zero-step path
/// is empty and draws nothing. Stopping early leaves the remaining steps
/// unsampled.
pub struct CumulativePath<'s, S: ?Sized> {
    value: f64,
    remaining: usize,
    sampler: &'s mut S,
}

impl<S: MoveSampler + ?Sized> Iterator for CumulativePath<'_, S> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.value += self.sampler.next_move();
        Some(self.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<S: MoveSampler + ?Sized> ExactSizeIterator for CumulativePath<'_, S> {}

/// Start a path at `start` that runs for at most `num_steps` steps.
#[inline]
pub fn walk<S: MoveSampler + ?Sized>(
    start: f64,
    num_steps: usize,
    sampler: &mut S,
) -> CumulativePath<'_, S> {
    CumulativePath {
        value: start,
        remaining: num_steps,
        sampler,
    }
}

/// Full trajectory `[start, s_1, ..., s_n]`.
#[cfg(test)]
pub fn collect_path<S: MoveSampler + ?Sized>(start: f64, num_steps: usize, sampler: &mut S) -> Vec<f64> {
    let mut path = Vec::with_capacity(num_steps + 1);
    path.push(start);
    path.extend(walk(start, num_steps, sampler));
    path
}
