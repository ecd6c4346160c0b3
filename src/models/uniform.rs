use crate::errors::{SimError, SimResult};
use crate::models::MoveDistribution;
use rand::RngCore;
use rand_distr::{Distribution, Uniform};

/// Continuous uniform increments on [low, high).
///
/// mean = (low + high) / 2
/// var  = (high - low)^2 / 12
pub struct UniformMoves {
    low: f64,
    high: f64,
    dist: Uniform<f64>,
}

impl UniformMoves {
    pub fn new(low: f64, high: f64) -> SimResult<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(SimError::invalid(
                "uniform bounds",
                format!("bounds must be finite, got [{low}, {high})"),
            ));
        }
        // Uniform::new panics on an empty range.
        if low >= high {
            return Err(SimError::invalid(
                "uniform bounds",
                format!("low ({low}) must be below high ({high})"),
            ));
        }
        Ok(Self {
            low,
            high,
            dist: Uniform::new(low, high),
        })
    }
}

impl MoveDistribution for UniformMoves {
    #[inline]
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn label(&self) -> String {
        format!("uniform({}, {})", self.low, self.high)
    }

    #[inline]
    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng)
    }

    fn mean(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    fn variance(&self) -> f64 {
        let width = self.high - self.low;
        width * width / 12.0
    }

    fn uniform_bounds(&self) -> Option<(f64, f64)> {
        Some((self.low, self.high))
    }
}
