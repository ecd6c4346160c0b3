use crate::errors::{SimError, SimResult};
use crate::models::MoveDistribution;
use rand::RngCore;
use rand_distr::{Distribution, WeightedIndex};
use smallvec::SmallVec;

/// Tolerance on the sum of probabilities.
const PROB_SUM_TOLERANCE: f64 = 1e-9;

/// Finite set of increments with fixed probabilities, e.g. an up/flat/down
/// tick: {+0.01: 0.10, 0: 0.85, -0.01: 0.05}.
///
/// Outcomes live inline (no heap) for up to four values.
pub struct CategoricalMoves {
    values: SmallVec<[f64; 4]>,
    probs: SmallVec<[f64; 4]>,
    index: WeightedIndex<f64>,
}

impl CategoricalMoves {
    /// Build from `(value, probability)` pairs.
    /// Probabilities must be finite, non-negative and sum to 1.
    pub fn new(outcomes: &[(f64, f64)]) -> SimResult<Self> {
        if outcomes.is_empty() {
            return Err(SimError::invalid("categorical outcomes", "no outcomes given"));
        }

        let mut values: SmallVec<[f64; 4]> = SmallVec::with_capacity(outcomes.len());
        let mut probs: SmallVec<[f64; 4]> = SmallVec::with_capacity(outcomes.len());
        for &(value, prob) in outcomes {
            if !value.is_finite() {
                return Err(SimError::invalid(
                    "categorical outcomes",
                    format!("value {value} is not finite"),
                ));
            }
            if !prob.is_finite() || prob < 0.0 {
                return Err(SimError::invalid(
                    "categorical probabilities",
                    format!("probability {prob} for value {value} must be finite and >= 0"),
                ));
            }
            values.push(value);
            probs.push(prob);
        }

        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(SimError::invalid(
                "categorical probabilities",
                format!("probabilities sum to {total}, expected 1"),
            ));
        }

        let index = WeightedIndex::new(probs.iter().copied())
            .map_err(|e| SimError::invalid("categorical probabilities", e.to_string()))?;

        Ok(Self { values, probs, index })
    }
}

impl MoveDistribution for CategoricalMoves {
    #[inline]
    fn name(&self) -> &'static str {
        "categorical"
    }

    fn label(&self) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .zip(self.probs.iter())
            .map(|(v, p)| format!("{v}@{p}"))
            .collect();
        format!("categorical({})", parts.join(", "))
    }

    #[inline]
    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        self.values[self.index.sample(rng)]
    }

    fn mean(&self) -> f64 {
        self.values.iter().zip(self.probs.iter()).map(|(v, p)| v * p).sum()
    }

    fn variance(&self) -> f64 {
        let mean = self.mean();
        self.values
            .iter()
            .zip(self.probs.iter())
            .map(|(v, p)| p * (v - mean) * (v - mean))
            .sum()
    }
}
