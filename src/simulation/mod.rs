pub mod crossing;
pub mod paths;
pub mod terminal;

use crate::errors::{SimError, SimResult};
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use crossing::estimate_threshold_crossing_probability;
pub use paths::SeededWalker;
pub use terminal::{call_payoff, estimate_terminal_payoff};

/// z for a two-sided 95% normal interval
const Z_95: f64 = 1.96;

/// Validated walk parameters. Immutable for the duration of a run.
///
/// Counts come in as i64 so that negative values from config are reported
/// as parameter errors instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    start: f64,
    num_steps: usize,
    num_simulations: usize,
}

impl WalkParams {
    pub fn new(start: f64, num_steps: i64, num_simulations: i64) -> SimResult<Self> {
        if !start.is_finite() {
            return Err(SimError::invalid("start", format!("must be finite, got {start}")));
        }
        if num_steps < 0 {
            return Err(SimError::invalid("num_steps", format!("must be >= 0, got {num_steps}")));
        }
        if num_simulations < 1 {
            return Err(SimError::invalid(
                "num_simulations",
                format!("must be >= 1, got {num_simulations}"),
            ));
        }
        let num_steps = usize::try_from(num_steps)
            .map_err(|e| SimError::invalid("num_steps", e.to_string()))?;
        let num_simulations = usize::try_from(num_simulations)
            .map_err(|e| SimError::invalid("num_simulations", e.to_string()))?;

        Ok(Self {
            start,
            num_steps,
            num_simulations,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    /// Re-checked by the estimators before the first draw. Zero trials
    /// would otherwise yield 0.0 or NaN instead of an error.
    pub(crate) fn check(&self) -> SimResult<()> {
        if !self.start.is_finite() {
            return Err(SimError::invalid("start", format!("must be finite, got {}", self.start)));
        }
        if self.num_simulations == 0 {
            return Err(SimError::invalid("num_simulations", "must be >= 1, got 0".to_string()));
        }
        Ok(())
    }
}

/// Result of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Estimate {
    /// Point estimate (mean payoff or hit frequency)
    pub value: f64,
    /// Standard error of the point estimate; 0 with a single trial
    pub std_error: f64,
    /// 95% confidence interval (lower bound)
    pub ci_lower: f64,
    /// 95% confidence interval (upper bound)
    pub ci_upper: f64,
    /// Number of trials aggregated
    pub trials: usize,
}

impl Estimate {
    fn new(value: f64, std_error: f64, trials: usize) -> Self {
        let margin = Z_95 * std_error;
        Self {
            value,
            std_error,
            ci_lower: value - margin,
            ci_upper: value + margin,
            trials,
        }
    }

    /// Frequency estimate for `hits` successes out of `trials`.
    /// Interval is clamped to [0, 1].
    pub(crate) fn from_hits(hits: usize, trials: usize) -> Self {
        let p = hits as f64 / trials as f64;
        let std_error = (p * (1.0 - p) / trials as f64).sqrt();
        let mut est = Self::new(p, std_error, trials);
        est.ci_lower = est.ci_lower.max(0.0);
        est.ci_upper = est.ci_upper.min(1.0);
        est
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

/// Welford running mean/variance. Feeding the same value n times leaves the
/// mean bit-identical to that value.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    #[inline]
    pub(crate) fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub(crate) fn finish(&self) -> Estimate {
        let std_error = if self.count > 1 {
            (self.m2 / (self.count - 1) as f64 / self.count as f64).sqrt()
        } else {
            0.0
        };
        Estimate::new(self.mean, std_error, self.count)
    }
}

/// Shared cancellation flag, checked between trials.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Err(Cancelled) if `cancel` is set.
#[inline]
pub(crate) fn check_cancel(
    cancel: Option<&CancelToken>,
    completed: usize,
    requested: usize,
) -> SimResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => {
            tracing::debug!(completed, requested, "simulation cancelled");
            Err(SimError::Cancelled { completed, requested })
        }
        _ => Ok(()),
    }
}
