pub mod categorical;
pub mod uniform;

use crate::errors::{SimError, SimResult};
use rand::RngCore;

pub use categorical::CategoricalMoves;
pub use uniform::UniformMoves;

/// Per-step increment distribution of a random walk.
/// draw() must consume randomness only from the given rng, so a seeded
/// rng reproduces the same increments.
/// Send + Sync so a distribution can be built on one thread and used on another.
pub trait MoveDistribution: Send + Sync {
    fn name(&self) -> &'static str;

    /// Human-readable description including parameters, e.g. `uniform(-2, 2)`.
    fn label(&self) -> String;

    /// One i.i.d. increment.
    fn draw(&self, rng: &mut dyn RngCore) -> f64;

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    /// Bounds of a continuous uniform increment, if this is one.
    /// Used to pick the exact analytic benchmark.
    fn uniform_bounds(&self) -> Option<(f64, f64)> {
        None
    }
}

/// Parse a move spec.
///
/// ```text
/// uniform:<low>,<high>
/// categorical:<value>@<prob>[,<value>@<prob>...]
/// ```
pub fn parse_moves(spec: &str) -> SimResult<Box<dyn MoveDistribution>> {
    let (kind, body) = spec
        .split_once(':')
        .ok_or_else(|| SimError::Config(format!("move spec `{spec}` has no `kind:` prefix")))?;

    match kind.trim() {
        "uniform" => {
            let (low, high) = body
                .split_once(',')
                .ok_or_else(|| SimError::Config(format!("uniform spec `{body}` needs `low,high`")))?;
            let low = parse_f64(low)?;
            let high = parse_f64(high)?;
            Ok(Box::new(UniformMoves::new(low, high)?))
        }
        "categorical" => {
            let mut outcomes = Vec::new();
            for pair in body.split(',') {
                let (value, prob) = pair.split_once('@').ok_or_else(|| {
                    SimError::Config(format!("categorical entry `{pair}` needs `value@prob`"))
                })?;
                outcomes.push((parse_f64(value)?, parse_f64(prob)?));
            }
            Ok(Box::new(CategoricalMoves::new(&outcomes)?))
        }
        other => Err(SimError::Config(format!("unknown move distribution `{other}`"))),
    }
}

fn parse_f64(s: &str) -> SimResult<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| SimError::Config(format!("`{}`: {e}", s.trim())))
}
