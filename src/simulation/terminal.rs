use crate::errors::SimResult;
use crate::simulation::paths::{walk, MoveSampler};
use crate::simulation::{check_cancel, CancelToken, Estimate, RunningMoments, WalkParams};

/// Monte Carlo estimate of E[payoff(S_N)] where
///
/// S_N = start + sum_{i=1}^{N} X_i,  X_i i.i.d. from `sampler`.
///
/// Each trial consumes exactly `num_steps` fresh draws; no draw is shared
/// between trials. A non-finite payoff shows up as a non-finite estimate.
pub fn estimate_terminal_payoff<S, F>(
    params: &WalkParams,
    sampler: &mut S,
    payoff: F,
    cancel: Option<&CancelToken>,
) -> SimResult<Estimate>
where
    S: MoveSampler + ?Sized,
    F: Fn(f64) -> f64,
{
    params.check()?;

    tracing::debug!(
        start = params.start(),
        steps = params.num_steps(),
        simulations = params.num_simulations(),
        "estimating terminal payoff"
    );

    let mut moments = RunningMoments::default();

    for trial in 0..params.num_simulations() {
        check_cancel(cancel, trial, params.num_simulations())?;

        let terminal = walk(params.start(), params.num_steps(), sampler).fold(params.start(), |_, v| v);
        moments.push(payoff(terminal));
    }

    Ok(moments.finish())
}

/// Call-style payoff: max(S - strike, 0)
pub fn call_payoff(strike: f64) -> impl Fn(f64) -> f64 {
    move |s| (s - strike).max(0.0)
}
