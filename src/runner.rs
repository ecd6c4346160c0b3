use crate::analytics::{normal_call_expectation, uniform_sum_call_expectation};
use crate::config::{CrossingConfig, TerminalConfig};
use crate::errors::SimResult;
use crate::models::parse_moves;
use crate::report::RunReport;
use crate::simulation::{
    call_payoff, estimate_terminal_payoff, estimate_threshold_crossing_probability, CancelToken,
    SeededWalker, WalkParams,
};

/// Terminal-payoff scenario. All parameters are validated before the
/// first draw.
pub fn run_terminal(cfg: &TerminalConfig, seed: u64, cancel: &CancelToken) -> SimResult<RunReport> {
    let params = WalkParams::new(cfg.start, cfg.steps, cfg.simulations)?;
    let moves = parse_moves(&cfg.moves)?;

    tracing::info!(
        start = params.start(),
        steps = params.num_steps(),
        simulations = params.num_simulations(),
        strike = cfg.strike,
        kind = moves.name(),
        moves = %moves.label(),
        seed,
        "running terminal payoff scenario"
    );

    let started_at = chrono::Utc::now();
    let mut walker = SeededWalker::from_seed(&*moves, seed);
    let estimate = estimate_terminal_payoff(&params, &mut walker, call_payoff(cfg.strike), Some(cancel))?;

    let mut report = RunReport::new("terminal", moves.label(), &estimate, seed, started_at);

    if let Some((low, high)) = moves.uniform_bounds() {
        match u32::try_from(params.num_steps()) {
            Ok(n) if n <= 20 => {
                report = report.with_analytic(uniform_sum_call_expectation(params.start(), n, low, high, cfg.strike));
            }
            _ => {
                let mean = params.start() + params.num_steps() as f64 * moves.mean();
                let sigma = (params.num_steps() as f64 * moves.variance()).sqrt();
                report = report.with_analytic(normal_call_expectation(mean, sigma, cfg.strike));
            }
        }
    }

    if !estimate.is_finite() {
        tracing::warn!(value = estimate.value, "terminal estimate is not finite");
    }

    tracing::info!(
        estimate = estimate.value,
        std_error = estimate.std_error,
        analytic = ?report.analytic,
        elapsed_ms = report.elapsed_ms,
        "terminal payoff scenario done"
    );

    Ok(report)
}

/// Threshold-crossing scenario.
pub fn run_crossing(cfg: &CrossingConfig, seed: u64, cancel: &CancelToken) -> SimResult<RunReport> {
    let params = WalkParams::new(cfg.start, cfg.steps, cfg.simulations)?;
    let moves = parse_moves(&cfg.moves)?;

    tracing::info!(
        start = params.start(),
        threshold = cfg.target,
        steps = params.num_steps(),
        simulations = params.num_simulations(),
        kind = moves.name(),
        moves = %moves.label(),
        seed,
        "running threshold crossing scenario"
    );

    let started_at = chrono::Utc::now();
    let mut walker = SeededWalker::from_seed(&*moves, seed);
    let estimate = estimate_threshold_crossing_probability(&params, cfg.target, &mut walker, Some(cancel))?;

    let report = RunReport::new("crossing", moves.label(), &estimate, seed, started_at);

    tracing::info!(
        probability = estimate.value,
        std_error = estimate.std_error,
        elapsed_ms = report.elapsed_ms,
        "threshold crossing scenario done"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SimError;

    fn terminal_cfg() -> TerminalConfig {
        TerminalConfig {
            start: 100.0,
            steps: 10,
            simulations: 20_000,
            moves: "uniform:-2,2".into(),
            strike: 105.0,
        }
    }

    fn crossing_cfg() -> CrossingConfig {
        CrossingConfig {
            start: 120.0,
            target: 121.0,
            steps: 500,
            simulations: 2_000,
            moves: "categorical:0.01@0.10,0@0.85,-0.01@0.05".into(),
        }
    }

    #[test]
    fn test_terminal_report_has_exact_benchmark() {
        let report = run_terminal(&terminal_cfg(), 3, &CancelToken::new()).unwrap();
        let analytic = report.analytic.unwrap();
        assert!((analytic - 0.140616).abs() < 1e-5);
        assert!((report.estimate - analytic).abs() < 0.05);
        assert_eq!(report.trials, 20_000);
    }

    #[test]
    fn test_terminal_same_seed_same_report_value() {
        let a = run_terminal(&terminal_cfg(), 9, &CancelToken::new()).unwrap();
        let b = run_terminal(&terminal_cfg(), 9, &CancelToken::new()).unwrap();
        assert_eq!(a.estimate, b.estimate);
    }

    #[test]
    fn test_categorical_terminal_has_no_benchmark() {
        let mut cfg = terminal_cfg();
        cfg.moves = "categorical:1@0.5,-1@0.5".into();
        let report = run_terminal(&cfg, 1, &CancelToken::new()).unwrap();
        assert!(report.analytic.is_none());
    }

    #[test]
    fn test_invalid_params_fail_before_simulation() {
        let mut cfg = terminal_cfg();
        cfg.simulations = 0;
        assert!(matches!(
            run_terminal(&cfg, 1, &CancelToken::new()),
            Err(SimError::InvalidParameter { parameter: "num_simulations", .. })
        ));

        let mut cfg = crossing_cfg();
        cfg.steps = -1;
        assert!(matches!(
            run_crossing(&cfg, 1, &CancelToken::new()),
            Err(SimError::InvalidParameter { parameter: "num_steps", .. })
        ));

        let mut cfg = crossing_cfg();
        cfg.moves = "categorical:0.01@0.2,0@0.85".into();
        assert!(matches!(
            run_crossing(&cfg, 1, &CancelToken::new()),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_crossing_report() {
        let report = run_crossing(&crossing_cfg(), 4, &CancelToken::new()).unwrap();
        assert_eq!(report.scenario, "crossing");
        assert!((0.0..=1.0).contains(&report.estimate));
        assert!(report.moves.starts_with("categorical("));
    }

    #[test]
    fn test_cancelled_run() {
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            run_crossing(&crossing_cfg(), 4, &token),
            Err(SimError::Cancelled { .. })
        ));
    }
}
