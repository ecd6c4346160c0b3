use crate::errors::{SimError, SimResult};
use crate::simulation::paths::{walk, MoveSampler};
use crate::simulation::{check_cancel, CancelToken, Estimate, WalkParams};

/// Monte Carlo estimate of P( max_{0<=k<=N} S_k >= target ).
///
/// A trial stops at the first step whose running value reaches the target;
/// only "ever crossed" matters, so the rest of the path is never drawn.
/// Returns hits / num_simulations, always in [0, 1].
pub fn estimate_threshold_crossing_probability<S>(
    params: &WalkParams,
    target: f64,
    sampler: &mut S,
    cancel: Option<&CancelToken>,
) -> SimResult<Estimate>
where
    S: MoveSampler + ?Sized,
{
    params.check()?;
    if !target.is_finite() {
        return Err(SimError::invalid("target", format!("must be finite, got {target}")));
    }

    tracing::debug!(
        start = params.start(),
        threshold = target,
        steps = params.num_steps(),
        simulations = params.num_simulations(),
        "estimating threshold crossing probability"
    );

    let mut hits: usize = 0;

    for trial in 0..params.num_simulations() {
        check_cancel(cancel, trial, params.num_simulations())?;

        if crosses(params.start(), target, params.num_steps(), sampler) {
            hits += 1;
        }
    }

    Ok(Estimate::from_hits(hits, params.num_simulations()))
}

/// Single trial: does a path from `start` reach `target` within `num_steps`?
/// A start already at or above the target is a hit with no draws.
#[inline]
pub fn crosses<S: MoveSampler + ?Sized>(start: f64, target: f64, num_steps: usize, sampler: &mut S) -> bool {
    start >= target || walk(start, num_steps, sampler).any(|v| v >= target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoricalMoves, UniformMoves};
    use crate::simulation::paths::collect_path;
    use crate::simulation::SeededWalker;
    use proptest::prelude::*;

    fn params(start: f64, steps: i64, sims: i64) -> WalkParams {
        WalkParams::new(start, steps, sims).unwrap()
    }

    fn tick_moves() -> CategoricalMoves {
        CategoricalMoves::new(&[(0.01, 0.10), (0.0, 0.85), (-0.01, 0.05)]).unwrap()
    }

    #[test]
    fn test_zero_steps_is_start_check() {
        let mut sampler = || -> f64 { panic!("no draws expected") };
        let above = estimate_threshold_crossing_probability(&params(130.0, 0, 50), 130.0, &mut sampler, None).unwrap();
        assert_eq!(above.value, 1.0);
        let below = estimate_threshold_crossing_probability(&params(129.99, 0, 50), 130.0, &mut sampler, None).unwrap();
        assert_eq!(below.value, 0.0);
    }

    #[test]
    fn test_start_above_target_draws_nothing() {
        let mut sampler = || -> f64 { panic!("no draws expected") };
        let est = estimate_threshold_crossing_probability(&params(10.0, 1_000, 20), 5.0, &mut sampler, None).unwrap();
        assert_eq!(est.value, 1.0);
    }

    #[test]
    fn test_certain_and_impossible_walks() {
        let mut up = || 1.0;
        let sure = estimate_threshold_crossing_probability(&params(0.0, 5, 10), 5.0, &mut up, None).unwrap();
        assert_eq!(sure.value, 1.0);

        let mut up = || 1.0;
        let short = estimate_threshold_crossing_probability(&params(0.0, 4, 10), 5.0, &mut up, None).unwrap();
        assert_eq!(short.value, 0.0);
    }

    #[test]
    fn test_rejects_non_finite_target() {
        let mut sampler = || 0.0;
        let res = estimate_threshold_crossing_probability(&params(0.0, 5, 10), f64::NAN, &mut sampler, None);
        assert!(matches!(res, Err(SimError::InvalidParameter { parameter: "target", .. })));
    }

    #[test]
    fn test_cancelled_mid_run() {
        let token = CancelToken::new();
        let flag = token.clone();
        let mut draws = 0usize;
        let mut flat = || {
            draws += 1;
            if draws == 45 {
                flag.cancel();
            }
            0.0
        };
        let res = estimate_threshold_crossing_probability(&params(0.0, 20, 50), 1.0, &mut flat, Some(&token));
        assert!(
            matches!(res, Err(SimError::Cancelled { completed: 3, requested: 50 })),
            "got {res:?}"
        );
        assert_eq!(draws, 60);
    }

    #[test]
    fn test_early_exit_matches_full_path() {
        let moves = UniformMoves::new(-1.0, 1.0).unwrap();
        let (start, target, steps) = (0.0, 3.0, 50);

        for seed in 0..500u64 {
            let early = crosses(start, target, steps, &mut SeededWalker::from_seed(&moves, seed));
            let path = collect_path(start, steps, &mut SeededWalker::from_seed(&moves, seed));
            let post_hoc = path.iter().any(|&v| v >= target);
            assert_eq!(early, post_hoc, "seed {seed}: early={early} post_hoc={post_hoc}");
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let moves = tick_moves();
        let p = params(120.0, 300, 2_000);
        let a = estimate_threshold_crossing_probability(&p, 121.0, &mut SeededWalker::from_seed(&moves, 5), None).unwrap();
        let b = estimate_threshold_crossing_probability(&p, 121.0, &mut SeededWalker::from_seed(&moves, 5), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_symmetric_walk_hitting_probability() {
        // +-1 steps with equal odds, 3 steps, target +1:
        // P(hit) = P(first step up) + P(down, up, up) = 1/2 + 1/8
        let moves = CategoricalMoves::new(&[(1.0, 0.5), (-1.0, 0.5)]).unwrap();
        let mut walker = SeededWalker::from_seed(&moves, 77);
        let est = estimate_threshold_crossing_probability(&params(0.0, 3, 100_000), 1.0, &mut walker, None).unwrap();
        assert!((est.value - 0.625).abs() < 0.01, "estimate {} should be ~0.625", est.value);
        assert!(est.ci_lower <= 0.625 + 0.01 && est.ci_upper >= 0.625 - 0.01);
    }

    #[test]
    fn test_tick_walk_scenario_stable_across_seeds() {
        // start 120, target 130, 2160 steps; drift is +0.0005 per step,
        // so reaching +10 is far in the tail.
        let moves = tick_moves();
        let p = params(120.0, 2_160, 10_000);

        let a = estimate_threshold_crossing_probability(&p, 130.0, &mut SeededWalker::from_seed(&moves, 1), None).unwrap();
        let b = estimate_threshold_crossing_probability(&p, 130.0, &mut SeededWalker::from_seed(&moves, 2), None).unwrap();

        for est in [a, b] {
            assert!((0.0..=1.0).contains(&est.value));
            assert!(est.value < 0.01, "tail probability estimate {} unexpectedly large", est.value);
        }
        assert!((a.value - b.value).abs() <= 4.0 * (a.std_error + b.std_error) + 1e-3);
    }

    #[test]
    fn test_tick_walk_near_target_converges() {
        // Target +1 over 2160 steps: mean move +1.08, sd ~0.18.
        let moves = tick_moves();
        let small = params(120.0, 2_160, 2_000);
        let large = params(120.0, 2_160, 8_000);

        let a = estimate_threshold_crossing_probability(&small, 121.0, &mut SeededWalker::from_seed(&moves, 10), None).unwrap();
        let b = estimate_threshold_crossing_probability(&large, 121.0, &mut SeededWalker::from_seed(&moves, 11), None).unwrap();

        assert!(a.value > 0.3 && a.value < 1.0, "estimate {}", a.value);
        assert!(b.std_error < a.std_error);
        assert!(
            (a.value - b.value).abs() < 4.0 * (a.std_error + b.std_error),
            "estimates {} and {} disagree",
            a.value,
            b.value
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn probability_in_unit_interval(
            start in -10.0f64..10.0,
            target in -10.0f64..10.0,
            steps in 0i64..40,
            sims in 1i64..60,
            seed in any::<u64>(),
        ) {
            let moves = UniformMoves::new(-1.0, 1.0).unwrap();
            let mut walker = SeededWalker::from_seed(&moves, seed);
            let est = estimate_threshold_crossing_probability(&params(start, steps, sims), target, &mut walker, None).unwrap();
            prop_assert!((0.0..=1.0).contains(&est.value), "p = {}", est.value);
            prop_assert!(est.ci_lower >= 0.0 && est.ci_upper <= 1.0);
        }

        #[test]
        fn early_exit_equivalent_for_any_seed(seed in any::<u64>(), steps in 0usize..80) {
            let moves = tick_moves();
            let early = crosses(0.0, 0.05, steps, &mut SeededWalker::from_seed(&moves, seed));
            let path = collect_path(0.0, steps, &mut SeededWalker::from_seed(&moves, seed));
            prop_assert_eq!(early, path.iter().any(|&v| v >= 0.05));
        }
    }
}
