use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Closed-form call expectation under a normal terminal distribution.
///
/// E[max(S - K, 0)] = integral_K^inf (S - K) phi(S; mu, sigma) dS
///                  = (mu - K) * Phi(d) + sigma * phi(d)
///
/// where d = (mu - K) / sigma and Phi/phi are the standard normal CDF/PDF.
/// sigma == 0 degenerates to the intrinsic value.
pub fn normal_call_expectation(mean: f64, sigma: f64, strike: f64) -> f64 {
    if sigma < 1e-12 {
        return (mean - strike).max(0.0);
    }

    let normal = Normal::standard();
    let d = (mean - strike) / sigma;

    (mean - strike) * normal.cdf(d) + sigma * normal.pdf(d)
}

/// Exact E[max(start + sum_{i=1}^{n} U_i - K, 0)] for i.i.d. U_i ~ U(low, high).
///
/// Rescale to the Irwin-Hall sum X of n U(0, 1) variables:
///   start + sum U_i = start + n*low + w*X,  w = high - low
/// so the payoff is w * max(X - c, 0) with c = (K - start - n*low) / w.
///
/// Lower partial moment of Irwin-Hall:
///   E[max(c - X, 0)] = 1/(n+1)! * sum_{k=0}^{n} (-1)^k C(n,k) max(c - k, 0)^(n+1)
///
/// For c <= n/2 put-call parity gives E[max(X - c, 0)] = E[max(c - X, 0)] + n/2 - c.
/// Above n/2 that subtraction cancels catastrophically, so the symmetry
/// X ~ n - X is used instead: E[max(X - c, 0)] = E[max((n - c) - X, 0)],
/// which only sums the few terms with k < n - c.
pub fn uniform_sum_call_expectation(start: f64, n: u32, low: f64, high: f64, strike: f64) -> f64 {
    let width = high - low;
    let c = (strike - start - n as f64 * low) / width;
    let nf = n as f64;

    if c <= 0.0 {
        // Always in the money: payoff is linear.
        return width * (nf / 2.0 - c);
    }
    if c >= nf {
        return 0.0;
    }

    let upper = if c > nf / 2.0 {
        irwin_hall_lower_moment(n, nf - c)
    } else {
        irwin_hall_lower_moment(n, c) + nf / 2.0 - c
    };

    width * upper.max(0.0)
}

/// E[max(c - X, 0)] for X the sum of n U(0, 1) variables, 0 < c < n.
fn irwin_hall_lower_moment(n: u32, c: f64) -> f64 {
    let nf = n as f64;
    let mut sum = 0.0;
    let mut binom = 1.0;
    for k in 0..=n {
        let kf = k as f64;
        if k > 0 {
            binom *= (nf - kf + 1.0) / kf;
        }
        let base = c - kf;
        if base <= 0.0 {
            break;
        }
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign * binom * base.powi(n as i32 + 1);
    }
    let factorial: f64 = (1..=n + 1).map(f64::from).product();
    sum / factorial
}
