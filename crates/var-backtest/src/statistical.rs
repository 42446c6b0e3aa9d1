use risk_core::{Result, RiskError};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::models::TestOutcome;

/// Violation indicator: true where the realized loss (percent of capital)
/// strictly exceeds the VaR threshold at that date. Always recomputed from
/// (returns, VaR) so it can never go stale.
pub fn violations(returns: &[f64], var: &[f64]) -> Vec<bool> {
    returns
        .iter()
        .zip(var.iter())
        .map(|(&r, &v)| -r * 100.0 > v)
        .collect()
}

/// Kupiec proportion-of-failures (unconditional coverage) test.
///
///   LR_uc = -2 ln[ ((1-a)^(T-N) a^N) / ((1-p)^(T-N) p^N) ],  p = N/T
///
/// Chi-square with 1 df. p in {0, 1} makes the statistic undefined; that is
/// reported as NotApplicable, not as an error.
pub fn kupiec_test(sample_size: usize, breaches: usize, alpha: f64) -> Result<TestOutcome> {
    if sample_size == 0 {
        return Err(RiskError::InvalidInput(
            "sample size must be positive".to_string(),
        ));
    }
    if alpha <= 0.0 || alpha >= 1.0 {
        return Err(RiskError::InvalidInput(format!(
            "exceedance probability must be in (0, 1), got {alpha}"
        )));
    }
    if breaches > sample_size {
        return Err(RiskError::InvalidInput(format!(
            "breaches ({breaches}) cannot exceed sample size ({sample_size})"
        )));
    }

    let t = sample_size as f64;
    let n = breaches as f64;
    let p = n / t;
    if p == 0.0 || p == 1.0 {
        return Ok(TestOutcome::NotApplicable);
    }

    // Log-space form of the likelihood ratio, immune to (1-a)^T underflow.
    let statistic =
        -2.0 * ((t - n) * ((1.0 - alpha) / (1.0 - p)).ln() + n * (alpha / p).ln());
    Ok(defined_outcome(statistic.max(0.0), 1.0))
}

/// Christoffersen independence test: first-order Markov likelihood ratio on
/// the violation indicator. Null: the probability of a violation does not
/// depend on whether the previous date was a violation.
///
/// With no 0->1 and no 1->1 transitions (at most one violation, or another
/// degenerate chain) the statistic is undefined.
pub fn christoffersen_test(indicator: &[bool]) -> TestOutcome {
    if indicator.len() < 2 {
        return TestOutcome::NotApplicable;
    }

    let (mut n00, mut n01, mut n10, mut n11) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for w in indicator.windows(2) {
        match (w[0], w[1]) {
            (false, false) => n00 += 1.0,
            (false, true) => n01 += 1.0,
            (true, false) => n10 += 1.0,
            (true, true) => n11 += 1.0,
        }
    }

    if n01 + n11 == 0.0 || n00 + n01 == 0.0 {
        return TestOutcome::NotApplicable;
    }

    let pi01 = n01 / (n00 + n01);
    let pi11 = if n10 + n11 > 0.0 { n11 / (n10 + n11) } else { 0.0 };
    let pi = (n01 + n11) / (n00 + n01 + n10 + n11);
    if pi == 0.0 || pi == 1.0 {
        return TestOutcome::NotApplicable;
    }

    // log L0 under independence, log L1 under the state-dependent chain,
    // with the 0*ln(0) = 0 convention.
    let log_l0 = xlny(n00 + n10, 1.0 - pi) + xlny(n01 + n11, pi);
    let log_l1 =
        xlny(n00, 1.0 - pi01) + xlny(n01, pi01) + xlny(n10, 1.0 - pi11) + xlny(n11, pi11);

    let statistic = (-2.0 * (log_l0 - log_l1)).max(0.0);
    defined_outcome(statistic, 1.0)
}

/// Joint conditional-coverage test: LR_cc = LR_uc + LR_ind, 2 df. Defined
/// only when both components are.
pub fn joint_test(kupiec: &TestOutcome, christoffersen: &TestOutcome) -> TestOutcome {
    match (kupiec.statistic(), christoffersen.statistic()) {
        (Some(uc), Some(ind)) => defined_outcome(uc + ind, 2.0),
        _ => TestOutcome::NotApplicable,
    }
}

/// Realized Expected Shortfall: (mean, max) of loss - VaR over violated
/// dates. With zero violations both are None; there is nothing to average.
pub fn expected_shortfall(
    returns: &[f64],
    var: &[f64],
    indicator: &[bool],
) -> (Option<f64>, Option<f64>) {
    let excess: Vec<f64> = returns
        .iter()
        .zip(var.iter())
        .zip(indicator.iter())
        .filter(|(_, &hit)| hit)
        .map(|((&r, &v), _)| -r * 100.0 - v)
        .collect();

    if excess.is_empty() {
        return (None, None);
    }
    let mean = excess.iter().sum::<f64>() / excess.len() as f64;
    let max = excess.iter().cloned().fold(f64::MIN, f64::max);
    (Some(mean), Some(max))
}

/// Max drawdown of the cumulative return path, percent (<= 0).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0f64;
    let mut peak = 1.0f64;
    let mut worst = 0.0f64;
    for &r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let dd = (equity - peak) / peak;
        if dd < worst {
            worst = dd;
        }
    }
    worst * 100.0
}

fn defined_outcome(statistic: f64, df: f64) -> TestOutcome {
    let chi2 = ChiSquared::new(df).unwrap();
    TestOutcome::Defined {
        statistic,
        p_value: (1.0 - chi2.cdf(statistic)).clamp(0.0, 1.0),
    }
}

/// x * ln(y) with the convention 0 * ln(0) = 0.
fn xlny(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * y.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kupiec_is_nonnegative_with_valid_p_value() {
        for (t, n) in [(100usize, 3usize), (250, 5), (500, 40), (10, 2)] {
            let outcome = kupiec_test(t, n, 0.05).unwrap();
            let stat = outcome.statistic().unwrap();
            let p = outcome.p_value().unwrap();
            assert!(stat >= 0.0);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn kupiec_exact_rate_gives_zero_statistic() {
        // N/T equal to alpha makes the likelihood ratio 1.
        let outcome = kupiec_test(100, 5, 0.05).unwrap();
        assert!(outcome.statistic().unwrap() < 1e-12);
        assert!((outcome.p_value().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kupiec_degenerate_counts_are_not_applicable() {
        assert_eq!(kupiec_test(100, 0, 0.05).unwrap(), TestOutcome::NotApplicable);
        assert_eq!(kupiec_test(100, 100, 0.05).unwrap(), TestOutcome::NotApplicable);
    }

    #[test]
    fn kupiec_invalid_inputs_fail_fast() {
        assert!(kupiec_test(0, 0, 0.05).is_err());
        assert!(kupiec_test(10, 2, 0.0).is_err());
        assert!(kupiec_test(10, 2, 1.0).is_err());
        assert!(kupiec_test(10, 11, 0.05).is_err());
    }

    #[test]
    fn christoffersen_flags_clustered_violations() {
        // Violations in one tight cluster vs the same count spread out.
        let mut clustered = vec![false; 100];
        for slot in clustered.iter_mut().skip(40).take(8) {
            *slot = true;
        }
        let mut spread = vec![false; 100];
        for i in (5..100).step_by(12) {
            spread[i] = true;
        }

        let c = christoffersen_test(&clustered);
        let s = christoffersen_test(&spread);
        assert!(c.statistic().unwrap() > s.statistic().unwrap());
        assert!(c.p_value().unwrap() < 0.05);
    }

    #[test]
    fn christoffersen_degenerate_sequences_are_not_applicable() {
        assert_eq!(christoffersen_test(&[false; 50]), TestOutcome::NotApplicable);
        // A violation on the first date only: the chain never re-enters the
        // violation state, so no 0->1 or 1->1 transition exists.
        let mut first = vec![false; 50];
        first[0] = true;
        assert_eq!(christoffersen_test(&first), TestOutcome::NotApplicable);
        assert_eq!(christoffersen_test(&[]), TestOutcome::NotApplicable);
        assert_eq!(christoffersen_test(&[true]), TestOutcome::NotApplicable);
        assert_eq!(christoffersen_test(&[true; 50]), TestOutcome::NotApplicable);
    }

    #[test]
    fn joint_is_exactly_the_sum_of_parts() {
        let mut indicator = vec![false; 200];
        for i in (10..200).step_by(21) {
            indicator[i] = true;
        }
        let n = indicator.iter().filter(|&&b| b).count();
        let k = kupiec_test(indicator.len(), n, 0.05).unwrap();
        let c = christoffersen_test(&indicator);
        let j = joint_test(&k, &c);
        let expected = k.statistic().unwrap() + c.statistic().unwrap();
        assert!((j.statistic().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn joint_requires_both_components() {
        let k = kupiec_test(100, 0, 0.05).unwrap();
        let c = christoffersen_test(&[false; 100]);
        assert_eq!(joint_test(&k, &c), TestOutcome::NotApplicable);
    }

    #[test]
    fn expected_shortfall_over_violations_only() {
        let returns = vec![-0.03, 0.01, -0.05, 0.02];
        let var = vec![2.0, 2.0, 2.0, 2.0];
        let ind = violations(&returns, &var);
        assert_eq!(ind, vec![true, false, true, false]);
        let (mean, max) = expected_shortfall(&returns, &var, &ind);
        // Excess losses: 3-2=1 and 5-2=3.
        assert!((mean.unwrap() - 2.0).abs() < 1e-9);
        assert!((max.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn expected_shortfall_without_violations_is_not_applicable() {
        let returns = vec![0.01, -0.005, 0.002];
        let var = vec![5.0, 5.0, 5.0];
        let ind = violations(&returns, &var);
        let (mean, max) = expected_shortfall(&returns, &var, &ind);
        assert!(mean.is_none());
        assert!(max.is_none());
    }

    #[test]
    fn violation_requires_strict_exceedance() {
        // Loss exactly equal to VaR is not a breach.
        let returns = vec![-0.02];
        let var = vec![2.0];
        assert_eq!(violations(&returns, &var), vec![false]);
    }

    #[test]
    fn max_drawdown_of_monotone_growth_is_zero() {
        let returns = vec![0.01; 20];
        assert_eq!(max_drawdown(&returns), 0.0);
    }

    #[test]
    fn max_drawdown_matches_hand_computation() {
        // 1.0 -> 1.1 -> 0.88 -> 0.968: trough is 20% below the 1.1 peak.
        let returns = vec![0.10, -0.20, 0.10];
        let dd = max_drawdown(&returns);
        assert!((dd - (-20.0)).abs() < 1e-9);
    }
}
