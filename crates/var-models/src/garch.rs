use risk_core::{DatedSeries, Result, RiskError};
use statrs::statistics::Statistics;

use crate::historical::validate;
use crate::vol::normal_ppf;

/// GARCH(1,1) conditional-variance filter (Bollerslev 1986):
///
///   sigma2_t = omega + arch * eps_{t-1}^2 + garch * sigma2_{t-1}
///
/// with eps_t = r_t - mu and the stationarity constraint arch + garch < 1.
#[derive(Debug, Clone)]
pub struct Garch11 {
    pub omega: f64,
    pub arch: f64,
    pub garch: f64,
    pub mu: f64,
}

impl Garch11 {
    pub fn new(omega: f64, arch: f64, garch: f64, mu: f64) -> Result<Self> {
        if omega < 0.0 || arch < 0.0 || garch < 0.0 {
            return Err(RiskError::InvalidInput(
                "GARCH parameters must be non-negative".to_string(),
            ));
        }
        if arch + garch >= 1.0 {
            return Err(RiskError::InvalidInput(format!(
                "covariance stationarity requires arch + garch < 1, got {} + {}",
                arch, garch
            )));
        }
        Ok(Self { omega, arch, garch, mu })
    }

    /// Fit by variance targeting: arch and garch are fixed at conventional
    /// daily-equity values and omega is pinned so the long-run variance
    /// equals the sample variance.
    pub fn fit(returns: &[f64], arch: f64, garch: f64) -> Result<Self> {
        if returns.len() < 2 {
            return Err(RiskError::InsufficientData(
                "need at least 2 returns to fit GARCH".to_string(),
            ));
        }
        let mu = returns.mean();
        let sample_var = returns.variance();
        let omega = (1.0 - arch - garch) * sample_var;
        Self::new(omega, arch, garch, mu)
    }

    /// Long-run (unconditional) variance omega / (1 - arch - garch).
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.arch - self.garch)
    }

    /// One-step-ahead conditional sigma for each observation. The value at
    /// `t` is built from information through `t-1`, so the output can be
    /// backtested against the same return series.
    pub fn conditional_sigma(&self, returns: &[f64]) -> Vec<f64> {
        let mut sigma2 = self.long_run_variance();
        let mut prev_eps = 0.0;
        let mut out = Vec::with_capacity(returns.len());
        for &r in returns {
            sigma2 = self.omega + self.arch * prev_eps * prev_eps + self.garch * sigma2;
            out.push(sigma2.sqrt());
            prev_eps = r - self.mu;
        }
        out
    }

    /// Per-date parametric VaR series from the conditional sigma path.
    pub fn var_series(&self, returns: &DatedSeries, alpha: f64) -> Result<DatedSeries> {
        validate(&returns.values, alpha)?;
        let z = normal_ppf(alpha);
        let values = self
            .conditional_sigma(&returns.values)
            .into_iter()
            .map(|sigma| -(self.mu + sigma * z) * 100.0)
            .collect();
        DatedSeries::new(returns.dates.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> DatedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        DatedSeries::new(dates, values).unwrap()
    }

    #[test]
    fn rejects_non_stationary_parameters() {
        assert!(Garch11::new(1e-6, 0.5, 0.6, 0.0).is_err());
        assert!(Garch11::new(-1e-6, 0.1, 0.8, 0.0).is_err());
    }

    #[test]
    fn long_run_variance_matches_sample_variance_under_targeting() {
        let returns: Vec<f64> = (0..200).map(|i| 0.01 * ((i % 11) as f64 - 5.0)).collect();
        let model = Garch11::fit(&returns, 0.08, 0.90).unwrap();
        let sample_var = returns.variance();
        assert!((model.long_run_variance() - sample_var).abs() < 1e-12);
    }

    #[test]
    fn sigma_rises_after_a_shock() {
        let mut returns = vec![0.001; 100];
        returns[50] = -0.10;
        let model = Garch11::fit(&returns, 0.08, 0.90).unwrap();
        let sigma = model.conditional_sigma(&returns);
        // The shock at t=50 feeds the variance update at t=51.
        assert!(sigma[51] > sigma[50]);
    }

    #[test]
    fn var_series_is_aligned_and_positive() {
        let returns = series((0..120).map(|i| 0.012 * ((i % 7) as f64 - 3.0)).collect());
        let model = Garch11::fit(&returns.values, 0.08, 0.90).unwrap();
        let var = model.var_series(&returns, 0.05).unwrap();
        assert_eq!(var.len(), returns.len());
        assert!(var.values.iter().all(|&v| v > 0.0));
    }
}
