use risk_core::{DatedSeries, Result};
use statrs::statistics::Statistics;

use crate::historical::validate;
use crate::vol::normal_ppf;

/// Variance-covariance VaR under a normal assumption:
/// VaR = -(mu + sigma * z_alpha), in percent.
///
/// A zero-variance series degenerates to -(mu) * 100 rather than failing.
pub fn parametric_var(returns: &[f64], alpha: f64) -> Result<f64> {
    validate(returns, alpha)?;
    let mu = returns.mean();
    let sigma = if returns.len() > 1 { returns.std_dev() } else { 0.0 };
    Ok(-(mu + sigma * normal_ppf(alpha)) * 100.0)
}

/// Variance-covariance VaR with an EWMA conditional variance
/// (RiskMetrics recursion, default lambda 0.94):
///
///   sigma2_t = lambda * sigma2_{t-1} + (1 - lambda) * r_{t-1}^2
///
/// The estimate at `t` uses information through `t-1` only, so the series can
/// be backtested against the same returns. Seeded with the sample variance.
pub fn ewma_var(returns: &DatedSeries, alpha: f64, lambda: f64) -> Result<DatedSeries> {
    validate(&returns.values, alpha)?;
    let mu = returns.values.as_slice().mean();
    let z = normal_ppf(alpha);

    let seed = if returns.len() > 1 {
        returns.values.as_slice().variance()
    } else {
        0.0
    };

    let mut sigma2 = seed;
    let mut values = Vec::with_capacity(returns.len());
    for &r in &returns.values {
        values.push(-(mu + sigma2.sqrt() * z) * 100.0);
        sigma2 = lambda * sigma2 + (1.0 - lambda) * r * r;
    }
    DatedSeries::new(returns.dates.clone(), values)
}
