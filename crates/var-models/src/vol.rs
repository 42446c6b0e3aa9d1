use risk_core::TRADING_DAYS_PER_YEAR;
use statrs::statistics::Statistics;

/// Rolling realized volatility, annualized and expressed in percent.
///
/// Entry `t` covers the `window` returns ending at `t` (inclusive); entries
/// where the window is not yet fully populated are `None`.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; returns.len()];
    if window < 2 || returns.len() < window {
        return out;
    }
    for t in (window - 1)..returns.len() {
        let slice = &returns[t + 1 - window..=t];
        out[t] = Some(slice.std_dev() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0);
    }
    out
}

/// Inverse standard normal CDF at probability `p`.
pub(crate) fn normal_ppf(p: f64) -> f64 {
    use statrs::distribution::{ContinuousCDF, Normal};
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.inverse_cdf(p)
}
