use risk_core::{DatedSeries, Regime, RegimeVarConfig, Result, RiskError};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::historical::validate;
use crate::vol::normal_ppf;

/// Conditional (mean, std) of returns within one regime.
#[derive(Debug, Clone, Copy)]
pub struct RegimeParams {
    pub mu: f64,
    pub sigma: f64,
    /// True when the regime had too few observations and the unconditional
    /// moments with the inflation factor were used instead.
    pub fallback: bool,
}

/// Estimate per-regime moments. A regime with at most `min_regime_sample`
/// observations falls back to the unconditional mean and an inflated
/// unconditional std (more inflation for higher-severity regimes); that is a
/// local recovery, not a failure.
pub fn regime_parameters(
    returns: &[f64],
    regimes: &[Regime],
    cfg: &RegimeVarConfig,
) -> Result<[RegimeParams; 3]> {
    if returns.is_empty() {
        return Err(RiskError::InvalidInput("empty return series".to_string()));
    }
    if returns.len() != regimes.len() {
        return Err(RiskError::InvalidInput(format!(
            "returns and regimes have different lengths: {} vs {}",
            returns.len(),
            regimes.len()
        )));
    }

    let uncond_mu = returns.mean();
    let uncond_sigma = if returns.len() > 1 { returns.std_dev() } else { 0.0 };

    let mut out = [RegimeParams { mu: 0.0, sigma: 0.0, fallback: true }; 3];
    for regime in Regime::ALL {
        let subset: Vec<f64> = returns
            .iter()
            .zip(regimes.iter())
            .filter(|(_, &r)| r == regime)
            .map(|(&v, _)| v)
            .collect();

        let slot = (regime.code() - 1) as usize;
        if subset.len() > cfg.min_regime_sample {
            out[slot] = RegimeParams {
                mu: subset.as_slice().mean(),
                sigma: subset.as_slice().std_dev(),
                fallback: false,
            };
        } else {
            debug!(
                regime = regime.name(),
                observations = subset.len(),
                "too few observations, using inflated unconditional moments"
            );
            out[slot] = RegimeParams {
                mu: uncond_mu,
                sigma: uncond_sigma
                    * (1.0 + cfg.fallback_inflation_step * regime.code() as f64),
                fallback: true,
            };
        }
    }
    Ok(out)
}

/// Regime-conditional VaR adjusted by the risk-signal level:
///
///   factor_t = 1 + (signal_t - baseline) / scale
///   VaR_t    = -(mu_r + sigma_r * factor_t * z_alpha) * 100
///
/// One batch map over the aligned (regime, signal) rows.
pub fn geopolitical_var(
    returns: &DatedSeries,
    signal: &DatedSeries,
    regimes: &[Regime],
    alpha: f64,
    cfg: &RegimeVarConfig,
) -> Result<DatedSeries> {
    validate(&returns.values, alpha)?;
    if signal.len() != returns.len() || regimes.len() != returns.len() {
        return Err(RiskError::InvalidInput(
            "returns, signal and regimes must share one index".to_string(),
        ));
    }

    let params = regime_parameters(&returns.values, regimes, cfg)?;
    let z = normal_ppf(alpha);

    let values = regimes
        .iter()
        .zip(signal.values.iter())
        .map(|(regime, &s)| {
            let p = params[(regime.code() - 1) as usize];
            let factor = 1.0 + (s - cfg.signal_baseline) / cfg.signal_scale;
            -(p.mu + p.sigma * factor * z) * 100.0
        })
        .collect();
    DatedSeries::new(returns.dates.clone(), values)
}
