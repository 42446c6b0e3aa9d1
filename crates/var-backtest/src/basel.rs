use risk_core::{BacktestConfig, Result, RiskError};
use statrs::distribution::{Binomial, DiscreteCDF};

use crate::models::BaselZone;

/// Green/yellow boundary counts for a sample of size T at exceedance
/// probability alpha, from the Binomial(T, alpha) quantile function. The
/// boundaries adapt to T; at T = 250, alpha = 1% they reproduce the accord's
/// 4-exception green band and 9-exception yellow band.
pub fn zone_thresholds(
    sample_size: usize,
    alpha: f64,
    config: &BacktestConfig,
) -> Result<(u64, u64)> {
    if sample_size == 0 {
        return Err(RiskError::InvalidInput(
            "sample size must be positive".to_string(),
        ));
    }
    let binom = Binomial::new(alpha, sample_size as u64).map_err(|e| {
        RiskError::InvalidInput(format!("invalid binomial parameters: {e}"))
    })?;
    // inverse_cdf returns the smallest count whose cumulative probability
    // reaches the quantile; that count is the first one *outside* the zone.
    let green = binom.inverse_cdf(config.green_quantile).saturating_sub(1);
    let yellow = binom
        .inverse_cdf(config.yellow_quantile)
        .saturating_sub(1)
        .max(green);
    Ok((green, yellow))
}

/// Traffic-light classification of an observed violation count.
pub fn classify_zone(
    breaches: usize,
    sample_size: usize,
    alpha: f64,
    config: &BacktestConfig,
) -> Result<BaselZone> {
    let (green, yellow) = zone_thresholds(sample_size, alpha, config)?;
    let n = breaches as u64;
    Ok(if n <= green {
        BaselZone::Green
    } else if n <= yellow {
        BaselZone::Yellow
    } else {
        BaselZone::Red
    })
}
