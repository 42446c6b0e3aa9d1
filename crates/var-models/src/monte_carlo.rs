use rand::distributions::Distribution;
use rand::thread_rng;
use rayon::prelude::*;
use risk_core::{Result, RiskError};
use statrs::distribution::Normal;
use statrs::statistics::Statistics;

use crate::historical::validate;

/// Monte-Carlo VaR: draw simulated returns from Normal(mu, sigma) fitted on
/// the sample and take the empirical `alpha`-quantile of the simulated
/// distribution. Draws run in parallel chunks; the quantile of the pooled
/// draws does not depend on chunk order.
///
/// A zero-variance sample degenerates to the parametric answer -(mu) * 100.
pub fn monte_carlo_var(returns: &[f64], alpha: f64, num_simulations: usize) -> Result<f64> {
    validate(returns, alpha)?;
    if num_simulations == 0 {
        return Err(RiskError::InvalidInput(
            "num_simulations must be positive".to_string(),
        ));
    }

    let mu = returns.mean();
    let sigma = if returns.len() > 1 { returns.std_dev() } else { 0.0 };
    if sigma <= 0.0 {
        return Ok(-mu * 100.0);
    }

    let normal = Normal::new(mu, sigma)
        .map_err(|e| RiskError::CalculationError(format!("normal fit failed: {e}")))?;

    const CHUNK: usize = 1024;
    let chunks = (num_simulations + CHUNK - 1) / CHUNK;
    let mut draws: Vec<f64> = (0..chunks)
        .into_par_iter()
        .flat_map_iter(|c| {
            let take = CHUNK.min(num_simulations - c * CHUNK);
            let mut rng = thread_rng();
            (0..take)
                .map(|_| normal.sample(&mut rng))
                .collect::<Vec<f64>>()
        })
        .collect();

    draws.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((alpha * draws.len() as f64) as usize).min(draws.len() - 1);
    Ok(-draws[idx] * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parametric::parametric_var;

    #[test]
    fn agrees_with_parametric_on_normal_data() {
        let returns: Vec<f64> = (0..500).map(|i| 0.01 * (((i * 7) % 13) as f64 - 6.0)).collect();
        let mc = monte_carlo_var(&returns, 0.05, 200_000).unwrap();
        let vc = parametric_var(&returns, 0.05).unwrap();
        // Sampling error at 200k draws is well under a tenth of a percent of capital.
        assert!((mc - vc).abs() < 0.1, "mc={mc} vc={vc}");
    }

    #[test]
    fn zero_variance_is_degenerate_not_an_error() {
        let returns = vec![0.001; 40];
        let var = monte_carlo_var(&returns, 0.05, 1000).unwrap();
        assert!((var - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_simulations() {
        assert!(monte_carlo_var(&[0.01, -0.02], 0.05, 0).is_err());
    }
}
