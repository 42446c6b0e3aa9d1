use risk_core::{Result, RiskError};

/// Historical-simulation VaR: the empirical `alpha`-quantile of returns,
/// sign-flipped into a loss threshold in percent.
pub fn historical_var(returns: &[f64], alpha: f64) -> Result<f64> {
    validate(returns, alpha)?;

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let idx = ((alpha * sorted.len() as f64) as usize).min(sorted.len() - 1);
    Ok(-sorted[idx] * 100.0)
}

pub(crate) fn validate(returns: &[f64], alpha: f64) -> Result<()> {
    if returns.is_empty() {
        return Err(RiskError::InvalidInput("empty return series".to_string()));
    }
    if alpha <= 0.0 || alpha >= 1.0 {
        return Err(RiskError::InvalidInput(format!(
            "exceedance probability must be in (0, 1), got {alpha}"
        )));
    }
    Ok(())
}
