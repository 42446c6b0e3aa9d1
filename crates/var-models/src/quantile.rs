use risk_core::{DatedSeries, Result};
use statrs::statistics::Statistics;

use crate::historical::{historical_var, validate};

/// Linear quantile regression VaR.
///
/// Fits q_t = w . x_t by subgradient descent on the pinball loss at level
/// `alpha`, with features x_t = [1, rolling daily vol through t-1, |r_{t-1}|].
/// The fitted conditional quantile is flipped into a per-date VaR series;
/// warm-up dates where the feature window is not populated fall back to the
/// unconditional historical VaR. Fully deterministic.
pub fn quantile_regression_var(
    returns: &DatedSeries,
    alpha: f64,
    window: usize,
) -> Result<DatedSeries> {
    validate(&returns.values, alpha)?;
    let n = returns.len();
    let fallback = historical_var(&returns.values, alpha)?;

    // Feature rows only exist once `window` past returns are available.
    let mut rows: Vec<([f64; 3], f64)> = Vec::new();
    let mut feature_at: Vec<Option<[f64; 3]>> = vec![None; n];
    for t in window..n {
        let past = &returns.values[t - window..t];
        let vol = past.std_dev();
        let x = [1.0, vol, returns.values[t - 1].abs()];
        feature_at[t] = Some(x);
        rows.push((x, returns.values[t]));
    }

    if rows.is_empty() {
        let values = vec![fallback; n];
        return DatedSeries::new(returns.dates.clone(), values);
    }

    let w = fit_pinball(&rows, alpha, 400, 0.05);

    let values = (0..n)
        .map(|t| match feature_at[t] {
            Some(x) => -(w[0] * x[0] + w[1] * x[1] + w[2] * x[2]) * 100.0,
            None => fallback,
        })
        .collect();
    DatedSeries::new(returns.dates.clone(), values)
}

/// Minimize the mean pinball loss sum_t rho_alpha(y_t - w.x_t) by
/// subgradient descent. The intercept starts at the unconditional empirical
/// quantile so the descent only has to learn the conditional tilt.
fn fit_pinball(rows: &[([f64; 3], f64)], alpha: f64, iterations: usize, lr: f64) -> [f64; 3] {
    let mut targets: Vec<f64> = rows.iter().map(|(_, y)| *y).collect();
    targets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q0 = targets[((alpha * targets.len() as f64) as usize).min(targets.len() - 1)];

    let n = rows.len() as f64;
    let mut w = [q0, 0.0, 0.0];
    for _ in 0..iterations {
        let mut grad = [0.0f64; 3];
        for (x, y) in rows {
            let u = y - (w[0] * x[0] + w[1] * x[1] + w[2] * x[2]);
            // d rho/d pred: -alpha below the residual, (1-alpha) above.
            let g = if u >= 0.0 { -alpha } else { 1.0 - alpha };
            for k in 0..3 {
                grad[k] += g * x[k];
            }
        }
        for k in 0..3 {
            w[k] -= lr * grad[k] / n;
        }
    }
    w
}
