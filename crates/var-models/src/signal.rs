use risk_core::{DatedSeries, Result, SignalConfig};
use statrs::statistics::Statistics;

use crate::vol::rolling_volatility;

/// Build the simulated geopolitical-risk (GPR) index from a return series.
///
/// The index is the z-score of rolling annualized volatility rescaled around
/// `baseline`, amplified on extreme-move days (|r| beyond 3 standard
/// deviations) and smoothed with a centered rolling mean. Dates where the
/// pipeline is undefined (warm-up, smoothing edges) take the baseline level.
///
/// In production this would be replaced by the Caldara-Iacoviello GPR data;
/// the synthetic index keeps the same scale (neutral = 100).
pub fn build_signal_index(returns: &DatedSeries, cfg: &SignalConfig) -> Result<DatedSeries> {
    let n = returns.len();
    let vol = rolling_volatility(&returns.values, cfg.vol_window);

    let defined: Vec<f64> = vol.iter().filter_map(|v| *v).collect();
    let (vol_mean, vol_std) = if defined.is_empty() {
        (0.0, 0.0)
    } else {
        (defined.as_slice().mean(), defined.as_slice().std_dev())
    };

    // Z-score of rolling vol, rescaled around the baseline.
    let mut raw: Vec<Option<f64>> = vol
        .iter()
        .map(|v| {
            v.map(|v| {
                if vol_std > 0.0 {
                    (v - vol_mean) / vol_std * cfg.zscore_amplitude + cfg.baseline
                } else {
                    cfg.baseline
                }
            })
        })
        .collect();

    // Amplification on extreme-move days.
    let ret_std = returns.values.as_slice().std_dev();
    if ret_std > 0.0 {
        for (i, &r) in returns.values.iter().enumerate() {
            if r.abs() > 3.0 * ret_std {
                if let Some(v) = raw[i].as_mut() {
                    *v *= cfg.extreme_multiplier;
                }
            }
        }
    }

    // Centered smoothing; undefined unless the whole window is populated.
    let half = cfg.smoothing_window / 2;
    let mut smoothed = vec![None; n];
    for i in 0..n {
        if i < half || i + half >= n {
            continue;
        }
        let window = &raw[i - half..=i + half];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().map(|v| v.unwrap()).sum();
            smoothed[i] = Some(sum / window.len() as f64);
        }
    }

    let values = smoothed
        .into_iter()
        .map(|v| v.unwrap_or(cfg.baseline))
        .collect();
    DatedSeries::new(returns.dates.clone(), values)
}
