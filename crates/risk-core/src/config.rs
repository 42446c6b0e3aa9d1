use serde::{Deserialize, Serialize};

/// Annualization convention for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Regime cutoffs over the risk-signal index and annualized volatility
/// (in percent). Applied as an ordered cascade, Crisis checked first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// Signal level at or above which Tension starts (default 150).
    pub signal_tension: f64,
    /// Signal level at or above which Crisis starts (default 250).
    pub signal_crisis: f64,
    /// Annualized vol (percent) at or above which Tension starts (default 20).
    pub vol_tension: f64,
    /// Annualized vol (percent) at or above which Crisis starts (default 30).
    pub vol_crisis: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            signal_tension: 150.0,
            signal_crisis: 250.0,
            vol_tension: 20.0,
            vol_crisis: 30.0,
        }
    }
}

/// Parameters of the simulated geopolitical-risk (GPR) index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Rolling window (days) for the realized-volatility base.
    pub vol_window: usize,
    /// Index level assigned where the index is undefined (warm-up, smoothing edges).
    pub baseline: f64,
    /// Z-score amplitude: one standard deviation of vol moves the index by this much.
    pub zscore_amplitude: f64,
    /// Multiplier applied on days where |return| exceeds 3 sample standard deviations.
    pub extreme_multiplier: f64,
    /// Centered smoothing window (days).
    pub smoothing_window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            vol_window: 30,
            baseline: 100.0,
            zscore_amplitude: 50.0,
            extreme_multiplier: 1.5,
            smoothing_window: 5,
        }
    }
}

/// Parameters of the regime-conditional VaR estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeVarConfig {
    /// Minimum observations in a regime before its own (mean, std) are used.
    pub min_regime_sample: usize,
    /// Per-regime std inflation applied in the fallback: sigma * (1 + step * code).
    pub fallback_inflation_step: f64,
    /// Signal level treated as neutral (factor 1.0).
    pub signal_baseline: f64,
    /// Divisor converting signal excess into a multiplicative std adjustment.
    pub signal_scale: f64,
}

impl Default for RegimeVarConfig {
    fn default() -> Self {
        Self {
            min_regime_sample: 30,
            fallback_inflation_step: 0.5,
            signal_baseline: 100.0,
            signal_scale: 500.0,
        }
    }
}

/// Backtest-wide settings: significance level and Basel zone quantiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Significance level for Kupiec/Christoffersen/joint verdicts.
    pub significance: f64,
    /// Binomial quantile bounding the green zone (Basel standard: 0.95).
    pub green_quantile: f64,
    /// Binomial quantile bounding the yellow zone (Basel standard: 0.9999).
    pub yellow_quantile: f64,
    /// Rolling window for realized volatility used by regime classification.
    pub vol_window: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            green_quantile: 0.95,
            yellow_quantile: 0.9999,
            vol_window: 30,
        }
    }
}
