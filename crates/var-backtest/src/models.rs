use risk_core::{DatedSeries, VarEstimate};
use serde::{Deserialize, Serialize};

/// Result of a likelihood-ratio test. Degenerate data (no violations, all
/// violations, no relevant transitions) yields `NotApplicable`, which is a
/// legitimate outcome carried through to reporting, never coerced to a
/// number or a pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Defined { statistic: f64, p_value: f64 },
    NotApplicable,
}

impl TestOutcome {
    pub fn statistic(&self) -> Option<f64> {
        match self {
            TestOutcome::Defined { statistic, .. } => Some(*statistic),
            TestOutcome::NotApplicable => None,
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        match self {
            TestOutcome::Defined { p_value, .. } => Some(*p_value),
            TestOutcome::NotApplicable => None,
        }
    }

    /// Accepted iff p >= significance; None when the test is not applicable.
    pub fn accepted(&self, significance: f64) -> Option<bool> {
        self.p_value().map(|p| p >= significance)
    }

    /// Report label: "accepted" / "rejected" / "n/a".
    pub fn verdict(&self, significance: f64) -> &'static str {
        match self.accepted(significance) {
            Some(true) => "accepted",
            Some(false) => "rejected",
            None => "n/a",
        }
    }
}

/// Basel traffic-light zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselZone {
    Green,
    Yellow,
    Red,
}

impl BaselZone {
    pub fn label(&self) -> &'static str {
        match self {
            BaselZone::Green => "green",
            BaselZone::Yellow => "yellow",
            BaselZone::Red => "red",
        }
    }
}

/// One (portfolio, alpha, model) tuple to backtest.
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub portfolio: String,
    pub alpha: f64,
    pub model: String,
    pub returns: DatedSeries,
    pub var: VarEstimate,
}

/// Immutable result of backtesting one tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRecord {
    pub portfolio: String,
    pub alpha: f64,
    pub model: String,
    /// T: number of aligned observations.
    pub sample_size: usize,
    /// N: number of violations.
    pub breaches: usize,
    /// N / T as a fraction, comparable to alpha directly.
    pub hit_rate: f64,
    pub kupiec: TestOutcome,
    pub christoffersen: TestOutcome,
    pub joint: TestOutcome,
    /// Mean excess loss over violated dates; None with zero violations.
    pub es_mean: Option<f64>,
    /// Max excess loss over violated dates; None with zero violations.
    pub es_max: Option<f64>,
    /// Max drawdown of the aligned return window, percent (<= 0).
    pub max_drawdown: f64,
    pub zone: BaselZone,
}

impl BacktestRecord {
    /// Absolute deviation of the observed hit rate from the target.
    pub fn hit_deviation(&self) -> f64 {
        (self.hit_rate - self.alpha).abs()
    }
}

/// A record with its composite rank within a (portfolio, alpha) group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: BacktestRecord,
    /// Average of the joint-p-value rank and the hit-deviation rank;
    /// lower is better.
    pub rank_avg: f64,
}

/// The winning model for one (portfolio, alpha).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub portfolio: String,
    pub alpha: f64,
    pub winner_model: String,
    pub joint_p: Option<f64>,
    pub breaches: usize,
    pub sample_size: usize,
    pub zone: BaselZone,
    pub rank_avg: f64,
}

/// One tuple that could not be backtested; the rest of the batch proceeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    pub portfolio: String,
    pub alpha: f64,
    pub model: String,
    pub error: String,
}
