use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// A date-indexed series of f64 values, chronologically ordered with no
/// duplicate dates. Used for returns, risk-signal indices and per-date VaR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl DatedSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(RiskError::InvalidInput(format!(
                "index/value length mismatch: {} dates vs {} values",
                dates.len(),
                values.len()
            )));
        }
        if dates.is_empty() {
            return Err(RiskError::InvalidInput("empty series".to_string()));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RiskError::InvalidInput(
                "dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { dates, values })
    }

    /// Fractional returns from a price series: r_t = p_t / p_{t-1} - 1.
    /// The first observation has no return and is dropped.
    pub fn returns_from_prices(prices: &DatedSeries) -> Result<Self> {
        if prices.len() < 2 {
            return Err(RiskError::InvalidInput(
                "need at least 2 prices to compute returns".to_string(),
            ));
        }
        if prices.values.iter().any(|&p| p <= 0.0) {
            return Err(RiskError::InvalidInput(
                "prices must be strictly positive".to_string(),
            ));
        }
        let dates = prices.dates[1..].to_vec();
        let values = prices
            .values
            .windows(2)
            .map(|w| w[1] / w[0] - 1.0)
            .collect();
        DatedSeries::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restrict two series to their common dates, preserving order.
    /// Both inputs are sorted, so a two-pointer merge suffices.
    pub fn align(&self, other: &DatedSeries) -> Result<AlignedPair> {
        let mut dates = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.len() && j < other.len() {
            match self.dates[i].cmp(&other.dates[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dates.push(self.dates[i]);
                    left.push(self.values[i]);
                    right.push(other.values[j]);
                    i += 1;
                    j += 1;
                }
            }
        }
        if dates.is_empty() {
            return Err(RiskError::InvalidInput(
                "series have no overlapping dates".to_string(),
            ));
        }
        Ok(AlignedPair { dates, left, right })
    }
}

/// Two series restricted to their shared dates.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

/// A VaR estimate: either one threshold applied uniformly, or a per-date
/// series aligned against the return index at backtest time. Always a loss
/// magnitude in percent of capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VarEstimate {
    Scalar(f64),
    Series(DatedSeries),
}

impl VarEstimate {
    /// Materialize against a return series, restricting both to common dates.
    pub fn align_with(&self, returns: &DatedSeries) -> Result<AlignedPair> {
        match self {
            VarEstimate::Scalar(v) => Ok(AlignedPair {
                dates: returns.dates.clone(),
                left: returns.values.clone(),
                right: vec![*v; returns.len()],
            }),
            VarEstimate::Series(series) => returns.align(series),
        }
    }
}

/// Market regime derived from rolling volatility and the risk-signal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Calm,
    Tension,
    Crisis,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Calm, Regime::Tension, Regime::Crisis];

    /// Numeric code used in reports and in the crisis inflation factor.
    pub fn code(&self) -> u8 {
        match self {
            Regime::Calm => 1,
            Regime::Tension => 2,
            Regime::Crisis => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Regime::Calm => "Calm",
            Regime::Tension => "Tension",
            Regime::Crisis => "Crisis",
        }
    }
}
