use rayon::prelude::*;
use risk_core::{BacktestConfig, Result};
use tracing::{info, warn};

use crate::basel::classify_zone;
use crate::models::{BacktestRecord, BacktestRequest, RunFailure};
use crate::statistical::{
    christoffersen_test, expected_shortfall, joint_test, kupiec_test, max_drawdown, violations,
};

/// Records plus isolated per-tuple failures from one batch run.
#[derive(Debug)]
pub struct BacktestOutcome {
    pub records: Vec<BacktestRecord>,
    pub failures: Vec<RunFailure>,
}

/// Backtest a single (portfolio, alpha, model) tuple.
///
/// The VaR estimate is aligned against the return index, the violation
/// indicator is rebuilt from scratch, and all tests run over the aligned
/// window. A pure function of its inputs.
pub fn backtest_one(request: &BacktestRequest, config: &BacktestConfig) -> Result<BacktestRecord> {
    let aligned = request.var.align_with(&request.returns)?;
    let returns = &aligned.left;
    let var = &aligned.right;

    let indicator = violations(returns, var);
    let sample_size = indicator.len();
    let breaches = indicator.iter().filter(|&&hit| hit).count();

    let kupiec = kupiec_test(sample_size, breaches, request.alpha)?;
    let christoffersen = christoffersen_test(&indicator);
    let joint = joint_test(&kupiec, &christoffersen);
    let (es_mean, es_max) = expected_shortfall(returns, var, &indicator);
    let zone = classify_zone(breaches, sample_size, request.alpha, config)?;

    Ok(BacktestRecord {
        portfolio: request.portfolio.clone(),
        alpha: request.alpha,
        model: request.model.clone(),
        sample_size,
        breaches,
        hit_rate: breaches as f64 / sample_size as f64,
        kupiec,
        christoffersen,
        joint,
        es_mean,
        es_max,
        max_drawdown: max_drawdown(returns),
        zone,
    })
}

/// Run a batch of tuples. Tuples are independent, so the map is parallel;
/// collection preserves input order, so results do not depend on the
/// parallelism degree. One tuple's failure is logged and isolated, the rest
/// of the batch proceeds.
pub fn run_backtests(requests: &[BacktestRequest], config: &BacktestConfig) -> BacktestOutcome {
    let results: Vec<(usize, Result<BacktestRecord>)> = requests
        .par_iter()
        .enumerate()
        .map(|(i, req)| (i, backtest_one(req, config)))
        .collect();

    let mut records = Vec::with_capacity(requests.len());
    let mut failures = Vec::new();
    for (i, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                let req = &requests[i];
                warn!(
                    portfolio = %req.portfolio,
                    alpha = req.alpha,
                    model = %req.model,
                    error = %e,
                    "backtest tuple failed, continuing with the rest"
                );
                failures.push(RunFailure {
                    portfolio: req.portfolio.clone(),
                    alpha: req.alpha,
                    model: req.model.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        total = requests.len(),
        succeeded = records.len(),
        failed = failures.len(),
        "backtest batch complete"
    );
    BacktestOutcome { records, failures }
}
