use serde_json::json;
use var_backtest::{BacktestOutcome, BaselZone, WinnerRecord};

/// Structured run summary as a JSON value, suitable for logging or piping
/// into downstream tooling.
pub fn run_summary(outcome: &BacktestOutcome, winners: &[WinnerRecord]) -> serde_json::Value {
    let zone_count = |zone: BaselZone| {
        outcome.records.iter().filter(|r| r.zone == zone).count()
    };

    json!({
        "runs": {
            "total": outcome.records.len() + outcome.failures.len(),
            "succeeded": outcome.records.len(),
            "failed": outcome.failures.len(),
        },
        "zones": {
            "green": zone_count(BaselZone::Green),
            "yellow": zone_count(BaselZone::Yellow),
            "red": zone_count(BaselZone::Red),
        },
        "winners": winners
            .iter()
            .map(|w| {
                json!({
                    "portfolio": w.portfolio,
                    "alpha": w.alpha,
                    "model": w.winner_model,
                    "joint_p": w.joint_p,
                    "zone": w.zone.label(),
                })
            })
            .collect::<Vec<_>>(),
        "failures": outcome.failures
            .iter()
            .map(|f| {
                json!({
                    "portfolio": f.portfolio,
                    "alpha": f.alpha,
                    "model": f.model,
                    "error": f.error,
                })
            })
            .collect::<Vec<_>>(),
    })
}
