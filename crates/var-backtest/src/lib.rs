pub mod basel;
pub mod engine;
pub mod models;
pub mod ranking;
pub mod statistical;

#[cfg(test)]
mod tests;

pub use basel::{classify_zone, zone_thresholds};
pub use engine::{backtest_one, run_backtests, BacktestOutcome};
pub use models::*;
pub use ranking::{rank_records, winners_from_ranked};
pub use statistical::{
    christoffersen_test, expected_shortfall, joint_test, kupiec_test, max_drawdown, violations,
};
