pub mod console;
pub mod csv;
pub mod markdown;
pub mod summary;

pub use console::render_comparison;
pub use csv::{ranked_csv, winners_csv};
pub use markdown::render_report;
pub use summary::run_summary;

/// "NA" for a missing statistic, fixed-precision otherwise. Shared by every
/// output surface so a not-applicable test renders identically everywhere.
pub(crate) fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "NA".to_string(),
    }
}
