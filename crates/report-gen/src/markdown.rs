use chrono::NaiveDate;
use var_backtest::{RankedRecord, RunFailure, WinnerRecord};

use crate::fmt_opt;

/// Markdown table with per-column widths computed from the data, so the raw
/// text stays readable without a renderer.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::from("|");
    for (h, w) in headers.iter().zip(widths.iter().copied()) {
        out.push_str(&format!(" {h:<w$} |"));
    }
    out.push_str("\n|");
    for w in &widths {
        out.push_str(&format!("{}|", "-".repeat(w + 2)));
    }
    out.push('\n');
    for row in rows {
        out.push('|');
        for (cell, w) in row.iter().zip(widths.iter().copied()) {
            out.push_str(&format!(" {cell:<w$} |"));
        }
        out.push('\n');
    }
    out
}

/// Full Markdown report: winners per group, the ranked comparison, and any
/// tuples that failed to run.
pub fn render_report(
    ranked: &[RankedRecord],
    winners: &[WinnerRecord],
    failures: &[RunFailure],
    as_of: NaiveDate,
) -> String {
    let mut out = String::new();
    out.push_str("# VaR Model Backtesting Report\n\n");
    out.push_str(&format!("Generated: {as_of}\n\n"));

    out.push_str("## Winning models\n\n");
    let winner_rows: Vec<Vec<String>> = winners
        .iter()
        .map(|w| {
            vec![
                w.portfolio.clone(),
                format!("{:.0}%", w.alpha * 100.0),
                w.winner_model.clone(),
                fmt_opt(w.joint_p, 4),
                w.breaches.to_string(),
                w.sample_size.to_string(),
                w.zone.label().to_string(),
            ]
        })
        .collect();
    out.push_str(&markdown_table(
        &["portfolio", "alpha", "winner", "Joint_p", "breaches", "T", "zone"],
        &winner_rows,
    ));
    out.push('\n');

    out.push_str("## Model comparison\n\n");
    out.push_str(
        "Models ranked within each (portfolio, alpha) by the average of the \
         joint-test p-value rank and the hit-rate deviation rank.\n\n",
    );
    let ranked_rows: Vec<Vec<String>> = ranked
        .iter()
        .map(|entry| {
            let r = &entry.record;
            vec![
                r.portfolio.clone(),
                format!("{:.0}%", r.alpha * 100.0),
                r.model.clone(),
                format!("{:.2}%", r.hit_rate * 100.0),
                r.breaches.to_string(),
                r.sample_size.to_string(),
                fmt_opt(r.kupiec.p_value(), 4),
                fmt_opt(r.christoffersen.p_value(), 4),
                fmt_opt(r.joint.p_value(), 4),
                fmt_opt(r.es_mean, 2),
                r.zone.label().to_string(),
                format!("{:.1}", entry.rank_avg),
            ]
        })
        .collect();
    out.push_str(&markdown_table(
        &[
            "portfolio", "alpha", "model", "hit_rate", "breaches", "T", "Kupiec_p",
            "Christoff_p", "Joint_p", "ES_realised", "zone", "rank_avg",
        ],
        &ranked_rows,
    ));
    out.push('\n');

    if !failures.is_empty() {
        out.push_str("## Failed runs\n\n");
        let failure_rows: Vec<Vec<String>> = failures
            .iter()
            .map(|f| {
                vec![
                    f.portfolio.clone(),
                    format!("{:.0}%", f.alpha * 100.0),
                    f.model.clone(),
                    f.error.clone(),
                ]
            })
            .collect();
        out.push_str(&markdown_table(
            &["portfolio", "alpha", "model", "error"],
            &failure_rows,
        ));
        out.push('\n');
    }

    out.push_str("## Reading the tests\n\n");
    out.push_str(
        "- **Kupiec (POF)**: does the violation frequency match the target rate.\n\
         - **Christoffersen**: are violations independent day to day.\n\
         - **Joint**: both at once; `NA` means the data was too degenerate to test.\n\
         - **Zone**: Basel traffic light from the binomial violation-count bands.\n",
    );
    out
}
