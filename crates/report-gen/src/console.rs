use var_backtest::RankedRecord;

use crate::fmt_opt;

/// Fixed-width comparison table for terminal output, grouped by
/// (portfolio, alpha) with the group's best model first.
pub fn render_comparison(ranked: &[RankedRecord], significance: f64) -> String {
    let mut out = String::new();
    let mut current_group: Option<(String, f64)> = None;

    for entry in ranked {
        let r = &entry.record;
        let group = (r.portfolio.clone(), r.alpha);
        if current_group.as_ref() != Some(&group) {
            if current_group.is_some() {
                out.push('\n');
            }
            out.push_str(&format!(
                "{} @ alpha = {:.0}%\n",
                r.portfolio,
                r.alpha * 100.0
            ));
            out.push_str(&format!(
                "{:<10} {:>6} {:>8} {:>9} {:>9} {:>9} {:>10} {:>7} {:>9} {:>9}\n",
                "model", "T", "breach", "hit_rate", "Kupiec_p", "Joint_p", "verdict", "zone", "ES_mean", "rank_avg"
            ));
            out.push_str(&format!("{}\n", "-".repeat(95)));
            current_group = Some(group);
        }

        out.push_str(&format!(
            "{:<10} {:>6} {:>8} {:>8.2}% {:>9} {:>9} {:>10} {:>7} {:>9} {:>9.1}\n",
            r.model,
            r.sample_size,
            r.breaches,
            r.hit_rate * 100.0,
            fmt_opt(r.kupiec.p_value(), 4),
            fmt_opt(r.joint.p_value(), 4),
            r.joint.verdict(significance),
            r.zone.label(),
            fmt_opt(r.es_mean, 2),
            entry.rank_avg,
        ));
    }
    out
}
