use var_backtest::{RankedRecord, WinnerRecord};

use crate::fmt_opt;

const RANKED_HEADER: &str =
    "portfolio,alpha,model,hit_rate,breaches,T,Kupiec_p,Christoff_p,Joint_p,ES_realised,zone,rank_avg";

const WINNERS_HEADER: &str = "portfolio,alpha,winner_model,Joint_p,breaches,T,zone,rank_avg";

/// Full ranked comparison table, one row per (portfolio, alpha, model).
pub fn ranked_csv(ranked: &[RankedRecord]) -> String {
    let mut out = String::from(RANKED_HEADER);
    out.push('\n');
    for entry in ranked {
        let r = &entry.record;
        out.push_str(&format!(
            "{},{},{},{:.4},{},{},{},{},{},{},{},{:.1}\n",
            field(&r.portfolio),
            r.alpha,
            field(&r.model),
            r.hit_rate,
            r.breaches,
            r.sample_size,
            fmt_opt(r.kupiec.p_value(), 4),
            fmt_opt(r.christoffersen.p_value(), 4),
            fmt_opt(r.joint.p_value(), 4),
            fmt_opt(r.es_mean, 2),
            r.zone.label(),
            entry.rank_avg,
        ));
    }
    out
}

/// Winning model per (portfolio, alpha).
pub fn winners_csv(winners: &[WinnerRecord]) -> String {
    let mut out = String::from(WINNERS_HEADER);
    out.push('\n');
    for w in winners {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{:.1}\n",
            field(&w.portfolio),
            w.alpha,
            field(&w.winner_model),
            fmt_opt(w.joint_p, 4),
            w.breaches,
            w.sample_size,
            w.zone.label(),
            w.rank_avg,
        ));
    }
    out
}

/// Quote a field only when it would break the row.
fn field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
