use std::collections::BTreeMap;

use crate::models::{BacktestRecord, RankedRecord, WinnerRecord};

/// Composite ranking of models within each (portfolio, alpha) group.
///
/// Two criteria are ranked independently: joint p-value (higher is better,
/// not-applicable sorts last) and absolute hit-rate deviation from alpha
/// (lower is better). `rank_avg` is their mean; the final order within a
/// group is ascending rank_avg, ties broken by higher joint p-value and then
/// model name, so the order is total and deterministic. Each model appears
/// exactly once per group.
pub fn rank_records(records: Vec<BacktestRecord>) -> Vec<RankedRecord> {
    let mut groups: BTreeMap<(String, String), Vec<BacktestRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.portfolio.clone(), alpha_key(record.alpha)))
            .or_default()
            .push(record);
    }

    let mut out = Vec::new();
    for (_, mut group) in groups {
        // Stable base order by model name before criterion sorts.
        group.sort_by(|a, b| a.model.cmp(&b.model));

        let joint_rank = criterion_ranks(&group, |a, b| {
            match (a.joint.p_value(), b.joint.p_value()) {
                (Some(pa), Some(pb)) => pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        let hit_rank = criterion_ranks(&group, |a, b| {
            a.hit_deviation()
                .partial_cmp(&b.hit_deviation())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut ranked: Vec<RankedRecord> = group
            .into_iter()
            .enumerate()
            .map(|(i, record)| RankedRecord {
                record,
                rank_avg: (joint_rank[i] + hit_rank[i]) / 2.0,
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.rank_avg
                .partial_cmp(&b.rank_avg)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| match (a.record.joint.p_value(), b.record.joint.p_value()) {
                    (Some(pa), Some(pb)) => {
                        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
                    }
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.record.model.cmp(&b.record.model))
        });
        out.extend(ranked);
    }
    out
}

/// Top-ranked model per (portfolio, alpha). Input must already be ranked;
/// groups are contiguous and ordered best-first.
pub fn winners_from_ranked(ranked: &[RankedRecord]) -> Vec<WinnerRecord> {
    let mut winners: Vec<WinnerRecord> = Vec::new();
    for entry in ranked {
        let key_taken = winners.iter().any(|w| {
            w.portfolio == entry.record.portfolio
                && alpha_key(w.alpha) == alpha_key(entry.record.alpha)
        });
        if !key_taken {
            winners.push(WinnerRecord {
                portfolio: entry.record.portfolio.clone(),
                alpha: entry.record.alpha,
                winner_model: entry.record.model.clone(),
                joint_p: entry.record.joint.p_value(),
                breaches: entry.record.breaches,
                sample_size: entry.record.sample_size,
                zone: entry.record.zone,
                rank_avg: entry.rank_avg,
            });
        }
    }
    winners
}

/// 1-based ranks for the group's base order under one comparison criterion.
fn criterion_ranks(
    group: &[BacktestRecord],
    cmp: impl Fn(&BacktestRecord, &BacktestRecord) -> std::cmp::Ordering,
) -> Vec<f64> {
    let mut order: Vec<usize> = (0..group.len()).collect();
    order.sort_by(|&a, &b| cmp(&group[a], &group[b]));
    let mut ranks = vec![0.0; group.len()];
    for (rank, &idx) in order.iter().enumerate() {
        ranks[idx] = (rank + 1) as f64;
    }
    ranks
}

/// f64 alpha as a grouping key with stable text form.
fn alpha_key(alpha: f64) -> String {
    format!("{alpha:.6}")
}
