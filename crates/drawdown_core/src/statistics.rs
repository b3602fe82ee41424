//! Percentiles and summary statistics
//!
//! All percentiles use the nearest-rank definition: the `p`-th percentile of
//! `n` ascending values is the value at 1-based rank `ceil(p / 100 * n)`
//! (clamped to `1..=n`). When ranking trajectories, equal values are ordered
//! by simulation index so the selection never depends on sort stability or
//! thread scheduling.

use crate::model::SummaryStats;

/// Percentiles whose trajectories are kept in full
pub const PATH_PERCENTILES: [u32; 3] = [10, 50, 90];

/// 0-based index into an ascending sequence of length `n` (`n > 0`)
#[must_use]
pub fn nearest_rank_index(n: usize, percentile: f64) -> usize {
    let rank = (percentile * n as f64 / 100.0).ceil() as usize;
    rank.clamp(1, n) - 1
}

/// Nearest-rank percentile of an already sorted slice; 0 for an empty slice
#[must_use]
pub fn percentile_sorted(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[nearest_rank_index(sorted.len(), percentile)]
}

/// Indices of `values` in ascending order, ties broken by index
#[must_use]
pub fn rank_indices(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));
    order
}

/// Index of the element ranked at `percentile`
#[must_use]
pub fn percentile_index(ranked: &[usize], percentile: f64) -> Option<usize> {
    if ranked.is_empty() {
        return None;
    }
    Some(ranked[nearest_rank_index(ranked.len(), percentile)])
}

#[must_use]
pub fn summarize(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    SummaryStats {
        mean: values.iter().sum::<f64>() / values.len() as f64,
        p10: percentile_sorted(&sorted, 10.0),
        p50: percentile_sorted(&sorted, 50.0),
        p90: percentile_sorted(&sorted, 90.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

/// Fraction of rows that stay strictly positive at every timestep
#[must_use]
pub fn success_rate(wealth_paths: &[Vec<f64>]) -> f64 {
    if wealth_paths.is_empty() {
        return 0.0;
    }
    let solvent = wealth_paths
        .iter()
        .filter(|row| row.iter().all(|w| *w > 0.0))
        .count();
    solvent as f64 / wealth_paths.len() as f64
}
