use core_types::{Horizon, MomentumRecord, StatTable};
use std::cmp::Ordering;

/// Ranks every present value among the present values of the column.
///
/// The rank of a value is its 1-based position in ascending order, tied values
/// sharing the mean of their positions, divided by the number of present
/// values. Results lie in `(0, 1]`. Missing and `NaN` inputs get no rank and do
/// not count towards the population.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.filter(|x| !x.is_nan()).map(|x| (idx, x)))
        .collect();

    let mut ranks = vec![None; values.len()];
    let count = present.len();
    if count == 0 {
        return ranks;
    }

    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut start = 0;
    while start < count {
        let mut end = start + 1;
        while end < count && present[end].1 == present[start].1 {
            end += 1;
        }
        // Positions start+1 ..= end share their mean.
        let mean_position = (start + 1 + end) as f64 / 2.0;
        let percentile = mean_position / count as f64;
        for &(idx, _) in &present[start..end] {
            ranks[idx] = Some(percentile);
        }
        start = end;
    }

    ranks
}

/// Mean of the present values; `None` if there are none.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Compares the percent change over each horizon with every other symbol in
/// `stats` and averages the resulting percentiles.
///
/// One record per row, in the table's symbol order. Records are not sorted by
/// score; see [`leaderboard`].
pub fn momentum_analysis(stats: &StatTable) -> Vec<MomentumRecord> {
    let mut records: Vec<MomentumRecord> = stats
        .symbols()
        .map(|symbol| {
            let mut record = MomentumRecord::empty(symbol.clone());
            for horizon in Horizon::ALL {
                record.set_change(horizon, stats.number(symbol, horizon.change_field()));
            }
            record
        })
        .collect();

    for horizon in Horizon::ALL {
        let column: Vec<Option<f64>> = records.iter().map(|r| r.change(horizon)).collect();
        for (record, rank) in records.iter_mut().zip(percentile_ranks(&column)) {
            record.set_percentile(horizon, rank);
        }
    }

    for record in &mut records {
        let percentiles: Vec<Option<f64>> =
            Horizon::ALL.iter().map(|h| record.percentile(*h)).collect();
        record.avg_percentile = mean_present(&percentiles);
    }

    tracing::debug!(rows = records.len(), "Computed momentum percentiles");
    records
}

/// Sorts records by average percentile, best first. Records without an
/// average go last; ties are broken by symbol.
pub fn leaderboard(mut records: Vec<MomentumRecord>) -> Vec<MomentumRecord> {
    records.sort_by(|a, b| match (a.avg_percentile, b.avg_percentile) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.symbol.cmp(&b.symbol)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    records
}
