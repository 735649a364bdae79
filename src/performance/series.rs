//! Cumulative profit/loss series for charting

use crate::models::{BetRecord, PnlSeries};
use std::cmp::Ordering;

/// Settled records in chart order
///
/// When every settled record carries a timestamp the series is ordered by
/// time, with numeric id breaking ties. Otherwise it is ordered by numeric
/// id alone; ids that are not numeric go last. The sort is stable, so equal
/// keys keep their input order.
pub fn chronological_settled(records: &[BetRecord]) -> Vec<&BetRecord> {
    let mut settled: Vec<&BetRecord> = records.iter().filter(|b| b.result.is_settled()).collect();

    let all_timestamped = settled.iter().all(|b| b.created_at.is_some());

    settled.sort_by(|a, b| {
        let by_time = if all_timestamped {
            a.created_at.cmp(&b.created_at)
        } else {
            Ordering::Equal
        };
        by_time.then_with(|| compare_ids(a, b))
    });

    settled
}

fn compare_ids(a: &BetRecord, b: &BetRecord) -> Ordering {
    match (a.id.numeric(), b.id.numeric()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Running total of net profit over settled bets
///
/// A win adds `stake * (price - 1)`, a loss subtracts the stake and a void
/// adds nothing. Pending bets are left out of the series entirely.
pub fn compute_cumulative_pnl(records: &[BetRecord]) -> PnlSeries {
    let mut values = Vec::new();
    let mut running = 0.0;
    for bet in chronological_settled(records) {
        running += bet.net_profit();
        values.push(running);
    }

    if values.is_empty() {
        return PnlSeries::default();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    PnlSeries {
        last_value: running,
        min,
        max,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetResult, RecordId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_win_then_loss() {
        let bets = vec![
            BetRecord::new(1, 2.0, 10.0, BetResult::Won),
            BetRecord::new(2, 2.0, 10.0, BetResult::Lost),
        ];

        let series = compute_cumulative_pnl(&bets);
        assert_eq!(series.values, vec![10.0, 0.0]);
        assert_eq!(series.last_value, 0.0);
        assert_eq!(series.min, 0.0);
        assert_eq!(series.max, 10.0);
    }

    #[test]
    fn test_pending_excluded_and_void_flat() {
        let bets = vec![
            BetRecord::new(1, 3.0, 5.0, BetResult::Won),
            BetRecord::new(2, 2.0, 50.0, BetResult::Pending),
            BetRecord::new(3, 2.0, 10.0, BetResult::Void),
            BetRecord::new(4, 1.5, 20.0, BetResult::Lost),
        ];

        let series = compute_cumulative_pnl(&bets);
        assert_eq!(series.values, vec![10.0, 10.0, -10.0]);
        assert_eq!(series.min, -10.0);
        assert_eq!(series.last_value, -10.0);
    }

    #[test]
    fn test_ordered_by_id_without_timestamps() {
        let bets = vec![
            BetRecord::new(3, 2.0, 10.0, BetResult::Lost),
            BetRecord::new(1, 2.0, 10.0, BetResult::Won),
            BetRecord::new(0, 2.0, 1.0, BetResult::Won).with_id(RecordId::Text("x".to_string())),
            BetRecord::new(0, 2.0, 10.0, BetResult::Won).with_id(RecordId::Text("2".to_string())),
        ];

        let ordered: Vec<String> = chronological_settled(&bets)
            .iter()
            .map(|b| b.id.to_string())
            .collect();
        assert_eq!(ordered, vec!["1", "2", "3", "x"]);

        let series = compute_cumulative_pnl(&bets);
        assert_eq!(series.values, vec![10.0, 20.0, 10.0, 11.0]);
    }

    #[test]
    fn test_ordered_by_timestamp() {
        let early = Utc.with_ymd_and_hms(2024, 8, 10, 15, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 8, 11, 15, 0, 0).unwrap();
        let bets = vec![
            BetRecord::new(1, 2.0, 10.0, BetResult::Lost).with_created_at(late),
            BetRecord::new(2, 2.0, 10.0, BetResult::Won).with_created_at(early),
        ];

        let series = compute_cumulative_pnl(&bets);
        assert_eq!(series.values, vec![10.0, 0.0]);
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_id() {
        let late = Utc.with_ymd_and_hms(2024, 8, 11, 15, 0, 0).unwrap();
        let bets = vec![
            BetRecord::new(2, 2.0, 10.0, BetResult::Won),
            BetRecord::new(1, 2.0, 10.0, BetResult::Lost).with_created_at(late),
        ];

        let series = compute_cumulative_pnl(&bets);
        assert_eq!(series.values, vec![-10.0, 0.0]);
    }

    #[test]
    fn test_reproducible() {
        let bets = vec![
            BetRecord::new(5, 2.2, 4.0, BetResult::Won),
            BetRecord::new(5, 1.7, 4.0, BetResult::Lost),
            BetRecord::new(2, 4.0, 1.0, BetResult::Won),
        ];
        assert_eq!(compute_cumulative_pnl(&bets), compute_cumulative_pnl(&bets));
    }

    #[test]
    fn test_empty_series() {
        let series = compute_cumulative_pnl(&[]);
        assert!(series.values.is_empty());
        assert_eq!(series.last_value, 0.0);
        assert_eq!(series.min, 0.0);
        assert_eq!(series.max, 0.0);

        let only_pending = vec![BetRecord::new(1, 2.0, 10.0, BetResult::Pending)];
        assert_eq!(compute_cumulative_pnl(&only_pending), PnlSeries::default());
    }
}
