//! Grouped performance rows and headline KPIs

use crate::models::{
    AggregatedRow, BetRecord, BetResult, Dimension, Kpis, ResultRecord, SortOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether unsettled bets count towards `staked`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStakes {
    /// Pending stakes are capital at risk and are counted
    #[default]
    Include,
    /// Only settled stakes are counted
    Exclude,
}

/// Aggregation settings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerformanceAggregator {
    pub pending_stakes: PendingStakes,
}

impl PerformanceAggregator {
    pub fn new(pending_stakes: PendingStakes) -> Self {
        Self { pending_stakes }
    }

    /// Group records by `dimension` and sort the rows by `order`
    ///
    /// Rows are descending on the sort field; ties are ordered by key so the
    /// output is fully determined by the input.
    pub fn aggregate(
        &self,
        records: &[BetRecord],
        dimension: Dimension,
        order: SortOrder,
    ) -> Vec<AggregatedRow> {
        let mut grouped: BTreeMap<&str, Vec<&BetRecord>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.group_key(dimension))
                .or_default()
                .push(record);
        }

        let mut rows: Vec<AggregatedRow> = grouped
            .into_iter()
            .map(|(key, group)| self.summarize(key, group))
            .collect();

        sort_rows(&mut rows, order);
        rows
    }

    /// Totals over the whole list with no grouping
    pub fn kpis(&self, records: &[BetRecord]) -> Kpis {
        let row = self.summarize("", records.iter());

        Kpis {
            staked: row.staked,
            returned: row.returned,
            pnl: row.pnl,
            roi: row.roi,
            record: ResultRecord {
                won: row.won,
                lost: row.lost,
                void: row.void,
            },
        }
    }

    pub(crate) fn summarize<'a, I>(&self, key: &str, group: I) -> AggregatedRow
    where
        I: IntoIterator<Item = &'a BetRecord>,
    {
        let mut row = AggregatedRow {
            key: key.to_string(),
            ..Default::default()
        };

        for bet in group {
            row.picks += 1;
            match bet.result {
                BetResult::Won => row.won += 1,
                BetResult::Lost => row.lost += 1,
                BetResult::Void => row.void += 1,
                BetResult::Pending => row.pending += 1,
            }

            if bet.result.is_settled() || self.pending_stakes == PendingStakes::Include {
                row.staked += bet.effective_stake();
            }
            row.returned += bet.returned();
        }

        row.pnl = row.returned - row.staked;
        row.roi = roi_percent(row.pnl, row.staked);
        row
    }
}

/// `pnl / staked` as a percentage, zero when nothing was staked
pub fn roi_percent(pnl: f64, staked: f64) -> f64 {
    if staked > 0.0 {
        pnl / staked * 100.0
    } else {
        0.0
    }
}

pub(crate) fn sort_rows(rows: &mut [AggregatedRow], order: SortOrder) {
    match order {
        SortOrder::Roi => {
            rows.sort_by(|a, b| b.roi.total_cmp(&a.roi).then_with(|| a.key.cmp(&b.key)))
        }
        SortOrder::Picks => {
            rows.sort_by(|a, b| b.picks.cmp(&a.picks).then_with(|| a.key.cmp(&b.key)))
        }
    }
}

/// Group records by `dimension`, counting pending stakes
pub fn aggregate_by_dimension(
    records: &[BetRecord],
    dimension: Dimension,
    order: SortOrder,
) -> Vec<AggregatedRow> {
    PerformanceAggregator::default().aggregate(records, dimension, order)
}

/// Headline totals, counting pending stakes
pub fn compute_kpis(records: &[BetRecord]) -> Kpis {
    PerformanceAggregator::default().kpis(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MISSING_KEY, UNKNOWN_LEAGUE};

    fn create_test_bets() -> Vec<BetRecord> {
        vec![
            BetRecord::new(1, 2.0, 10.0, BetResult::Won)
                .with_market("HOME_WIN")
                .with_league("EPL")
                .with_bookmaker("Bet365"),
            BetRecord::new(2, 1.91, 10.0, BetResult::Lost)
                .with_market("O2.5")
                .with_league("EPL")
                .with_bookmaker("Bet365"),
            BetRecord::new(3, 3.0, 5.0, BetResult::Won)
                .with_market("O2.5")
                .with_league("La Liga"),
            BetRecord::new(4, 1.8, 20.0, BetResult::Void).with_market("BTTS_Y"),
            BetRecord::new(5, 2.5, 10.0, BetResult::Pending)
                .with_market("HOME_WIN")
                .with_league("EPL"),
        ]
    }

    #[test]
    fn test_aggregate_by_market() {
        let rows = aggregate_by_dimension(&create_test_bets(), Dimension::Market, SortOrder::Roi);
        assert_eq!(rows.len(), 3);

        let o25 = rows.iter().find(|r| r.key == "O2.5").unwrap();
        assert_eq!(o25.picks, 2);
        assert_eq!(o25.won, 1);
        assert_eq!(o25.lost, 1);
        assert!((o25.staked - 15.0).abs() < 1e-9);
        assert!((o25.returned - 15.0).abs() < 1e-9);
        assert!(o25.pnl.abs() < 1e-9);

        // Pending stake counted, pending return not
        let home = rows.iter().find(|r| r.key == "HOME_WIN").unwrap();
        assert_eq!(home.pending, 1);
        assert!((home.staked - 20.0).abs() < 1e-9);
        assert!((home.returned - 20.0).abs() < 1e-9);
        assert_eq!(home.roi, 0.0);

        let btts = rows.iter().find(|r| r.key == "BTTS_Y").unwrap();
        assert_eq!(btts.void, 1);
        assert!((btts.returned - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentinel_groups() {
        let bets = create_test_bets();

        let by_league = aggregate_by_dimension(&bets, Dimension::League, SortOrder::Picks);
        let unknown = by_league.iter().find(|r| r.key == UNKNOWN_LEAGUE).unwrap();
        assert_eq!(unknown.picks, 1);

        let by_book = aggregate_by_dimension(&bets, Dimension::Bookmaker, SortOrder::Picks);
        assert_eq!(by_book[0].key, MISSING_KEY);
        assert_eq!(by_book[0].picks, 3);
    }

    #[test]
    fn test_sort_orders() {
        let bets = create_test_bets();

        let by_picks = aggregate_by_dimension(&bets, Dimension::League, SortOrder::Picks);
        assert_eq!(by_picks[0].key, "EPL");
        assert!(by_picks.windows(2).all(|w| w[0].picks >= w[1].picks));

        let by_roi = aggregate_by_dimension(&bets, Dimension::League, SortOrder::Roi);
        assert_eq!(by_roi[0].key, "La Liga");
        assert!(by_roi.windows(2).all(|w| w[0].roi >= w[1].roi));
    }

    #[test]
    fn test_picks_conserved_for_every_dimension() {
        let bets = create_test_bets();
        for dimension in [Dimension::Market, Dimension::League, Dimension::Bookmaker] {
            let rows = aggregate_by_dimension(&bets, dimension, SortOrder::Roi);
            let total: usize = rows.iter().map(|r| r.picks).sum();
            assert_eq!(total, bets.len());
        }
    }

    #[test]
    fn test_losing_group_has_negative_roi() {
        let bets = vec![
            BetRecord::new(1, 2.0, 10.0, BetResult::Lost).with_market("AWAY_WIN"),
            BetRecord::new(2, 3.0, 5.0, BetResult::Lost).with_market("AWAY_WIN"),
        ];
        let rows = aggregate_by_dimension(&bets, Dimension::Market, SortOrder::Roi);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].pnl < 0.0);
        assert!(rows[0].roi < 0.0);
        assert!((rows[0].roi + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let bets = create_test_bets();
        let first = aggregate_by_dimension(&bets, Dimension::Market, SortOrder::Roi);
        let second = aggregate_by_dimension(&bets, Dimension::Market, SortOrder::Roi);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_case_insensitive_results_count_alike() {
        let bets: Vec<BetRecord> = ["WON", "Win", "won"]
            .iter()
            .enumerate()
            .map(|(i, r)| BetRecord::new(i as i64, 2.0, 10.0, BetResult::parse(r)))
            .collect();

        let kpis = compute_kpis(&bets);
        assert_eq!(kpis.record.won, 3);
        assert!((kpis.returned - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            compute_kpis(&[]),
            Kpis {
                staked: 0.0,
                returned: 0.0,
                pnl: 0.0,
                roi: 0.0,
                record: ResultRecord { won: 0, lost: 0, void: 0 },
            }
        );
        assert!(aggregate_by_dimension(&[], Dimension::Market, SortOrder::Roi).is_empty());
    }

    #[test]
    fn test_kpis() {
        let kpis = compute_kpis(&create_test_bets());
        assert!((kpis.staked - 55.0).abs() < 1e-9);
        assert!((kpis.returned - 55.0).abs() < 1e-9);
        assert!(kpis.pnl.abs() < 1e-9);
        assert_eq!(kpis.record, ResultRecord { won: 2, lost: 1, void: 1 });
    }

    #[test]
    fn test_exclude_pending_stakes() {
        let aggregator = PerformanceAggregator::new(PendingStakes::Exclude);
        let kpis = aggregator.kpis(&create_test_bets());
        assert!((kpis.staked - 45.0).abs() < 1e-9);
        assert!((kpis.pnl - 10.0).abs() < 1e-9);

        let rows = aggregator.aggregate(&create_test_bets(), Dimension::Market, SortOrder::Roi);
        let total: usize = rows.iter().map(|r| r.picks).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_malformed_numbers_are_counted_not_dropped() {
        let bets = vec![
            BetRecord::new(1, f64::NAN, 10.0, BetResult::Won),
            BetRecord::new(2, 2.0, f64::NAN, BetResult::Lost),
        ];
        let kpis = compute_kpis(&bets);
        assert_eq!(kpis.record.won, 1);
        assert_eq!(kpis.record.lost, 1);
        assert!((kpis.staked - 10.0).abs() < 1e-9);
        assert_eq!(kpis.returned, 0.0);
        assert!(kpis.roi.is_finite());
    }
}
