//! Performance Metrics
//!
//! Hit rate, drawdown, profit factor and price-band analysis over a tracked
//! bet list.

use super::aggregate::{roi_percent, sort_rows, PerformanceAggregator};
use super::series::compute_cumulative_pnl;
use crate::models::{AggregatedRow, BetRecord, BetResult, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary metrics for a tipster or bet history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_picks: usize,
    pub settled: usize,
    pub pending: usize,
    /// won / (won + lost), voids excluded
    pub hit_rate: f64,
    /// Mean decimal price over settled picks
    pub avg_price: f64,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
    pub profit_factor: f64,

    pub max_drawdown: f64,
    /// Drawdown as a fraction of settled stake
    pub max_drawdown_pct: f64,
    /// Percentage over settled stake
    pub roi: f64,
}

/// Calculate metrics over settled records
pub fn calculate_metrics(records: &[BetRecord]) -> PerformanceMetrics {
    if records.is_empty() {
        return PerformanceMetrics::default();
    }

    let settled: Vec<&BetRecord> = records.iter().filter(|b| b.result.is_settled()).collect();
    let won = settled.iter().filter(|b| b.result == BetResult::Won).count();
    let lost = settled.iter().filter(|b| b.result == BetResult::Lost).count();

    let hit_rate = if won + lost > 0 {
        won as f64 / (won + lost) as f64
    } else {
        0.0
    };

    let avg_price = if settled.is_empty() {
        0.0
    } else {
        settled.iter().map(|b| b.effective_price()).sum::<f64>() / settled.len() as f64
    };

    let profits: Vec<f64> = settled.iter().map(|b| b.net_profit()).collect();
    let gross_profit: f64 = profits.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = profits.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();
    let net_profit = gross_profit - gross_loss;

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let settled_stake: f64 = settled.iter().map(|b| b.effective_stake()).sum();
    let max_drawdown = max_drawdown(&compute_cumulative_pnl(records).values);
    let max_drawdown_pct = if settled_stake > 0.0 {
        max_drawdown / settled_stake
    } else {
        0.0
    };

    PerformanceMetrics {
        total_picks: records.len(),
        settled: settled.len(),
        pending: records.len() - settled.len(),
        hit_rate,
        avg_price,
        gross_profit,
        gross_loss,
        net_profit,
        profit_factor,
        max_drawdown,
        max_drawdown_pct,
        roi: roi_percent(net_profit, settled_stake),
    }
}

/// Largest peak-to-trough fall of a cumulative series, starting from zero
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;
    for &value in cumulative {
        peak = peak.max(value);
        max_drawdown = max_drawdown.max(peak - value);
    }
    max_drawdown
}

/// Price band label for a decimal price
///
/// Prices below 1.0 (including those coerced to 0) get their own band.
pub fn odds_band(price: f64) -> &'static str {
    if price < 1.0 {
        "invalid (<1.0)"
    } else if price < 2.0 {
        "odds-on (<2.0)"
    } else if price < 3.0 {
        "short (2.0-3.0)"
    } else if price < 5.0 {
        "mid (3.0-5.0)"
    } else {
        "long (5.0+)"
    }
}

/// Group records by price band, ordered as `order` requests
pub fn analyze_by_odds_band(
    aggregator: &PerformanceAggregator,
    records: &[BetRecord],
    order: SortOrder,
) -> Vec<AggregatedRow> {
    let mut grouped: BTreeMap<&str, Vec<&BetRecord>> = BTreeMap::new();
    for bet in records {
        grouped
            .entry(odds_band(bet.effective_price()))
            .or_default()
            .push(bet);
    }

    let mut rows: Vec<AggregatedRow> = grouped
        .into_iter()
        .map(|(band, group)| aggregator.summarize(band, group))
        .collect();

    sort_rows(&mut rows, order);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_bets() -> Vec<BetRecord> {
        vec![
            BetRecord::new(1, 8.0, 10.0, BetResult::Won),
            BetRecord::new(2, 1.5, 10.0, BetResult::Lost),
            BetRecord::new(3, 2.5, 10.0, BetResult::Won),
            BetRecord::new(4, 1.9, 10.0, BetResult::Void),
            BetRecord::new(5, 4.0, 10.0, BetResult::Pending),
        ]
    }

    #[test]
    fn test_calculate_metrics() {
        let metrics = calculate_metrics(&create_test_bets());

        assert_eq!(metrics.total_picks, 5);
        assert_eq!(metrics.settled, 4);
        assert_eq!(metrics.pending, 1);
        assert!((metrics.hit_rate - 0.6667).abs() < 0.01);
        assert!((metrics.gross_profit - 85.0).abs() < 1e-9); // 70 + 15
        assert!((metrics.gross_loss - 10.0).abs() < 1e-9);
        assert!((metrics.net_profit - 75.0).abs() < 1e-9);
        assert!((metrics.profit_factor - 8.5).abs() < 1e-9);
        assert!((metrics.roi - 187.5).abs() < 1e-9); // 75 / 40
        assert!((metrics.avg_price - 3.475).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_metrics_empty() {
        let metrics = calculate_metrics(&[]);
        assert_eq!(metrics, PerformanceMetrics::default());
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let bets = vec![BetRecord::new(1, 2.0, 10.0, BetResult::Won)];
        assert!(calculate_metrics(&bets).profit_factor.is_infinite());

        let bets = vec![BetRecord::new(1, 2.0, 10.0, BetResult::Void)];
        let metrics = calculate_metrics(&bets);
        assert_eq!(metrics.profit_factor, 0.0);
        assert_eq!(metrics.hit_rate, 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let bets = vec![
            BetRecord::new(1, 10.0, 10.0, BetResult::Won),
            BetRecord::new(2, 10.0, 10.0, BetResult::Lost),
            BetRecord::new(3, 10.0, 10.0, BetResult::Lost),
        ];

        // Cumulative: 90, 80, 70
        let metrics = calculate_metrics(&bets);
        assert!((metrics.max_drawdown - 20.0).abs() < 1e-9);
        assert_eq!(max_drawdown(&[-5.0, -15.0, 10.0]), 15.0);
    }

    #[test]
    fn test_analyze_by_odds_band() {
        let rows = analyze_by_odds_band(
            &PerformanceAggregator::default(),
            &create_test_bets(),
            SortOrder::Picks,
        );

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].key, "odds-on (<2.0)");
        assert_eq!(rows[0].picks, 2);

        let total: usize = rows.iter().map(|r| r.picks).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_zero_price_kept_out_of_odds_on_band() {
        let bets = vec![
            BetRecord::new(1, 1.5, 10.0, BetResult::Won),
            BetRecord::new(2, 0.0, 10.0, BetResult::Won),
        ];
        let rows = analyze_by_odds_band(&PerformanceAggregator::default(), &bets, SortOrder::Roi);

        let odds_on = rows.iter().find(|r| r.key == "odds-on (<2.0)").unwrap();
        assert_eq!(odds_on.picks, 1);
        assert!((odds_on.roi - 50.0).abs() < 1e-9);

        let invalid = rows.iter().find(|r| r.key == "invalid (<1.0)").unwrap();
        assert_eq!(invalid.picks, 1);
        assert_eq!(odds_band(0.5), "invalid (<1.0)");
    }
}
