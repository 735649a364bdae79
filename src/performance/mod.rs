//! Performance aggregation over tracked bets

pub mod aggregate;
pub mod metrics;
pub mod series;

pub use aggregate::{aggregate_by_dimension, compute_kpis, PendingStakes, PerformanceAggregator};
pub use metrics::{analyze_by_odds_band, calculate_metrics, PerformanceMetrics};
pub use series::compute_cumulative_pnl;
