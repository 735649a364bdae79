//! Logie's Edges - odds and bet-performance analytics
//!
//! This library provides:
//! - Decimal ↔ fractional odds conversion for display
//! - Kelly criterion stake sizing
//! - Grouped performance rows, headline KPIs and cumulative P/L series
//! - Normalization of heterogeneous bet-tracking payloads
//!
//! # Example
//!
//! ```
//! use edges::core::odds::format_odds_both;
//! use edges::models::{BetRecord, BetResult, Dimension, SortOrder};
//! use edges::performance::{aggregate_by_dimension, compute_kpis};
//!
//! assert_eq!(format_odds_both(1.91), "1.91 (10/11)");
//!
//! let bets = vec![
//!     BetRecord::new(1, 2.0, 10.0, BetResult::Won).with_market("HOME_WIN"),
//!     BetRecord::new(2, 1.91, 10.0, BetResult::Lost).with_market("O2.5"),
//! ];
//! let rows = aggregate_by_dimension(&bets, Dimension::Market, SortOrder::Roi);
//! assert_eq!(rows[0].key, "HOME_WIN");
//! assert_eq!(compute_kpis(&bets).record.won, 1);
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod performance;

// Re-export commonly used types
pub use data::{load_records, NormalizeReport};
pub use error::{DataError, ValidationError};
pub use models::{
    AggregatedRow, BetRecord, BetResult, Dimension, Kpis, PnlSeries, RecordId, ResultRecord,
    SortOrder,
};
pub use performance::{
    aggregate_by_dimension, compute_cumulative_pnl, compute_kpis, PendingStakes,
    PerformanceAggregator,
};
