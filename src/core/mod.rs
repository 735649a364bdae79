//! Odds conversion and stake sizing

pub mod kelly;
pub mod odds;

// Re-export commonly used types
pub use kelly::{
    calculate_edge, calculate_kelly_fraction, calculate_optimal_stake, KellyCalculator,
    StakeSizing,
};
pub use odds::{
    decimal_to_fractional, decimal_to_fractional_bounded, format_odds_both,
    fractional_to_decimal, implied_probability,
};
