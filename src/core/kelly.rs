//! Kelly Criterion Staking
//!
//! Stake sizing from a model probability and the decimal price on offer.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b = (p*odds - 1) / (odds - 1)
//!
//! Where:
//!     f* = fraction of bankroll to stake
//!     b = odds - 1 (net odds)
//!     p = model probability of winning
//!     q = 1 - p
//!     odds = decimal odds (e.g., 2.5 returns 2.5 per unit staked)

use serde::{Deserialize, Serialize};

/// Stake recommendation for a single bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeSizing {
    pub probability: f64,
    pub odds: f64,
    pub expected_value: f64,
    pub edge: f64,                 // EV - 1
    pub kelly_fraction: f64,       // Full Kelly
    pub recommended_fraction: f64, // After applying Kelly multiplier
    pub stake: f64,
}

/// Edge of a bet: `probability * odds - 1`
///
/// # Examples
/// ```
/// use edges::core::kelly::calculate_edge;
/// assert!((calculate_edge(0.55, 2.0) - 0.10).abs() < 1e-9);
/// ```
pub fn calculate_edge(probability: f64, odds: f64) -> f64 {
    probability * odds - 1.0
}

/// Full-Kelly fraction of bankroll for a single bet
///
/// Negative when the bet has no edge; zero when `odds <= 1`.
///
/// # Examples
/// ```
/// use edges::core::kelly::calculate_kelly_fraction;
/// let kelly = calculate_kelly_fraction(0.25, 5.0);
/// assert!((kelly - 0.0625).abs() < 0.0001);
/// ```
pub fn calculate_kelly_fraction(probability: f64, odds: f64) -> f64 {
    if !odds.is_finite() || odds <= 1.0 || !probability.is_finite() {
        return 0.0;
    }

    (probability * odds - 1.0) / (odds - 1.0)
}

fn floor_to_increment(amount: f64, increment: f64) -> f64 {
    if increment > 0.0 {
        (amount / increment).floor() * increment
    } else {
        amount
    }
}

/// Recommended stake for a single bet
///
/// # Arguments
/// * `kelly_multiplier` - Fraction of full Kelly to use (0.25 = quarter Kelly)
/// * `min_stake` - Smallest stake worth placing
/// * `max_stake_pct` - Cap on a single stake as a fraction of bankroll
/// * `stake_increment` - Stakes are floored to a multiple of this (0 disables)
pub fn calculate_optimal_stake(
    probability: f64,
    odds: f64,
    bankroll: f64,
    kelly_multiplier: f64,
    min_stake: f64,
    max_stake_pct: f64,
    stake_increment: f64,
) -> f64 {
    let kelly = calculate_kelly_fraction(probability, odds);

    if kelly <= 0.0 || bankroll <= 0.0 {
        return 0.0;
    }

    let raw_stake = bankroll * kelly * kelly_multiplier;
    let cap = bankroll * max_stake_pct;
    let stake = floor_to_increment(raw_stake.min(cap), stake_increment);

    if stake < min_stake {
        // Round small positive-edge stakes up to the minimum, drop the rest.
        // The minimum never overrides the per-bet cap.
        if raw_stake < min_stake / 2.0 || min_stake > cap {
            return 0.0;
        }
        return min_stake;
    }

    stake
}

/// Kelly calculator holding bankroll and risk limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyCalculator {
    pub bankroll: f64,
    pub kelly_multiplier: f64,
    pub min_stake: f64,
    pub max_stake_pct: f64,
    pub max_total_exposure: f64,
    pub stake_increment: f64,
}

impl KellyCalculator {
    pub fn new(
        bankroll: f64,
        kelly_multiplier: f64,
        min_stake: f64,
        max_stake_pct: f64,
        max_total_exposure: f64,
        stake_increment: f64,
    ) -> Self {
        Self {
            bankroll,
            kelly_multiplier,
            min_stake,
            max_stake_pct,
            max_total_exposure,
            stake_increment,
        }
    }

    /// Quarter Kelly, 5% cap per bet, 25% total exposure, stakes in 0.50 steps
    pub fn with_defaults(bankroll: f64) -> Self {
        Self {
            bankroll,
            kelly_multiplier: 0.25,
            min_stake: 1.0,
            max_stake_pct: 0.05,
            max_total_exposure: 0.25,
            stake_increment: 0.5,
        }
    }

    pub fn with_multiplier(mut self, kelly_multiplier: f64) -> Self {
        self.kelly_multiplier = kelly_multiplier;
        self
    }

    pub fn calculate_single(&self, probability: f64, odds: f64) -> StakeSizing {
        let ev = probability * odds;
        let kelly = calculate_kelly_fraction(probability, odds);

        StakeSizing {
            probability,
            odds,
            expected_value: ev,
            edge: calculate_edge(probability, odds),
            kelly_fraction: kelly,
            recommended_fraction: (kelly * self.kelly_multiplier).max(0.0),
            stake: calculate_optimal_stake(
                probability,
                odds,
                self.bankroll,
                self.kelly_multiplier,
                self.min_stake,
                self.max_stake_pct,
                self.stake_increment,
            ),
        }
    }

    /// Size several simultaneous bets, scaling them down together when the
    /// combined stake would exceed the exposure limit.
    pub fn calculate_multiple(&self, bets: &[(f64, f64)]) -> Vec<StakeSizing> {
        if bets.is_empty() {
            return Vec::new();
        }

        let mut sizings: Vec<StakeSizing> = bets
            .iter()
            .map(|(p, o)| self.calculate_single(*p, *o))
            .collect();

        let total_stake: f64 = sizings.iter().map(|s| s.stake).sum();
        let max_exposure = self.bankroll * self.max_total_exposure;

        if total_stake > max_exposure && total_stake > 0.0 {
            let scale_factor = max_exposure / total_stake;

            for sizing in &mut sizings {
                let new_stake =
                    floor_to_increment(sizing.stake * scale_factor, self.stake_increment);
                sizing.stake = if new_stake < self.min_stake { 0.0 } else { new_stake };
                sizing.recommended_fraction *= scale_factor;
            }
        }

        sizings
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::with_defaults(1_000.0)
    }
}
