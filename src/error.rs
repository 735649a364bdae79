use std::path::PathBuf;
use thiserror::Error;

/// Errors reading bet exports
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format '{0}', expected .json or .csv")]
    UnsupportedFormat(String),

    #[error("Expected an array of bets, found {0}")]
    UnexpectedShape(&'static str),
}

/// Rejected user input
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Odds must be finite and greater than 1.0, got {0}")]
    Odds(f64),

    #[error("Probability must be between 0 and 1, got {0}")]
    Probability(f64),

    #[error("Bankroll must be positive, got {0}")]
    Bankroll(f64),

    #[error("Kelly multiplier must be in (0, 1], got {0}")]
    KellyMultiplier(f64),
}

pub fn validate_odds(odds: f64) -> Result<(), ValidationError> {
    if !odds.is_finite() || odds <= 1.0 {
        return Err(ValidationError::Odds(odds));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(ValidationError::Probability(prob));
    }
    Ok(())
}

pub fn validate_bankroll(bankroll: f64) -> Result<(), ValidationError> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(ValidationError::Bankroll(bankroll));
    }
    Ok(())
}

pub fn validate_kelly_multiplier(multiplier: f64) -> Result<(), ValidationError> {
    if !(multiplier > 0.0 && multiplier <= 1.0) {
        return Err(ValidationError::KellyMultiplier(multiplier));
    }
    Ok(())
}
