//! Bet export loading and normalization

pub mod loader;
pub mod normalize;

// Re-export commonly used types
pub use loader::load_records;
pub use normalize::{normalize_record, normalize_records, NormalizeReport};
