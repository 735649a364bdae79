//! Loading bet exports from disk

use super::normalize::{normalize_records, NormalizeReport};
use crate::error::DataError;
use crate::models::BetRecord;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Keys that wrap the bet array in API responses
const WRAPPER_KEYS: &[&str] = &["bets", "data", "results", "picks"];

/// Load bet records from a `.json` or `.csv` export
pub fn load_records<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<BetRecord>, NormalizeReport), DataError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let values = match extension.as_str() {
        "json" => parse_json(&content)?,
        "csv" => parse_csv(&content)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    let (records, report) = normalize_records(&values);
    info!("Loaded {} bet records from {:?}", records.len(), path);

    Ok((records, report))
}

/// Extract the bet array from a JSON document
///
/// Accepts a bare array or an object wrapping one under a known key.
pub fn parse_json(content: &str) -> Result<Vec<Value>, DataError> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or(DataError::UnexpectedShape("an object without a bet array")),
        Value::Null => Ok(Vec::new()),
        _ => Err(DataError::UnexpectedShape("a scalar")),
    }
}

/// Read CSV rows into JSON objects keyed by header
///
/// Empty cells become `null` so they count as missing.
pub fn parse_csv(content: &str) -> Result<Vec<Value>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (header.clone(), value)
            })
            .collect();
        rows.push(Value::Object(row));
    }

    Ok(rows)
}
