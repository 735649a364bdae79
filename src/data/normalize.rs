//! Normalization of upstream bet payloads
//!
//! The tracking endpoints do not agree on field names (`odds` vs `price`,
//! `comp` vs `league`, `status` vs `result`) or on types (numbers often
//! arrive as strings). Everything is mapped onto [`BetRecord`] here so the
//! aggregator only ever sees one shape.
//!
//! Malformed numbers are coerced to 0 instead of dropping the record, and
//! every coercion is counted in the [`NormalizeReport`].

use crate::models::{BetRecord, BetResult, RecordId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const ID_FIELDS: &[&str] = &["id", "bet_id", "pick_id"];
const MARKET_FIELDS: &[&str] = &["market", "selection", "bet_type"];
const BOOKMAKER_FIELDS: &[&str] = &["bookmaker", "book", "bookie"];
const LEAGUE_FIELDS: &[&str] = &["league", "comp", "competition"];
const PRICE_FIELDS: &[&str] = &["price", "odds", "decimal_odds"];
const STAKE_FIELDS: &[&str] = &["stake", "amount", "units"];
const RESULT_FIELDS: &[&str] = &["result", "status", "outcome"];
const TIMESTAMP_FIELDS: &[&str] = &["created_at", "placed_at", "timestamp"];

/// Counts of coerced input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub records: usize,
    /// Records with at least one coerced field
    pub corrected_records: usize,
    pub corrected_fields: usize,
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    index: usize,
    corrections: usize,
}

impl<'a> FieldReader<'a> {
    fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .filter_map(|name| self.object.get(*name))
            .find(|v| !v.is_null())
    }

    fn correct(&mut self, field: &str, raw: Option<&Value>) {
        self.corrections += 1;
        debug!(record = self.index, field, raw = ?raw, "coerced malformed field");
    }

    fn id(&mut self) -> RecordId {
        match self.get(ID_FIELDS) {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => RecordId::Number(i),
                None => RecordId::Text(n.to_string()),
            },
            Some(Value::String(s)) => RecordId::Text(s.trim().to_string()),
            other => {
                self.correct("id", other);
                RecordId::Text(String::new())
            }
        }
    }

    fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.get(aliases)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn number(&mut self, field: &str, aliases: &[&str]) -> f64 {
        let raw = self.get(aliases);
        match raw.and_then(parse_number) {
            Some(n) => n,
            None => {
                self.correct(field, raw);
                0.0
            }
        }
    }

    fn price(&mut self) -> f64 {
        let raw = self.get(PRICE_FIELDS);
        match raw.and_then(parse_number) {
            // A price below 1.0 cannot be decimal odds
            Some(price) if price >= 1.0 => price,
            _ => {
                self.correct("price", raw);
                0.0
            }
        }
    }

    fn result(&self) -> BetResult {
        match self.get(RESULT_FIELDS) {
            Some(Value::String(s)) => BetResult::parse(s),
            _ => BetResult::Pending,
        }
    }

    fn created_at(&mut self) -> Option<DateTime<Utc>> {
        let raw = self.get(TIMESTAMP_FIELDS)?;
        let parsed = match raw {
            Value::String(s) => parse_timestamp(s),
            Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
            _ => None,
        };
        if parsed.is_none() {
            self.correct("created_at", Some(raw));
        }
        parsed
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Map one upstream payload onto a [`BetRecord`]
///
/// Returns the record and the number of fields that had to be coerced.
pub fn normalize_record(value: &Value, index: usize) -> (BetRecord, usize) {
    let Some(object) = value.as_object() else {
        debug!(record = index, "bet entry is not an object");
        let empty = BetRecord::new(0, 0.0, 0.0, BetResult::Pending)
            .with_id(RecordId::Text(String::new()));
        return (empty, 1);
    };

    let mut reader = FieldReader {
        object,
        index,
        corrections: 0,
    };

    let record = BetRecord {
        id: reader.id(),
        market: reader.text(MARKET_FIELDS),
        bookmaker: reader.text(BOOKMAKER_FIELDS),
        league: reader.text(LEAGUE_FIELDS),
        price: reader.price(),
        stake: reader.number("stake", STAKE_FIELDS),
        result: reader.result(),
        created_at: reader.created_at(),
    };

    (record, reader.corrections)
}

/// Normalize a list of upstream payloads
pub fn normalize_records(values: &[Value]) -> (Vec<BetRecord>, NormalizeReport) {
    let mut report = NormalizeReport {
        records: values.len(),
        ..Default::default()
    };

    let records: Vec<BetRecord> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let (record, corrections) = normalize_record(value, index);
            if corrections > 0 {
                report.corrected_records += 1;
                report.corrected_fields += corrections;
            }
            record
        })
        .collect();

    if report.corrected_records > 0 {
        warn!(
            "Coerced {} malformed fields across {} of {} records",
            report.corrected_fields, report.corrected_records, report.records
        );
    }

    (records, report)
}
