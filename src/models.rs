use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Group key for records without a market or bookmaker
pub const MISSING_KEY: &str = "—";

/// Group key for records without a league
pub const UNKNOWN_LEAGUE: &str = "Unknown";

/// Bet identifier as issued by the tracking backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Integer value of the id, if it is numeric (numeric strings count)
    pub fn numeric(&self) -> Option<i64> {
        match self {
            RecordId::Number(n) => Some(*n),
            RecordId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

/// Settlement state of a bet
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Won,
    Lost,
    Void,
    #[default]
    Pending,
}

impl BetResult {
    /// Parse an upstream result string.
    ///
    /// Matching is case-insensitive and accepts `win`/`lose` as synonyms,
    /// since endpoints disagree on the verb form. Unknown values are pending.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "won" | "win" => BetResult::Won,
            "lost" | "lose" => BetResult::Lost,
            "void" => BetResult::Void,
            _ => BetResult::Pending,
        }
    }

    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, BetResult::Pending)
    }
}

/// Canonical bet record consumed by the performance aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: RecordId,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub bookmaker: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    /// Decimal odds
    pub price: f64,
    pub stake: f64,
    #[serde(default)]
    pub result: BetResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BetRecord {
    /// Minimal record, mostly useful for building fixtures
    pub fn new(id: i64, price: f64, stake: f64, result: BetResult) -> Self {
        Self {
            id: RecordId::Number(id),
            market: None,
            bookmaker: None,
            league: None,
            price,
            stake,
            result,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    pub fn with_market(mut self, market: &str) -> Self {
        self.market = Some(market.to_string());
        self
    }

    pub fn with_bookmaker(mut self, bookmaker: &str) -> Self {
        self.bookmaker = Some(bookmaker.to_string());
        self
    }

    pub fn with_league(mut self, league: &str) -> Self {
        self.league = Some(league.to_string());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Stake used in arithmetic; non-finite values count as zero
    pub fn effective_stake(&self) -> f64 {
        finite_or_zero(self.stake)
    }

    /// Price used in arithmetic; non-finite values count as zero
    pub fn effective_price(&self) -> f64 {
        finite_or_zero(self.price)
    }

    /// Gross amount paid back: stake × price on a win, the stake on a void
    pub fn returned(&self) -> f64 {
        match self.result {
            BetResult::Won => self.effective_stake() * self.effective_price(),
            BetResult::Void => self.effective_stake(),
            BetResult::Lost | BetResult::Pending => 0.0,
        }
    }

    /// Net profit of a settled bet (0 for void and pending)
    pub fn net_profit(&self) -> f64 {
        match self.result {
            BetResult::Won => self.effective_stake() * (self.effective_price() - 1.0),
            BetResult::Lost => -self.effective_stake(),
            BetResult::Void | BetResult::Pending => 0.0,
        }
    }

    /// Value of the grouping field, with the sentinel for missing values
    pub fn group_key(&self, dimension: Dimension) -> &str {
        let (value, sentinel) = match dimension {
            Dimension::Market => (&self.market, MISSING_KEY),
            Dimension::League => (&self.league, UNKNOWN_LEAGUE),
            Dimension::Bookmaker => (&self.bookmaker, MISSING_KEY),
        };
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(sentinel)
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Field used to group records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Market,
    League,
    Bookmaker,
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(Dimension::Market),
            "league" | "comp" => Ok(Dimension::League),
            "bookmaker" | "book" => Ok(Dimension::Bookmaker),
            other => Err(format!(
                "unknown dimension '{}', expected market, league or bookmaker",
                other
            )),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Market => "Market",
            Dimension::League => "League",
            Dimension::Bookmaker => "Bookmaker",
        };
        f.write_str(name)
    }
}

/// Ordering of aggregated rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Performance view: highest ROI first
    #[default]
    Roi,
    /// Distribution view: most picks first
    Picks,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roi" | "performance" => Ok(SortOrder::Roi),
            "picks" | "distribution" => Ok(SortOrder::Picks),
            other => Err(format!("unknown sort order '{}', expected roi or picks", other)),
        }
    }
}

/// Summary statistics for one group of records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub key: String,
    pub picks: usize,
    pub won: usize,
    pub lost: usize,
    pub void: usize,
    pub pending: usize,
    pub staked: f64,
    pub returned: f64,
    pub pnl: f64,
    /// Percentage
    pub roi: f64,
}

/// Won/lost/void tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultRecord {
    pub won: usize,
    pub lost: usize,
    pub void: usize,
}

/// Headline totals over a whole record list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Kpis {
    pub staked: f64,
    pub returned: f64,
    pub pnl: f64,
    /// Percentage
    pub roi: f64,
    pub record: ResultRecord,
}

/// Running profit/loss over settled bets, in chronological order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PnlSeries {
    pub values: Vec<f64>,
    pub last_value: f64,
    pub min: f64,
    pub max: f64,
}
