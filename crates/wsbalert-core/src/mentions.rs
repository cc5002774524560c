use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ticker row as reported by the upstream mention API for the current day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMention {
    pub ticker: String,
    pub mentions: u64,
    /// Company name, when the upstream provides one.
    pub name: Option<String>,
    /// Upstream rank by mentions (1 = most mentioned).
    pub rank: Option<u32>,
    /// Mention count the upstream reported 24 hours earlier.
    pub mentions_24h_ago: Option<u64>,
}

impl TickerMention {
    #[must_use]
    pub fn new(ticker: impl Into<String>, mentions: u64) -> Self {
        Self {
            ticker: ticker.into(),
            mentions,
            name: None,
            rank: None,
            mentions_24h_ago: None,
        }
    }

    /// Stamp this mention with the run date to produce a persistable record.
    #[must_use]
    pub fn to_record(&self, date: NaiveDate) -> MentionRecord {
        MentionRecord {
            date,
            ticker: self.ticker.clone(),
            mentions: self.mentions,
        }
    }
}

/// A persisted `(date, ticker, mentions)` observation.
///
/// Field order matches the history file's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub mentions: u64,
}

/// Date-ordered records for a single ticker, derived from the history store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerSeries {
    ticker: String,
    records: Vec<MentionRecord>,
}

impl TickerSeries {
    #[must_use]
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            records: Vec::new(),
        }
    }

    /// Build a series from arbitrary records, sorting them by date.
    ///
    /// The sort is stable, so records sharing a date keep their given order.
    #[must_use]
    pub fn from_records(ticker: impl Into<String>, mut records: Vec<MentionRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            ticker: ticker.into(),
            records,
        }
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn records(&self) -> &[MentionRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dated within `[start, end)`.
    pub fn between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &MentionRecord> + '_ {
        self.records
            .iter()
            .filter(move |r| r.date >= start && r.date < end)
    }

    /// The last record written for `date`, if any.
    #[must_use]
    pub fn latest_on(&self, date: NaiveDate) -> Option<&MentionRecord> {
        self.records.iter().rev().find(|r| r.date == date)
    }
}

/// Classification outcome for one ticker in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "buy"),
            Signal::Sell => write!(f, "sell"),
            Signal::Neutral => write!(f, "neutral"),
        }
    }
}
