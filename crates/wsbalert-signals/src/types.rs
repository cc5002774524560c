use serde::Serialize;
use wsbalert_core::Signal;

/// A ticker after classification, carrying the figures the report shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedTicker {
    pub ticker: String,
    /// Mentions reported today.
    pub mentions: u64,
    /// Mean mentions over the trailing window. 0.0 if no history.
    pub average: f64,
    /// `mentions / average`, or 0.0 when the average is 0.
    pub ratio: f64,
    /// Mentions on the previous day, if known.
    pub previous_day: Option<u64>,
    /// Day-over-day change in percent, if the previous day is known and non-zero.
    pub trend_pct: Option<f64>,
    /// Whether the ticker ranked in the top-N by raw mentions this run.
    pub top_ranked: bool,
    pub signal: Signal,
}
