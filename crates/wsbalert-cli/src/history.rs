//! `wsbalert history <TICKER>`: print a ticker's stored daily counts.

use std::fmt::Write as _;

use anyhow::Context;
use wsbalert_core::{MentionRecord, TickerSeries};
use wsbalert_history::HistoryStore;

pub(crate) fn run_history(store: &HistoryStore, ticker: &str, days: u32) -> anyhow::Result<()> {
    let ticker = ticker.trim().to_uppercase();
    let snapshot = store
        .load()
        .with_context(|| format!("failed to read history from {}", store.path().display()))?;

    match snapshot.get(&ticker) {
        Some(series) => print!("{}", format_series(series, days)),
        None => println!("no history recorded for {ticker}"),
    }
    Ok(())
}

/// The last `days` rows of `series`, one `date  mentions` line each.
fn format_series(series: &TickerSeries, days: u32) -> String {
    let records = series.records();
    let keep = usize::try_from(days).unwrap_or(usize::MAX).min(records.len());

    let mut out = format!("{} ({} rows stored)\n", series.ticker(), records.len());
    for MentionRecord { date, mentions, .. } in &records[records.len() - keep..] {
        let _ = writeln!(out, "{date}  {mentions:>8}");
    }
    out
}
