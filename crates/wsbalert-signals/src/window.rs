//! Trailing-window statistics over a ticker's stored history.

use chrono::{Days, NaiveDate};
use wsbalert_core::TickerSeries;

/// Mean mentions over the `window_days` days before `today`.
///
/// Covers dates `d` with `today - window_days <= d < today`; today's own rows
/// are excluded so the result is the same before or after today is persisted.
/// Returns `0.0` when there is no series or no record in the window.
#[must_use]
pub fn trailing_average(series: Option<&TickerSeries>, today: NaiveDate, window_days: u32) -> f64 {
    let Some(series) = series else {
        return 0.0;
    };
    let Some(start) = today.checked_sub_days(Days::new(u64::from(window_days))) else {
        return 0.0;
    };

    let (sum, count) = series
        .between(start, today)
        .fold((0_u64, 0_u64), |(sum, count), r| {
            (sum.saturating_add(r.mentions), count + 1)
        });

    if count == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let avg = sum as f64 / count as f64;
    avg
}

/// Mentions recorded for the day before `today`.
///
/// When the history holds several rows for that day, the last one wins.
#[must_use]
pub fn previous_day_count(series: Option<&TickerSeries>, today: NaiveDate) -> Option<u64> {
    let yesterday = today.checked_sub_days(Days::new(1))?;
    series?.latest_on(yesterday).map(|r| r.mentions)
}
