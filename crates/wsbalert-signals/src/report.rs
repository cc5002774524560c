//! HTML report body for the daily alert email.

use chrono::NaiveDate;
use wsbalert_core::Signal;

use crate::types::ClassifiedTicker;

pub const REPORT_SUBJECT: &str = "🚨 WSB Buy/Sell Signal Report";

const EMPTY_BODY: &str = "<p>No significant WSB mention spikes today.</p>";
const FOOTER: &str =
    "<p style='font-size:12px;color:gray;'>Auto-generated by wsbalert from daily mention counts.</p>";

/// A rendered report ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub html: String,
}

/// Render the buy, sell and summary sections for `tickers`.
///
/// Pure and deterministic: the same input always yields byte-identical
/// output. Tickers appear in input order; empty sections are omitted.
#[must_use]
pub fn render_report(tickers: &[ClassifiedTicker], date: NaiveDate) -> Report {
    Report {
        subject: REPORT_SUBJECT.to_string(),
        html: render_html(tickers, date),
    }
}

fn render_html(tickers: &[ClassifiedTicker], date: NaiveDate) -> String {
    if tickers.is_empty() {
        return EMPTY_BODY.to_string();
    }

    let mut buy_lines = String::new();
    let mut sell_lines = String::new();
    let mut summary_lines = String::new();

    for t in tickers {
        let ticker = escape_html(&t.ticker);
        match t.signal {
            Signal::Buy => buy_lines.push_str(&format!(
                "🚀 <b>Buy Signal:</b> {ticker} mentions up to {} ({:.2}x trailing avg {:.1})<br>",
                t.mentions, t.ratio, t.average
            )),
            Signal::Sell => sell_lines.push_str(&format!(
                "⚠️ <b>Sell Signal:</b> {ticker} mentions spiked to {} ({:.2}x trailing avg {:.1})<br>",
                t.mentions, t.ratio, t.average
            )),
            Signal::Neutral => {}
        }

        summary_lines.push_str(&format!(
            "📊 {ticker}: {} mentions, avg {:.1}, ratio {:.2}x",
            t.mentions, t.average, t.ratio
        ));
        if let Some(pct) = t.trend_pct {
            summary_lines.push_str(&format!(", {pct:+.1}% vs yesterday"));
        }
        summary_lines.push_str("<br>");
    }

    let mut html = String::new();
    if !buy_lines.is_empty() {
        html.push_str(&format!("<h3>🚀 Buy Alerts</h3>{buy_lines}<br>"));
    }
    if !sell_lines.is_empty() {
        html.push_str(&format!("<h3>⚠️ Sell Alerts</h3>{sell_lines}<br>"));
    }
    html.push_str(&format!(
        "<h3>📊 Daily Summary ({})</h3>{summary_lines}",
        date.format("%Y-%m-%d")
    ));
    html.push_str(FOOTER);
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
