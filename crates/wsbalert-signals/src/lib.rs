//! Mention-spike classification and report rendering.
//!
//! Compares each ticker's mention count today against its trailing average
//! and the previous day's count, labels it buy/sell/neutral, and renders the
//! labelled set as an HTML report body. Everything here is pure: no I/O.

pub mod classifier;
pub mod report;
pub mod types;
pub mod window;

pub use classifier::{mention_ratio, spikes, top_tickers, trend_pct, SignalClassifier, SignalInput};
pub use report::{render_report, Report, REPORT_SUBJECT};
pub use types::ClassifiedTicker;
pub use window::{previous_day_count, trailing_average};
