//! One fetch → persist → classify → notify pass.
//!
//! The three I/O collaborators sit behind small traits so the pass can be
//! driven with in-memory fakes. Fetch and notification failures are logged
//! and absorbed; history failures abort the run.

use anyhow::Context;
use chrono::NaiveDate;
use wsbalert_apewisdom::{ApeWisdomClient, FetchError};
use wsbalert_core::{HistoryWriteMode, Signal, TickerMention};
use wsbalert_history::{HistoryError, HistorySnapshot, HistoryStore};
use wsbalert_notify::{Delivery, NotifyError, SmtpNotifier};
use wsbalert_signals::{render_report, spikes, Report, SignalClassifier};

pub(crate) trait MentionSource {
    async fn fetch(&self) -> Result<Vec<TickerMention>, FetchError>;
}

pub(crate) trait HistoryRepository {
    fn load_history(&self) -> Result<HistorySnapshot, HistoryError>;

    fn persist(
        &self,
        mentions: &[TickerMention],
        date: NaiveDate,
        mode: HistoryWriteMode,
    ) -> Result<usize, HistoryError>;
}

pub(crate) trait ReportNotifier {
    async fn deliver(&self, subject: &str, html: &str) -> Result<Delivery, NotifyError>;
}

impl MentionSource for ApeWisdomClient {
    async fn fetch(&self) -> Result<Vec<TickerMention>, FetchError> {
        self.fetch_mentions().await
    }
}

impl HistoryRepository for HistoryStore {
    fn load_history(&self) -> Result<HistorySnapshot, HistoryError> {
        self.load()
    }

    fn persist(
        &self,
        mentions: &[TickerMention],
        date: NaiveDate,
        mode: HistoryWriteMode,
    ) -> Result<usize, HistoryError> {
        self.record_day(mentions, date, mode)
    }
}

impl ReportNotifier for SmtpNotifier {
    async fn deliver(&self, subject: &str, html: &str) -> Result<Delivery, NotifyError> {
        self.send(subject, html).await
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RunOptions {
    pub today: NaiveDate,
    pub history_mode: HistoryWriteMode,
    /// Skip persistence and delivery; the rendered report is still returned.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeliveryStatus {
    Sent,
    Skipped,
    DryRun,
    Failed(String),
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => f.write_str("sent"),
            Self::Skipped => f.write_str("skipped (no mail credentials)"),
            Self::DryRun => f.write_str("dry run"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub tickers: usize,
    pub spikes: usize,
    pub persisted: usize,
    pub buys: Vec<String>,
    pub sells: Vec<String>,
    pub report: Report,
    pub delivery: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    /// The source returned nothing usable; no other step ran.
    NoData,
    Completed(RunSummary),
}

pub(crate) struct Pipeline<'a, S, H, N> {
    pub source: &'a S,
    pub history: &'a H,
    pub notifier: &'a N,
    pub classifier: SignalClassifier,
    pub options: RunOptions,
}

impl<S, H, N> Pipeline<'_, S, H, N>
where
    S: MentionSource,
    H: HistoryRepository,
    N: ReportNotifier,
{
    /// Run one full cycle.
    ///
    /// # Errors
    ///
    /// Returns an error only if the history store cannot be read or written.
    pub(crate) async fn run(&self) -> anyhow::Result<RunOutcome> {
        let today = self.options.today;

        let mentions = match self.source.fetch().await {
            Ok(mentions) if mentions.is_empty() => {
                tracing::info!("mention source returned no tickers; nothing to do");
                return Ok(RunOutcome::NoData);
            }
            Ok(mentions) => mentions,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch mention counts; nothing to do");
                return Ok(RunOutcome::NoData);
            }
        };
        tracing::info!(tickers = mentions.len(), %today, "fetched mention counts");

        let history = self
            .history
            .load_history()
            .context("failed to load mention history")?;

        let persisted = if self.options.dry_run {
            0
        } else {
            self.history
                .persist(&mentions, today, self.options.history_mode)
                .context("failed to persist mention history")?
        };

        let classified = self.classifier.classify_all(&mentions, &history, today);
        let spiked = spikes(&classified, self.classifier.thresholds().mention_threshold);
        let tickers_with = |signal: Signal| -> Vec<String> {
            spiked
                .iter()
                .filter(|c| c.signal == signal)
                .map(|c| c.ticker.clone())
                .collect()
        };
        let buys = tickers_with(Signal::Buy);
        let sells = tickers_with(Signal::Sell);

        let report = render_report(&spiked, today);

        let delivery = if self.options.dry_run {
            DeliveryStatus::DryRun
        } else {
            match self.notifier.deliver(&report.subject, &report.html).await {
                Ok(Delivery::Sent) => DeliveryStatus::Sent,
                Ok(Delivery::Skipped) => DeliveryStatus::Skipped,
                Err(e) => {
                    tracing::error!(error = %e, "failed to send report email");
                    DeliveryStatus::Failed(e.to_string())
                }
            }
        };

        tracing::info!(
            tickers = mentions.len(),
            spikes = spiked.len(),
            buys = buys.len(),
            sells = sells.len(),
            persisted,
            %delivery,
            "run complete"
        );

        Ok(RunOutcome::Completed(RunSummary {
            tickers: mentions.len(),
            spikes: spiked.len(),
            persisted,
            buys,
            sells,
            report,
            delivery,
        }))
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
