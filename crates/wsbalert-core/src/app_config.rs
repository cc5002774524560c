use std::path::PathBuf;

/// How the history store writes a day's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWriteMode {
    /// Append one row per record; repeated same-day runs accumulate rows.
    Append,
    /// Replace any existing rows for the same `(date, ticker)` key.
    Upsert,
}

impl std::fmt::Display for HistoryWriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryWriteMode::Append => write!(f, "append"),
            HistoryWriteMode::Upsert => write!(f, "upsert"),
        }
    }
}

/// Which classification rule set the signal classifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicy {
    /// Ratio bands against the trailing average, sell gated on volume or rank.
    Standard,
    /// Ratio bands combined with day-over-day drop and momentum checks.
    Momentum,
}

impl std::fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalPolicy::Standard => write!(f, "standard"),
            SignalPolicy::Momentum => write!(f, "momentum"),
        }
    }
}

/// Numeric cut-offs used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// Minimum mentions today for a ticker to count as a spike.
    pub mention_threshold: u64,
    /// Lower bound (inclusive) of the buy ratio band.
    pub buy_multiplier: f64,
    /// Ratio at or above which a spike is a sell candidate.
    pub sell_multiplier: f64,
    /// Raw mention count that qualifies a sell without a top-rank placement.
    pub sell_floor: u64,
    /// Number of highest-mention tickers that qualify a sell regardless of the floor.
    pub top_n: usize,
    /// Days of history averaged for the ratio, excluding today.
    pub average_window_days: u32,
    /// Day-over-day percentage drop that triggers a sell under the momentum policy.
    pub drop_pct: f64,
    /// Day-over-day percentage gain required for a buy under the momentum policy.
    pub momentum_pct: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            mention_threshold: 300,
            buy_multiplier: 1.3,
            sell_multiplier: 2.0,
            sell_floor: 800,
            top_n: 3,
            average_window_days: 7,
            drop_pct: 30.0,
            momentum_pct: 20.0,
        }
    }
}

/// SMTP relay settings for the report email.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout_secs: u64,
    pub sender: Option<String>,
    pub app_password: Option<String>,
    pub recipient: Option<String>,
}

impl MailConfig {
    /// Recipient address, falling back to the sender when none is configured.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref().or(self.sender.as_deref())
    }

    /// `true` when both a sender address and its secret are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.sender.is_some() && self.app_password.is_some()
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("timeout_secs", &self.timeout_secs)
            .field("sender", &self.sender)
            .field(
                "app_password",
                &self.app_password.as_ref().map(|_| "[redacted]"),
            )
            .field("recipient", &self.recipient)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub mentions_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub history_path: PathBuf,
    pub history_mode: HistoryWriteMode,
    pub signal_policy: SignalPolicy,
    pub thresholds: SignalThresholds,
    pub mail: MailConfig,
}
