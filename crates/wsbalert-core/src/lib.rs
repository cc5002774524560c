//! Shared domain types and configuration for the wsbalert workspace.

mod app_config;
mod config;
mod mentions;

use thiserror::Error;

pub use app_config::{AppConfig, HistoryWriteMode, MailConfig, SignalPolicy, SignalThresholds};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_MENTIONS_URL};
pub use mentions::{MentionRecord, Signal, TickerMention, TickerSeries};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
