use std::env::VarError;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, HistoryWriteMode, MailConfig, SignalPolicy, SignalThresholds};
use crate::ConfigError;

/// Page 1 of the ApeWisdom all-stocks ranking.
pub const DEFAULT_MENTIONS_URL: &str =
    "https://apewisdom.io/api/v1.0/filter/all-stocks/page/1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let optional = |var: &str| non_blank(&lookup, var);
    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let log_level = or_default("WSBALERT_LOG_LEVEL", "info");
    let mentions_url = or_default("WSBALERT_MENTIONS_URL", DEFAULT_MENTIONS_URL);
    let http_timeout_secs = parse_var(&lookup, "WSBALERT_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("WSBALERT_USER_AGENT", "wsbalert/0.1 (mention-tracking)");

    let history_path = PathBuf::from(or_default(
        "WSBALERT_HISTORY_PATH",
        "./mention_history.csv",
    ));
    let history_mode = parse_history_mode(&or_default("WSBALERT_HISTORY_MODE", "upsert"))?;
    let signal_policy = parse_signal_policy(&or_default("WSBALERT_SIGNAL_POLICY", "standard"))?;

    let thresholds = SignalThresholds {
        mention_threshold: parse_var(&lookup, "WSBALERT_MENTION_THRESHOLD", "300")?,
        buy_multiplier: parse_var(&lookup, "WSBALERT_BUY_MULTIPLIER", "1.3")?,
        sell_multiplier: parse_var(&lookup, "WSBALERT_SELL_MULTIPLIER", "2.0")?,
        sell_floor: parse_var(&lookup, "WSBALERT_SELL_FLOOR", "800")?,
        top_n: parse_var(&lookup, "WSBALERT_TOP_N", "3")?,
        average_window_days: parse_var(&lookup, "WSBALERT_AVERAGE_WINDOW_DAYS", "7")?,
        drop_pct: parse_var(&lookup, "WSBALERT_DROP_PCT", "30")?,
        momentum_pct: parse_var(&lookup, "WSBALERT_MOMENTUM_PCT", "20")?,
    };
    validate_thresholds(&thresholds)?;

    let mail = MailConfig {
        smtp_host: or_default("WSBALERT_SMTP_HOST", "smtp.gmail.com"),
        smtp_port: parse_var(&lookup, "WSBALERT_SMTP_PORT", "465")?,
        timeout_secs: parse_var(&lookup, "WSBALERT_SMTP_TIMEOUT_SECS", "30")?,
        sender: optional("GMAIL_ADDRESS"),
        app_password: optional("GMAIL_APP_PASSWORD"),
        recipient: optional("WSBALERT_MAIL_TO"),
    };

    Ok(AppConfig {
        log_level,
        mentions_url,
        http_timeout_secs,
        user_agent,
        history_path,
        history_mode,
        signal_policy,
        thresholds,
        mail,
    })
}

fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: Display,
{
    let raw = non_blank(lookup, var).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// The variable's value, or `None` when it is unset or only whitespace.
fn non_blank<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_history_mode(s: &str) -> Result<HistoryWriteMode, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "append" => Ok(HistoryWriteMode::Append),
        "upsert" => Ok(HistoryWriteMode::Upsert),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WSBALERT_HISTORY_MODE".to_string(),
            reason: format!("expected 'append' or 'upsert', got '{other}'"),
        }),
    }
}

fn parse_signal_policy(s: &str) -> Result<SignalPolicy, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "standard" => Ok(SignalPolicy::Standard),
        "momentum" => Ok(SignalPolicy::Momentum),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WSBALERT_SIGNAL_POLICY".to_string(),
            reason: format!("expected 'standard' or 'momentum', got '{other}'"),
        }),
    }
}

fn validate_thresholds(t: &SignalThresholds) -> Result<(), ConfigError> {
    let invalid = |var: &str, reason: &str| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    };

    if !t.buy_multiplier.is_finite() || t.buy_multiplier <= 0.0 {
        return Err(invalid(
            "WSBALERT_BUY_MULTIPLIER",
            "must be a positive number",
        ));
    }
    if !t.sell_multiplier.is_finite() || t.sell_multiplier <= t.buy_multiplier {
        return Err(invalid(
            "WSBALERT_SELL_MULTIPLIER",
            "must be greater than WSBALERT_BUY_MULTIPLIER",
        ));
    }
    if t.average_window_days == 0 {
        return Err(invalid("WSBALERT_AVERAGE_WINDOW_DAYS", "must be at least 1"));
    }
    if !t.drop_pct.is_finite() || t.drop_pct < 0.0 {
        return Err(invalid("WSBALERT_DROP_PCT", "must be a non-negative number"));
    }
    if !t.momentum_pct.is_finite() {
        return Err(invalid("WSBALERT_MOMENTUM_PCT", "must be a finite number"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
