use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_environment() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.mentions_url, DEFAULT_MENTIONS_URL);
    assert_eq!(cfg.http_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "wsbalert/0.1 (mention-tracking)");
    assert_eq!(cfg.history_path, PathBuf::from("./mention_history.csv"));
    assert_eq!(cfg.history_mode, HistoryWriteMode::Upsert);
    assert_eq!(cfg.signal_policy, SignalPolicy::Standard);
    assert_eq!(cfg.thresholds, SignalThresholds::default());
    assert_eq!(cfg.mail.smtp_host, "smtp.gmail.com");
    assert_eq!(cfg.mail.smtp_port, 465);
    assert_eq!(cfg.mail.timeout_secs, 30);
    assert!(cfg.mail.sender.is_none());
    assert!(!cfg.mail.has_credentials());
}

#[test]
fn default_thresholds_match_documented_constants() {
    let t = SignalThresholds::default();
    assert_eq!(t.mention_threshold, 300);
    assert!((t.buy_multiplier - 1.3).abs() < f64::EPSILON);
    assert!((t.sell_multiplier - 2.0).abs() < f64::EPSILON);
    assert_eq!(t.sell_floor, 800);
    assert_eq!(t.top_n, 3);
    assert_eq!(t.average_window_days, 7);
}

#[test]
fn threshold_overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_MENTION_THRESHOLD", "150");
    map.insert("WSBALERT_BUY_MULTIPLIER", "1.5");
    map.insert("WSBALERT_SELL_MULTIPLIER", "3");
    map.insert("WSBALERT_TOP_N", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.thresholds.mention_threshold, 150);
    assert!((cfg.thresholds.buy_multiplier - 1.5).abs() < f64::EPSILON);
    assert!((cfg.thresholds.sell_multiplier - 3.0).abs() < f64::EPSILON);
    assert_eq!(cfg.thresholds.top_n, 5);
}

#[test]
fn invalid_mention_threshold_fails() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_MENTION_THRESHOLD", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WSBALERT_MENTION_THRESHOLD"),
        "expected InvalidEnvVar(WSBALERT_MENTION_THRESHOLD), got: {result:?}"
    );
}

#[test]
fn sell_multiplier_must_exceed_buy_multiplier() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_BUY_MULTIPLIER", "2.0");
    map.insert("WSBALERT_SELL_MULTIPLIER", "1.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WSBALERT_SELL_MULTIPLIER"),
        "expected InvalidEnvVar(WSBALERT_SELL_MULTIPLIER), got: {result:?}"
    );
}

#[test]
fn zero_average_window_fails() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_AVERAGE_WINDOW_DAYS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WSBALERT_AVERAGE_WINDOW_DAYS"),
        "expected InvalidEnvVar(WSBALERT_AVERAGE_WINDOW_DAYS), got: {result:?}"
    );
}

#[test]
fn history_mode_append_is_accepted_case_insensitively() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_HISTORY_MODE", "Append");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.history_mode, HistoryWriteMode::Append);
}

#[test]
fn unknown_history_mode_fails() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_HISTORY_MODE", "overwrite");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WSBALERT_HISTORY_MODE"),
        "expected InvalidEnvVar(WSBALERT_HISTORY_MODE), got: {result:?}"
    );
}

#[test]
fn momentum_policy_is_selectable() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_SIGNAL_POLICY", "momentum");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.signal_policy, SignalPolicy::Momentum);
}

#[test]
fn invalid_smtp_port_fails() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_SMTP_PORT", "99999");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WSBALERT_SMTP_PORT"),
        "expected InvalidEnvVar(WSBALERT_SMTP_PORT), got: {result:?}"
    );
}

#[test]
fn recipient_defaults_to_sender() {
    let mut map = HashMap::new();
    map.insert("GMAIL_ADDRESS", "alerts@example.com");
    map.insert("GMAIL_APP_PASSWORD", "app-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.mail.has_credentials());
    assert_eq!(cfg.mail.recipient(), Some("alerts@example.com"));
}

#[test]
fn explicit_recipient_overrides_sender() {
    let mut map = HashMap::new();
    map.insert("GMAIL_ADDRESS", "alerts@example.com");
    map.insert("WSBALERT_MAIL_TO", "desk@example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.mail.recipient(), Some("desk@example.com"));
}

#[test]
fn blank_credentials_are_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("GMAIL_ADDRESS", "   ");
    map.insert("GMAIL_APP_PASSWORD", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.mail.sender.is_none());
    assert!(cfg.mail.app_password.is_none());
}

#[test]
fn blank_settings_fall_back_to_defaults() {
    let mut map = HashMap::new();
    map.insert("WSBALERT_SMTP_PORT", "");
    map.insert("WSBALERT_TOP_N", "  ");
    map.insert("WSBALERT_HISTORY_MODE", "");
    map.insert("WSBALERT_SIGNAL_POLICY", " ");
    map.insert("WSBALERT_LOG_LEVEL", "");
    map.insert("WSBALERT_MENTIONS_URL", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.mail.smtp_port, 465);
    assert_eq!(cfg.thresholds.top_n, 3);
    assert_eq!(cfg.history_mode, HistoryWriteMode::Upsert);
    assert_eq!(cfg.signal_policy, SignalPolicy::Standard);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.mentions_url, DEFAULT_MENTIONS_URL);
}

#[test]
fn debug_output_redacts_app_password() {
    let mut map = HashMap::new();
    map.insert("GMAIL_ADDRESS", "alerts@example.com");
    map.insert("GMAIL_APP_PASSWORD", "super-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
