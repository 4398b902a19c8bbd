//! Tests for config validation.

use super::*;

#[test]
fn default_config_is_valid() {
    assert!(validate(&AgentChatConfig::default()).is_ok());
}

#[test]
fn empty_url_is_rejected() {
    let mut config = AgentChatConfig::default();
    config.server.url = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.url must not be empty"));
}

#[test]
fn http_url_is_rejected() {
    let mut config = AgentChatConfig::default();
    config.server.url = "https://example.com/ws".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must use ws:// or wss://"));
}

#[test]
fn heartbeat_timeout_must_exceed_interval() {
    let mut config = AgentChatConfig::default();
    config.heartbeat.interval_secs = 30;
    config.heartbeat.timeout_secs = 30;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must exceed heartbeat.interval_secs"));
}

#[test]
fn reconnect_max_below_base_is_rejected() {
    let mut config = AgentChatConfig::default();
    config.reconnect.base_delay_ms = 5000;
    config.reconnect.max_delay_ms = 1000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("reconnect.max_delay_ms = 1000 is out of range [5000, 600000]"));
}

#[test]
fn all_errors_are_collected() {
    let mut config = AgentChatConfig::default();
    config.server.connect_timeout_secs = 0;
    config.server.close_timeout_ms = 1;
    config.heartbeat.interval_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.connect_timeout_secs"));
    assert!(err.contains("server.close_timeout_ms"));
    assert!(err.contains("heartbeat.interval_secs"));
    assert_eq!(err.matches("; ").count(), 2);
}
