//! Validation for the server, heartbeat and reconnect sections.

use crate::schema::AgentChatConfig;

use super::helpers::validate_range;

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &AgentChatConfig) {
    let url = config.server.url.trim();
    if url.is_empty() {
        errors.push("server.url must not be empty".into());
    } else if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        errors.push(format!("server.url = {url} must use ws:// or wss://"));
    }
    if config.server.token_param.trim().is_empty() {
        errors.push("server.token_param must not be empty".into());
    }
    validate_range(
        errors,
        "server.connect_timeout_secs",
        config.server.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "server.close_timeout_ms",
        config.server.close_timeout_ms,
        10,
        30_000,
    );
}

pub(crate) fn validate_heartbeat(errors: &mut Vec<String>, config: &AgentChatConfig) {
    let hb = &config.heartbeat;
    validate_range(errors, "heartbeat.interval_secs", hb.interval_secs, 1, 300);
    validate_range(errors, "heartbeat.timeout_secs", hb.timeout_secs, 2, 900);
    if hb.timeout_secs <= hb.interval_secs {
        errors.push(format!(
            "heartbeat.timeout_secs = {} must exceed heartbeat.interval_secs = {}",
            hb.timeout_secs, hb.interval_secs
        ));
    }
}

pub(crate) fn validate_reconnect(errors: &mut Vec<String>, config: &AgentChatConfig) {
    let rc = &config.reconnect;
    validate_range(errors, "reconnect.base_delay_ms", rc.base_delay_ms, 10, 60_000);
    validate_range(
        errors,
        "reconnect.max_delay_ms",
        rc.max_delay_ms,
        rc.base_delay_ms,
        600_000,
    );
}
