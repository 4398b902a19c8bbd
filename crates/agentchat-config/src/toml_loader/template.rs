//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# agentchat configuration
# Only override what you want to change -- missing fields use defaults.

[server]
url = "ws://127.0.0.1:8000/ws/chat"
# token_param = "token"
# connect_timeout_secs = 15   # 1-120
# close_timeout_ms = 2000     # 10-30000

[heartbeat]
# interval_secs = 25          # 1-300
# timeout_secs = 60           # 2-900, must exceed interval_secs

[reconnect]
# enabled = false
# base_delay_ms = 1000        # 10-60000
# max_delay_ms = 30000        # >= base_delay_ms, <= 600000
# max_attempts = 5            # 0 = retry forever

[chat]
# default_agent_id = 1

[logging]
# level = "info"              # debug, info, warn, error
"##
}
