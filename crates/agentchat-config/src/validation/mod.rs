//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator runs them all and
//! collects every problem into a single `ConfigError`.

mod connection;
mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::AgentChatConfig;
use agentchat_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AgentChatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    connection::validate_server(&mut errors, config);
    connection::validate_heartbeat(&mut errors, config);
    connection::validate_reconnect(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
