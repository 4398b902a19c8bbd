//! agentchat: command-line client for streaming agent chat sessions.

mod chat;
mod cli;
mod settings;

use agentchat_common::{AgentChatError, Result};
use agentchat_config::AgentChatConfig;
use agentchat_session::StaticCredential;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::chat::Conversation;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Loaded before logging so the config can pick the level.
    let (config, config_error) = match agentchat_config::load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (AgentChatConfig::default(), Some(e)),
    };
    init_logging(args.log_level.as_deref(), &config);

    if let Some(e) = config_error {
        if args.config.is_some() {
            tracing::error!("Config load failed: {e}");
            eprintln!("agentchat: {e}");
            std::process::exit(1);
        }
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    tracing::debug!("agentchat v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args, config).await {
        tracing::error!(error = %e, "agentchat failed");
        eprintln!("agentchat: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so streamed replies on stdout stay clean. An explicit
/// `--log-level` beats `RUST_LOG`, which beats `[logging] level`.
fn init_logging(flag: Option<&str>, config: &AgentChatConfig) {
    let from_env = match flag {
        Some(_) => None,
        None => EnvFilter::try_from_default_env().ok(),
    };
    let filter =
        from_env.unwrap_or_else(|| EnvFilter::new(settings::log_directive(flag, config)));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(args: cli::Args, config: AgentChatConfig) -> Result<()> {
    let agent_id = args
        .agent
        .or(config.chat.default_agent_id)
        .ok_or_else(|| {
            AgentChatError::Other(
                "no agent given; pass --agent or set [chat] default_agent_id".into(),
            )
        })?;

    let session_config = settings::session_config(&config, args.url.as_deref());
    let credential = args
        .token
        .map(StaticCredential::new)
        .unwrap_or_else(StaticCredential::none);

    let mut chat = Conversation::new(session_config, credential, agent_id, args.thread);
    chat.open().await?;

    let outcome = match args.message {
        Some(message) => chat.ask(&message).await.map(|_| ()),
        None => interactive(&mut chat).await,
    };
    chat.close().await;
    outcome
}

/// One request per stdin line until EOF.
async fn interactive(chat: &mut Conversation) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = chat.ask(line).await {
            eprintln!("error: {e}");
            if !chat.is_connected() {
                tracing::info!("Connection lost; reconnecting");
                chat.open().await?;
            }
        }
    }
    Ok(())
}
