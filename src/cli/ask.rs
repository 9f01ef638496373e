//! CLI `ask` command — run one message through the full pipeline and print the outcome.

use anyhow::{bail, Result};

use crate::config::EllaConfig;
use crate::orchestrator::ChatResult;

pub async fn ask(config: &EllaConfig, author: &str, message: &str) -> Result<()> {
    let orchestrator = crate::server::build_orchestrator(config)?;

    match orchestrator.handle_message(author, message).await {
        ChatResult::Clarify { text } => println!("{text}"),
        ChatResult::Answer {
            prior_context,
            response,
        } => {
            println!("Context ({} turn(s)):", prior_context.len());
            for turn in &prior_context {
                println!("  [{}] {}: {}", turn.timestamp_rfc3339(), turn.author, turn.content);
            }
            println!();
            println!("{response}");
        }
        ChatResult::Failure { kind, detail } => bail!("{kind} failure: {detail}"),
    }

    Ok(())
}
