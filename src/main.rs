use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ella::{cli, config, server};

#[derive(Parser)]
#[command(name = "ella", version, about = "Chat backend with thread memory and semantic recall")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP chat server
    Serve,
    /// Send one message through the pipeline and print the result
    Ask {
        /// Message text
        message: String,
        /// Author recorded for the message
        #[arg(long, default_value = "user")]
        author: String,
    },
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::EllaConfig::load()?;

    // Log to stderr so `ask` output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Ask { message, author } => cli::ask(&config, &author, &message).await?,
        Command::Doctor => cli::doctor(&config)?,
    }

    Ok(())
}
