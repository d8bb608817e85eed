//! Fieldnote CLI - command-line interface for the field-note engine.

use clap::Parser;
use fieldnote_cli::{ops, Cli, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });
    if let Some(user) = cli.user {
        config.user_id = user;
    }
    if let Some(database) = cli.database {
        config.database = database;
    }

    ops::execute(cli.command, &config).await?;
    Ok(())
}
