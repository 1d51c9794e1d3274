//! tablegrab - command line shell
//!
//! Drives the same popup coordinator the browser extension uses. The page
//! is a JSON snapshot file instead of a live content script.

mod args;
mod commands;
mod page;

use clap::Parser;
use std::process;
use std::sync::Arc;

use tablegrab_core::{Config, MessagingProvider, Popup, Status};

use args::Cli;
use commands::Reported;
use page::PageSnapshotChannel;

#[tokio::main]
async fn main() {
    tablegrab_core::init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let status = match e.downcast_ref::<Reported>() {
            Some(Reported(status)) => status.clone(),
            None => Status::error(format!("Error: {:#}", e)),
        };
        eprintln!("{}", status);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)?;

    tracing::debug!(
        config = %config_path.display(),
        tab_id = ?cli.tab,
        command = ?cli.command,
        "Running command"
    );

    let provider = Arc::new(MessagingProvider::new(PageSnapshotChannel::new(cli.page.clone())));
    let popup = Popup::new(&config, cli.tab, provider)?;

    commands::execute(&popup, &cli.command).await
}
