use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tablegrab_core::TabId;

#[derive(Parser, Debug)]
#[command(name = "tablegrab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export HTML tables to CSV, one page or many")]
#[command(after_help = "EXAMPLES:\n  \
    tablegrab --tab 7 --page page.json list\n  \
    tablegrab --tab 7 --page page.json export 2\n  \
    tablegrab --tab 7 --page page.json start 2\n  \
    tablegrab --tab 7 --page page.json capture\n  \
    tablegrab --tab 7 finish")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Tab the commands act on
    #[arg(short, long, global = true, env = "TABLEGRAB_TAB")]
    pub tab: Option<TabId>,

    /// Page snapshot answering table requests ({"tables":[...]})
    #[arg(short, long, global = true, env = "TABLEGRAB_PAGE")]
    pub page: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the tables found on the page
    List,

    /// Export one table as CSV
    Export {
        /// Table number as shown by `list`
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        table: u64,
    },

    /// Export every table on the page, one file each
    ExportAll,

    /// Start a paginated capture of one table and capture the current page
    Start {
        /// Table number as shown by `list`
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        table: u64,
    },

    /// Capture the current page into the running capture
    Capture,

    /// Export everything captured so far
    Finish,

    /// Discard the running capture
    Clear,

    /// Show the running capture, if any
    Status,
}

/// Zero-based position of a table number from the command line.
pub fn table_index(table: u64) -> usize {
    table.saturating_sub(1) as usize
}
