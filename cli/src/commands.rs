//! One function per subcommand
//!
//! Each invocation plays one popup open: restore the tab's capture, scan
//! the page, perform the command, print the status line.

use anyhow::{bail, Result};
use thiserror::Error;

use tablegrab_core::{Popup, SavedExport, Status};

use crate::args::{table_index, Command};

/// A failure already phrased as a status line; printed as is.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct Reported(pub Status);

pub async fn execute(popup: &Popup, command: &Command) -> Result<()> {
    let opened = popup.open().await?;

    match command {
        Command::List => list(popup, &opened).await,
        Command::Export { table } => {
            let saved = popup.export_table(table_index(*table)).await?;
            print_export(&saved);
            Ok(())
        }
        Command::ExportAll => export_all(popup).await,
        Command::Start { table } => {
            let outcome = popup.start_capture(table_index(*table)).await?;
            println!("{}", Status::captured(&outcome));
            Ok(())
        }
        Command::Capture => {
            let outcome = popup.capture_page().await?;
            println!("{}", Status::captured(&outcome));
            Ok(())
        }
        Command::Finish => {
            let saved = popup.finish_capture().await?;
            print_export(&saved);
            Ok(())
        }
        Command::Clear => {
            let status = if popup.clear_capture().await? {
                Status::info("Capture cleared")
            } else {
                Status::info("No capture in progress")
            };
            println!("{}", status);
            Ok(())
        }
        Command::Status => {
            println!("{}", Status::session(popup.capture_session().await.as_ref()));
            Ok(())
        }
    }
}

async fn list(popup: &Popup, opened: &Status) -> Result<()> {
    if opened.is_error() {
        return Err(Reported(opened.clone()).into());
    }

    println!("{}", opened);
    for entry in popup.table_entries().await {
        println!("{:>3}. {} ({})", entry.index + 1, entry.title, entry.summary);
    }

    if let Some(session) = popup.capture_session().await {
        println!("{}", Status::session(Some(&session)));
    }

    Ok(())
}

async fn export_all(popup: &Popup) -> Result<()> {
    let results = popup.export_all().await?;
    let total = results.len();
    let mut failed = 0;

    for result in results {
        match result {
            Ok(saved) => print_export(&saved),
            Err(e) => {
                failed += 1;
                eprintln!("{}", Status::error(format!("Error: {}", e)));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} exports failed", failed, total);
    }
    Ok(())
}

fn print_export(saved: &SavedExport) {
    println!("{} -> {}", Status::exported(saved), saved.path.display());
}
