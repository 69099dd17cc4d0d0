//! Moyu - a plain-text novel reader disguised as a console window

use anyhow::{Context, Result};
use clap::Parser;
use moyu_core::{Config, ProgressStore, ReaderSession};
use moyu_tui::App;
use std::path::{Path, PathBuf};

/// A stealth TUI novel reader
#[derive(Parser, Debug)]
#[command(name = "moyu")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a novel file; defaults to the last one opened
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Load reading progress, migrating older files on the way in
    let progress = ProgressStore::load().context("Failed to load reading progress")?;

    let mut session = ReaderSession::new(config.reading.clone(), progress);

    match args.file {
        Some(path) => {
            session
                .load(&path)
                .with_context(|| format!("Failed to load novel: {}", path.display()))?;
        }
        None => {
            // Reopen the previous novel if there was one. A stale path
            // is not fatal; the reader just starts empty.
            let last = session.progress().last_file.clone();
            if last.is_empty() {
                log::info!("no file argument and no previous novel, starting empty");
            } else if let Err(err) = session.load(Path::new(&last)) {
                log::warn!("could not reopen {last}: {err}");
            }
        }
    }

    // Run TUI
    let mut app = App::new(config, session);
    let result = moyu_tui::run(&mut app);

    // Flush progress even when the loop errored
    if let Err(err) = app.session.progress().save() {
        log::warn!("failed to save reading progress: {err}");
    }

    result.context("TUI application error")
}
