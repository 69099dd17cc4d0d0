//! Moyu TUI - Terminal user interface components
//!
//! This crate contains all ratatui/crossterm integration:
//! - App state management
//! - Event loop and input handling
//! - Rendering (console disguise, page panel, stealth bottom line)

pub mod app;
pub mod event;
pub mod input;
pub mod terminal;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use std::time::Duration;

// Re-export main types
pub use app::App;
pub use event::AppEvent;

/// Run the TUI application. The caller keeps the app so it can flush
/// state after the terminal is released.
pub fn run(app: &mut App) -> Result<()> {
    let mut terminal = terminal::init().context("Failed to initialize terminal")?;

    // Main event loop
    let result = run_loop(&mut terminal, app);

    // Always restore terminal, even if run_loop fails
    terminal::restore().context("Failed to restore terminal")?;

    result
}

fn run_loop(terminal: &mut terminal::Tui, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal
            .draw(|frame| ui::draw(frame, app))
            .context("Failed to draw frame")?;

        // Check if we should quit
        if app.should_quit {
            break;
        }

        // Poll for events with timeout
        let event = if crossterm::event::poll(Duration::from_millis(100))
            .context("Failed to poll events")?
        {
            match crossterm::event::read().context("Failed to read event")? {
                // Only handle key press events, ignore release
                Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Input(key),
                _ => AppEvent::Tick,
            }
        } else {
            AppEvent::Tick
        };

        match event {
            AppEvent::Input(key) => {
                input::handle_input(app, key);
            }
            AppEvent::Tick => {}
        }

        // Session notifications only mark state we already re-draw each
        // iteration; drain them so the channel stays empty.
        app.drain_session_events();
    }

    Ok(())
}
