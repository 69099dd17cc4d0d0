//! Event types for the main loop

use crossterm::event::KeyEvent;

/// One iteration's worth of input: a key press, or nothing.
#[derive(Debug)]
pub enum AppEvent {
    /// User input
    Input(KeyEvent),
    /// Poll timeout elapsed with no input
    Tick,
}
