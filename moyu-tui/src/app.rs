//! Application state

use crossbeam_channel::Receiver;
use moyu_core::{Config, Direction, DisplayMode, ReaderSession, SessionEvent};
use std::path::Path;

use crate::input::KeyBindings;

/// Main application state
pub struct App {
    pub config: Config,
    pub session: ReaderSession,
    pub mode: DisplayMode,
    pub should_quit: bool,
    pub bindings: KeyBindings,
    session_events: Receiver<SessionEvent>,
}

impl App {
    /// Create a new application instance around a reader session.
    pub fn new(config: Config, mut session: ReaderSession) -> Self {
        let session_events = session.subscribe();
        let bindings = KeyBindings::from_config(&config.keys);
        Self {
            config,
            session,
            mode: DisplayMode::Stealth,
            should_quit: false,
            bindings,
            session_events,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Switch between the stealth bottom line and the normal page panel.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            DisplayMode::Stealth => DisplayMode::Normal,
            DisplayMode::Normal => DisplayMode::Stealth,
        };
        log::debug!("toggle_mode: now {:?}", self.mode);
    }

    pub fn next_page(&mut self) {
        self.session.advance(self.mode, Direction::Forward);
    }

    pub fn prev_page(&mut self) {
        self.session.advance(self.mode, Direction::Backward);
    }

    /// Digit key `d` jumps to `d * 10` percent of the document.
    pub fn jump_to_digit(&mut self, digit: u32) {
        self.session.jump_to_percent(self.mode, digit as usize * 10);
    }

    pub fn toggle_visibility(&mut self) {
        self.session.toggle_visibility();
    }

    /// Re-open the current file from disk. A failed load keeps the
    /// previous document, so this only logs on error.
    pub fn reopen(&mut self) {
        let path = self.session.current_file_path().to_owned();
        if path.is_empty() {
            log::warn!("reopen: no file to reopen");
            return;
        }
        if let Err(err) = self.session.load(Path::new(&path)) {
            log::warn!("reopen: {err}");
        }
    }

    /// Drain pending session notifications. The next draw picks up the
    /// new state; draining here keeps the channel from growing.
    pub fn drain_session_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.session_events.try_recv() {
            log::trace!("session event: {event:?}");
            count += 1;
        }
        count
    }
}
