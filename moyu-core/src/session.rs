//! Reading session: the single owner of the loaded novel
//!
//! The session holds the current document, one cursor per display mode,
//! the visibility flag, and the progress store. It is the only mutator
//! of reading progress for the open file. Hosts observe changes through
//! `subscribe`; notification is fire-and-forget over unbounded channels,
//! with no ordering guarantee between subscribers.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;

use crate::config::ReadingConfig;
use crate::doc::{Document, LoadError};
use crate::progress::ProgressStore;

/// The two ways a novel is shown: one fixed-width line at a time, or a
/// multi-line page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Stealth,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Broadcast to subscribers after every state-mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Loaded,
    Moved(DisplayMode),
    VisibilityChanged(bool),
}

const NO_NOVEL: &str = "[No novel loaded]";

/// Padding for short stealth lines; full-width so CJK text keeps a
/// stable left-aligned column.
const PAD: char = '\u{3000}';

pub struct ReaderSession {
    doc: Option<Document>,
    current_file: String,
    visible: bool,
    stealth_cursor: usize,
    normal_cursor: usize,
    reading: ReadingConfig,
    progress: ProgressStore,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl ReaderSession {
    pub fn new(reading: ReadingConfig, progress: ProgressStore) -> Self {
        Self {
            doc: None,
            current_file: String::new(),
            visible: true,
            stealth_cursor: 0,
            normal_cursor: 0,
            reading,
            progress,
            subscribers: Vec::new(),
        }
    }

    /// Register a change subscriber. The returned receiver sees every
    /// event fired after this call; dropping it unregisters it.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    // ========== File loading ==========

    /// Load a novel, replacing any previously loaded document and
    /// restoring both cursors from the progress store.
    ///
    /// A stored position at or past the end of the new document resets
    /// to line 0 rather than clamping to the last line.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let doc = Document::load(path)?;
        let key = path.to_string_lossy().into_owned();
        let len = doc.line_count();

        self.progress.last_file = key.clone();
        self.stealth_cursor = restore(self.progress.get(DisplayMode::Stealth, &key), len);
        self.normal_cursor = restore(self.progress.get(DisplayMode::Normal, &key), len);
        log::info!(
            "load: {} lines, stealth@{}, normal@{}",
            len,
            self.stealth_cursor,
            self.normal_cursor
        );

        self.current_file = key;
        self.doc = Some(doc);
        self.visible = true;
        self.notify(SessionEvent::Loaded);
        Ok(())
    }

    // ========== Navigation ==========

    /// Move the cursor for `mode`: one line in stealth, one page in
    /// normal. Clamps at both document edges; the last page before an
    /// edge may be short.
    pub fn advance(&mut self, mode: DisplayMode, direction: Direction) {
        let len = match &self.doc {
            Some(doc) => doc.line_count(),
            None => return,
        };
        let step = match mode {
            DisplayMode::Stealth => 1,
            DisplayMode::Normal => self.reading.page_size,
        };
        let cursor = self.cursor_mut(mode);
        *cursor = match direction {
            Direction::Forward => (*cursor + step).min(len - 1),
            Direction::Backward => cursor.saturating_sub(step),
        };
        self.persist(mode);
        self.notify(SessionEvent::Moved(mode));
    }

    /// Jump the cursor for `mode` to `percent` of the document,
    /// biased toward the earlier line on inexact division.
    pub fn jump_to_percent(&mut self, mode: DisplayMode, percent: usize) {
        let len = match &self.doc {
            Some(doc) => doc.line_count(),
            None => return,
        };
        let percent = percent.min(100) as u64;
        *self.cursor_mut(mode) = (percent * (len as u64 - 1) / 100) as usize;
        self.persist(mode);
        self.notify(SessionEvent::Moved(mode));
    }

    fn cursor_mut(&mut self, mode: DisplayMode) -> &mut usize {
        match mode {
            DisplayMode::Stealth => &mut self.stealth_cursor,
            DisplayMode::Normal => &mut self.normal_cursor,
        }
    }

    fn persist(&mut self, mode: DisplayMode) {
        if !self.current_file.is_empty() {
            let line = self.cursor(mode);
            let key = std::mem::take(&mut self.current_file);
            self.progress.set(mode, &key, line);
            self.current_file = key;
        }
    }

    // ========== Rendering queries ==========

    /// The single stealth-mode line, truncated or padded with full-width
    /// spaces to exactly `stealth_width` chars (width 0 = untouched).
    pub fn render_stealth_line(&self) -> String {
        let doc = match &self.doc {
            Some(doc) => doc,
            None => return NO_NOVEL.to_string(),
        };
        let line = &doc.lines[self.stealth_cursor];
        let width = self.reading.stealth_width;
        if width == 0 {
            return line.clone();
        }
        let count = line.chars().count();
        if count > width {
            line.chars().take(width).collect()
        } else {
            let mut padded = line.clone();
            padded.extend(std::iter::repeat(PAD).take(width - count));
            padded
        }
    }

    /// The normal-mode page window, with overlong lines split into
    /// fixed-width char chunks (the final chunk may be short).
    pub fn render_normal_page(&self) -> Vec<String> {
        let doc = match &self.doc {
            Some(doc) => doc,
            None => return Vec::new(),
        };
        let width = self.reading.normal_width;
        let end = (self.normal_cursor + self.reading.page_size).min(doc.line_count());
        let mut out = Vec::new();
        for line in &doc.lines[self.normal_cursor..end] {
            if width > 0 && line.chars().count() > width {
                let chars: Vec<char> = line.chars().collect();
                for chunk in chars.chunks(width) {
                    out.push(chunk.iter().collect());
                }
            } else {
                out.push(line.clone());
            }
        }
        out
    }

    /// `"[current/total] percent%"` for the given mode, empty when no
    /// document is loaded. Percent truncates toward zero.
    pub fn status_text(&self, mode: DisplayMode) -> String {
        let doc = match &self.doc {
            Some(doc) => doc,
            None => return String::new(),
        };
        let cursor = self.cursor(mode);
        let total = doc.line_count();
        let percent = cursor as u64 * 100 / total as u64;
        format!("[{}/{}] {}%", cursor + 1, total, percent)
    }

    // ========== Shared state ==========

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
        log::info!("toggle_visibility: visible={}", self.visible);
        self.notify(SessionEvent::VisibilityChanged(self.visible));
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_content(&self) -> bool {
        self.doc.is_some()
    }

    pub fn total_lines(&self) -> usize {
        self.doc.as_ref().map_or(0, Document::line_count)
    }

    pub fn current_file_path(&self) -> &str {
        &self.current_file
    }

    pub fn cursor(&self, mode: DisplayMode) -> usize {
        match mode {
            DisplayMode::Stealth => self.stealth_cursor,
            DisplayMode::Normal => self.normal_cursor,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressStore {
        &mut self.progress
    }
}

fn restore(stored: usize, len: usize) -> usize {
    if stored >= len {
        0
    } else {
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn reading(stealth_width: usize, page_size: usize, normal_width: usize) -> ReadingConfig {
        ReadingConfig {
            stealth_width,
            page_size,
            normal_width,
        }
    }

    fn session_with(content: &str, cfg: ReadingConfig) -> (ReaderSession, NamedTempFile) {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write content");
        file.flush().expect("flush");

        let mut session = ReaderSession::new(cfg, ProgressStore::default());
        session.load(file.path()).expect("load novel");
        (session, file)
    }

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_empty_session_queries() {
        let session = ReaderSession::new(ReadingConfig::default(), ProgressStore::default());
        assert!(!session.has_content());
        assert_eq!(session.total_lines(), 0);
        assert_eq!(session.current_file_path(), "");
        assert_eq!(session.render_stealth_line(), "[No novel loaded]");
        assert!(session.render_normal_page().is_empty());
        assert_eq!(session.status_text(DisplayMode::Normal), "");
    }

    #[test]
    fn test_navigation_is_noop_when_empty() {
        let mut session = ReaderSession::new(ReadingConfig::default(), ProgressStore::default());
        session.advance(DisplayMode::Stealth, Direction::Forward);
        session.jump_to_percent(DisplayMode::Normal, 50);
        assert_eq!(session.cursor(DisplayMode::Stealth), 0);
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
    }

    #[test]
    fn test_load_populates_session() {
        let (session, file) = session_with("Hello\nWorld\nEnd\n", reading(0, 2, 0));
        assert!(session.has_content());
        assert!(session.is_visible());
        assert_eq!(session.total_lines(), 3);
        assert_eq!(
            session.current_file_path(),
            file.path().to_string_lossy().as_ref()
        );
    }

    #[test]
    fn test_stealth_advance_moves_one_line() {
        let (mut session, _file) = session_with(&numbered_lines(5), reading(0, 2, 0));
        session.advance(DisplayMode::Stealth, Direction::Forward);
        assert_eq!(session.cursor(DisplayMode::Stealth), 1);
        session.advance(DisplayMode::Stealth, Direction::Backward);
        assert_eq!(session.cursor(DisplayMode::Stealth), 0);
    }

    #[test]
    fn test_stealth_clamps_at_both_edges() {
        let (mut session, _file) = session_with(&numbered_lines(3), reading(0, 2, 0));
        session.advance(DisplayMode::Stealth, Direction::Backward);
        assert_eq!(session.cursor(DisplayMode::Stealth), 0);
        for _ in 0..10 {
            session.advance(DisplayMode::Stealth, Direction::Forward);
        }
        assert_eq!(session.cursor(DisplayMode::Stealth), 2);
    }

    #[test]
    fn test_normal_advance_moves_page_size() {
        let (mut session, _file) = session_with(&numbered_lines(20), reading(0, 5, 0));
        session.advance(DisplayMode::Normal, Direction::Forward);
        assert_eq!(session.cursor(DisplayMode::Normal), 5);
        session.advance(DisplayMode::Normal, Direction::Backward);
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
    }

    #[test]
    fn test_cursors_are_independent() {
        let (mut session, _file) = session_with(&numbered_lines(20), reading(0, 5, 0));
        session.advance(DisplayMode::Stealth, Direction::Forward);
        session.advance(DisplayMode::Stealth, Direction::Forward);
        assert_eq!(session.cursor(DisplayMode::Stealth), 2);
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
    }

    #[test]
    fn test_end_to_end_three_line_pagination() {
        let (mut session, _file) = session_with("Hello\nWorld\nEnd\n", reading(0, 2, 0));
        assert_eq!(session.render_normal_page(), vec!["Hello", "World"]);

        session.advance(DisplayMode::Normal, Direction::Forward);
        assert_eq!(session.cursor(DisplayMode::Normal), 2);
        assert_eq!(session.render_normal_page(), vec!["End"]);
    }

    #[test]
    fn test_jump_to_percent_floor_bias() {
        let (mut session, _file) = session_with(&numbered_lines(10), reading(0, 2, 0));
        session.jump_to_percent(DisplayMode::Normal, 50);
        // floor(50 * 9 / 100) = 4
        assert_eq!(session.cursor(DisplayMode::Normal), 4);
    }

    #[test]
    fn test_jump_to_percent_boundaries() {
        let (mut session, _file) = session_with(&numbered_lines(10), reading(0, 2, 0));
        session.jump_to_percent(DisplayMode::Normal, 0);
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
        session.jump_to_percent(DisplayMode::Normal, 100);
        assert_eq!(session.cursor(DisplayMode::Normal), 9);
        session.jump_to_percent(DisplayMode::Normal, 250);
        assert_eq!(session.cursor(DisplayMode::Normal), 9);
    }

    #[test]
    fn test_stealth_line_truncates_to_width() {
        let (session, _file) = session_with("abcdefghijklmnop\n", reading(10, 2, 0));
        assert_eq!(session.render_stealth_line(), "abcdefghij");
    }

    #[test]
    fn test_stealth_line_pads_with_ideographic_space() {
        let (session, _file) = session_with("abc\n", reading(10, 2, 0));
        let line = session.render_stealth_line();
        assert_eq!(line.chars().count(), 10);
        assert!(line.starts_with("abc"));
        assert!(line.ends_with('\u{3000}'));
    }

    #[test]
    fn test_stealth_width_zero_leaves_line_alone() {
        let (session, _file) = session_with("abc\n", reading(0, 2, 0));
        assert_eq!(session.render_stealth_line(), "abc");
    }

    #[test]
    fn test_stealth_width_counts_chars_not_bytes() {
        let (session, _file) = session_with("\u{4E00}\u{4E8C}\u{4E09}\u{56DB}\n", reading(2, 2, 0));
        assert_eq!(session.render_stealth_line(), "\u{4E00}\u{4E8C}");
    }

    #[test]
    fn test_normal_page_wraps_long_lines() {
        let line = "a".repeat(25);
        let (session, _file) = session_with(&format!("{line}\n"), reading(0, 1, 10));
        let page = session.render_normal_page();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].len(), 10);
        assert_eq!(page[1].len(), 10);
        assert_eq!(page[2].len(), 5);
    }

    #[test]
    fn test_normal_page_passes_short_lines_through() {
        let (session, _file) = session_with("short\nalso short\n", reading(0, 5, 20));
        assert_eq!(session.render_normal_page(), vec!["short", "also short"]);
    }

    #[test]
    fn test_status_text_format() {
        let (mut session, _file) = session_with("Hello\nWorld\nEnd\n", reading(0, 2, 0));
        assert_eq!(session.status_text(DisplayMode::Stealth), "[1/3] 0%");
        session.advance(DisplayMode::Stealth, Direction::Forward);
        session.advance(DisplayMode::Stealth, Direction::Forward);
        assert_eq!(session.status_text(DisplayMode::Stealth), "[3/3] 66%");
    }

    #[test]
    fn test_toggle_visibility_is_involutive() {
        let (mut session, _file) = session_with("Hello\n", reading(0, 2, 0));
        let before = session.is_visible();
        let cursor = session.cursor(DisplayMode::Normal);
        session.toggle_visibility();
        assert_eq!(session.is_visible(), !before);
        session.toggle_visibility();
        assert_eq!(session.is_visible(), before);
        assert_eq!(session.cursor(DisplayMode::Normal), cursor);
    }

    #[test]
    fn test_progress_round_trip_across_sessions() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(numbered_lines(30).as_bytes()).unwrap();
        file.flush().unwrap();

        let mut first = ReaderSession::new(reading(0, 5, 0), ProgressStore::default());
        first.load(file.path()).unwrap();
        first.advance(DisplayMode::Normal, Direction::Forward);
        first.advance(DisplayMode::Normal, Direction::Forward);
        assert_eq!(first.cursor(DisplayMode::Normal), 10);
        let store = first.progress().clone();

        let mut second = ReaderSession::new(reading(0, 5, 0), store);
        second.load(file.path()).unwrap();
        assert_eq!(second.cursor(DisplayMode::Normal), 10);
        assert_eq!(second.cursor(DisplayMode::Stealth), 0);
    }

    #[test]
    fn test_stale_progress_resets_to_zero() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"one\ntwo\nthree\n").unwrap();
        file.flush().unwrap();
        let key = file.path().to_string_lossy().into_owned();

        let mut store = ProgressStore::default();
        store.set(DisplayMode::Normal, &key, 3);
        store.set(DisplayMode::Stealth, &key, 2);

        let mut session = ReaderSession::new(reading(0, 2, 0), store);
        session.load(file.path()).unwrap();
        // 3 >= 3 resets to 0; 2 is still in range and survives.
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
        assert_eq!(session.cursor(DisplayMode::Stealth), 2);
    }

    #[test]
    fn test_reload_replaces_document() {
        let (mut session, _file) = session_with(&numbered_lines(10), reading(0, 2, 0));
        session.advance(DisplayMode::Normal, Direction::Forward);

        let mut other = NamedTempFile::new().unwrap();
        other.write_all(b"solo line\n").unwrap();
        other.flush().unwrap();

        session.load(other.path()).unwrap();
        assert_eq!(session.total_lines(), 1);
        assert_eq!(session.cursor(DisplayMode::Normal), 0);
        assert_eq!(
            session.current_file_path(),
            other.path().to_string_lossy().as_ref()
        );
    }

    #[test]
    fn test_failed_load_keeps_previous_document() {
        let (mut session, _file) = session_with("Hello\nWorld\n", reading(0, 2, 0));
        let err = session.load(Path::new("/nonexistent/novel.txt"));
        assert!(err.is_err());
        assert_eq!(session.total_lines(), 2);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello\nWorld\n").unwrap();
        file.flush().unwrap();

        let mut session = ReaderSession::new(reading(0, 2, 0), ProgressStore::default());
        let rx = session.subscribe();

        session.load(file.path()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Loaded);

        session.advance(DisplayMode::Stealth, Direction::Forward);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Moved(DisplayMode::Stealth)
        );

        session.toggle_visibility();
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::VisibilityChanged(false));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (mut session, _file) = session_with("Hello\nWorld\n", reading(0, 2, 0));
        let rx = session.subscribe();
        drop(rx);
        // Must not panic or grow the subscriber list forever.
        session.advance(DisplayMode::Stealth, Direction::Forward);
        session.advance(DisplayMode::Stealth, Direction::Forward);
    }

    #[test]
    fn test_advance_persists_progress() {
        let (mut session, file) = session_with(&numbered_lines(10), reading(0, 3, 0));
        session.advance(DisplayMode::Normal, Direction::Forward);
        let key = file.path().to_string_lossy().into_owned();
        assert_eq!(session.progress().get(DisplayMode::Normal, &key), 3);
    }

    #[test]
    fn test_load_records_last_file() {
        let (session, file) = session_with("Hello\n", reading(0, 2, 0));
        assert_eq!(
            session.progress().last_file,
            file.path().to_string_lossy().as_ref()
        );
    }
}
