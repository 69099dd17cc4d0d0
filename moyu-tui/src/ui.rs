//! UI rendering
//!
//! The main panel never admits to being a novel reader. While hidden it
//! shows a finished build transcript; while visible in stealth mode the
//! text lives only in the one-line bar at the bottom, and in normal mode
//! the page is printed like plain console output.

use crate::app::App;
use moyu_core::DisplayMode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// What the panel claims to be while the reader is hidden.
const DISGUISE: &[&str] = &[
    "[INFO] Running build...",
    "[INFO] Build completed successfully.",
    "",
    "Process finished with exit code 0",
];

const WAITING: &str = "[INFO] Waiting for input...";

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    if app.config.status_bar.enabled {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Console panel
                Constraint::Length(1), // Stealth line
            ])
            .split(frame.area());

        render_panel(frame, app, chunks[0]);
        render_bottom_line(frame, app, chunks[1]);
    } else {
        render_panel(frame, app, frame.area());
    }
}

/// The lines the main panel shows for the current app state.
pub fn panel_lines(app: &App) -> Vec<String> {
    if !app.session.is_visible() {
        return DISGUISE.iter().map(|s| (*s).to_string()).collect();
    }
    if !app.session.has_content() {
        return vec![WAITING.to_string()];
    }
    match app.mode {
        DisplayMode::Normal => app.session.render_normal_page(),
        // The page panel stays disguised; the text is on the bottom line.
        DisplayMode::Stealth => DISGUISE.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// The bottom-line text: stealth text plus reading status, or empty
/// when the bar should stay blank.
pub fn bottom_line_text(app: &App) -> String {
    if !app.session.is_visible() || !app.session.has_content() {
        return String::new();
    }
    format!(
        "{}  {}",
        app.session.render_stealth_line(),
        app.session.status_text(app.mode)
    )
}

fn render_panel(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let showing_page = app.session.is_visible()
        && app.session.has_content()
        && app.mode == DisplayMode::Normal;

    // Page text in the terminal's default look; the disguise in the
    // muted gray of log output.
    let style = if showing_page {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines: Vec<Line> = panel_lines(app)
        .into_iter()
        .map(|text| Line::from(clip_to_width(&text, area.width as usize)))
        .take(area.height as usize)
        .collect();

    frame.render_widget(Paragraph::new(lines).style(style), area);
}

fn render_bottom_line(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let text = clip_to_width(&bottom_line_text(app), area.width as usize);
    let line = Paragraph::new(Line::from(text)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(line, area);
}

/// Truncate to at most `max` display columns, never splitting a wide
/// character in half.
fn clip_to_width(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max {
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}
