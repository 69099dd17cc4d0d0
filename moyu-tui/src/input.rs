//! Input handling and keybindings

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use moyu_core::config::KeyConfig;

/// Result of handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A single bindable shortcut: key code plus required modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.modifiers
    }
}

/// Parse a shortcut name like `"right"`, `"h"` or `"ctrl-b"`.
///
/// The last `-`-separated token is the key, everything before it a
/// modifier. Unknown names return `None` so the caller can fall back.
pub fn parse_key(name: &str) -> Option<KeySpec> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = name.split('-').collect();
    let key = parts.pop()?;
    for part in parts {
        match part {
            "ctrl" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match key {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        single if single.chars().count() == 1 => {
            let ch = single.chars().next()?;
            if modifiers.contains(KeyModifiers::SHIFT) {
                KeyCode::Char(ch.to_ascii_uppercase())
            } else {
                KeyCode::Char(ch)
            }
        }
        _ => return None,
    };

    Some(KeySpec { code, modifiers })
}

/// The configured shortcuts, resolved to key specs.
#[derive(Debug, Clone, Copy)]
pub struct KeyBindings {
    pub open: KeySpec,
    pub next_page: KeySpec,
    pub prev_page: KeySpec,
    pub toggle: KeySpec,
}

fn parse_or_default(name: &str, fallback: &str) -> KeySpec {
    parse_key(name).unwrap_or_else(|| {
        log::warn!("unknown key name {name:?}, using {fallback:?}");
        parse_key(fallback).expect("default key name parses")
    })
}

impl KeyBindings {
    /// Resolve the configured names, falling back to the defaults for
    /// any name that does not parse.
    pub fn from_config(keys: &KeyConfig) -> Self {
        let defaults = KeyConfig::default();
        Self {
            open: parse_or_default(&keys.open, &defaults.open),
            next_page: parse_or_default(&keys.next_page, &defaults.next_page),
            prev_page: parse_or_default(&keys.prev_page, &defaults.prev_page),
            toggle: parse_or_default(&keys.toggle, &defaults.toggle),
        }
    }
}

/// Handle a key event.
///
/// While the reader is hidden only the quit and visibility keys are
/// honored; everything else is swallowed so a stray keystroke cannot
/// scroll or reload the novel behind the disguise.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Action {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
        app.quit();
        return Action::Quit;
    }

    if key.code == KeyCode::Char('q') && key.modifiers == KeyModifiers::NONE {
        app.quit();
        return Action::Quit;
    }

    if app.bindings.toggle.matches(&key) {
        app.toggle_visibility();
        return Action::Continue;
    }

    if !app.session.is_visible() {
        return Action::Continue;
    }

    if app.bindings.next_page.matches(&key) {
        app.next_page();
        return Action::Continue;
    }

    if app.bindings.prev_page.matches(&key) {
        app.prev_page();
        return Action::Continue;
    }

    if app.bindings.open.matches(&key) {
        app.reopen();
        return Action::Continue;
    }

    match key.code {
        KeyCode::Tab => app.toggle_mode(),
        KeyCode::Char(c) if key.modifiers == KeyModifiers::NONE && c.is_ascii_digit() => {
            app.jump_to_digit(c.to_digit(10).unwrap_or(0));
        }
        _ => {}
    }

    Action::Continue
}
