//! Moyu Core - Document model, pagination, and persisted state
//!
//! This crate contains the core logic for moyu, independent of terminal UI concerns:
//! - Document model with charset auto-detection (UTF-8, UTF-16, GBK)
//! - Reading session with dual display modes and pagination
//! - Per-file, per-mode reading progress with schema migration
//! - Configuration management

pub mod config;
pub mod doc;
pub mod encoding;
pub mod progress;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use doc::{Document, LoadError};
pub use progress::{CursorScheme, ProgressStore};
pub use session::{Direction, DisplayMode, ReaderSession, SessionEvent};
