//! Document model: a novel file as an ordered sequence of trimmed lines

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::encoding;

/// Why a load failed. All variants are recoverable; the caller decides
/// how to surface them.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("not a readable file: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file is empty: {0}")]
    Empty(PathBuf),
    #[error("no readable content in {0}")]
    NoContent(PathBuf),
}

/// A loaded novel: the file path it came from and its non-empty lines.
///
/// Immutable after construction; a reload produces a new `Document`.
#[derive(Clone, Debug)]
pub struct Document {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl Document {
    /// Load a document from a file path with charset auto-detection.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        log::info!("load: attempting to load file: {}", path.display());

        if !path.is_file() {
            log::warn!("load: not an existing regular file: {}", path.display());
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("load: read {} bytes", bytes.len());

        if bytes.is_empty() {
            log::warn!("load: file is empty: {}", path.display());
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        let (charset, offset) = encoding::detect(&bytes);
        log::debug!("load: detected charset {} (skip {})", charset.name(), offset);
        let content = encoding::decode(&bytes, charset, offset);

        let lines = segment(&content);
        if lines.is_empty() {
            log::warn!("load: no lines survived trimming: {}", path.display());
            return Err(LoadError::NoContent(path.to_path_buf()));
        }

        log::info!("load: loaded {} lines", lines.len());
        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Split decoded text into trimmed, non-empty lines.
///
/// Recognizes both `\n` and `\r\n`; segments that trim to nothing are
/// dropped, the rest keep their document order.
pub fn segment(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
