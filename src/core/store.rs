//! Secret store operations.
//!
//! A flat, ordered `KEY=value` file (`anki.env`). Blank lines and `#`
//! comments survive rewrites verbatim; duplicate keys collapse to the most
//! recent write. Every save rewrites the whole file through a temp file and
//! rename, leaving a timestamped backup of the pre-write state that the
//! caller prunes once the write is known good.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::fsio;
use crate::error::{Result, StoreError};

/// One line of the persisted record.
#[derive(Debug, Clone)]
enum Line {
    /// A `KEY=value` pair.
    Pair { key: String, value: String },
    /// A comment or blank line, kept as-is.
    Raw(String),
}

/// The persisted secret record.
#[derive(Debug)]
pub struct EnvStore {
    path: PathBuf,
    lines: Vec<Line>,
}

impl EnvStore {
    /// Open an empty store that will save to `path`.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: Vec::new(),
        }
    }

    /// Load the store from `path`.
    ///
    /// Duplicate keys collapse to the last occurrence so the in-memory
    /// record never holds two entries for one key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadFailed` when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let mut store = Self::empty(path);
        for raw in contents.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                store.lines.push(Line::Raw(raw.to_string()));
                continue;
            }

            match raw.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim().to_string();
                    let value = value.trim().to_string();
                    // last write wins, no duplicate entries
                    match store.position(&key) {
                        Some(idx) => store.lines[idx] = Line::Pair { key, value },
                        None => store.lines.push(Line::Pair { key, value }),
                    }
                }
                None => store.lines.push(Line::Raw(raw.to_string())),
            }
        }

        debug!(path = %path.display(), keys = store.keys().count(), "store loaded");
        Ok(store)
    }

    /// Load from `path` when it exists, otherwise seed a new store from the
    /// example template (or start empty when no template is shipped).
    pub fn load_or_seed(path: &Path, example: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        if example.exists() {
            debug!(example = %example.display(), "seeding store from template");
            let mut store = Self::load(example)?;
            store.path = path.to_path_buf();
            return Ok(store);
        }
        debug!(path = %path.display(), "no store or template, starting empty");
        Ok(Self::empty(path))
    }

    /// Path the store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value. Absence is a first-class outcome, distinct from an
    /// empty-string value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Look up a value, treating an empty string the same as absent.
    /// Used for required inputs where a cleared value is unusable.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Set a value, overwriting the existing entry or appending a new one.
    /// Returns whether anything changed; writing the same value is a no-op.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.position(key) {
            Some(idx) => {
                if let Line::Pair { value: old, .. } = &self.lines[idx] {
                    if old == value {
                        trace!(key, "unchanged");
                        return false;
                    }
                }
                self.lines[idx] = Line::Pair {
                    key: key.to_string(),
                    value: value.to_string(),
                };
                true
            }
            None => {
                self.lines.push(Line::Pair {
                    key: key.to_string(),
                    value: value.to_string(),
                });
                true
            }
        }
    }

    /// Iterate over the stored keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    /// Persist the record with a whole-file rewrite.
    ///
    /// The previous file, when present, is kept as a timestamped `.bak`
    /// sibling; call [`EnvStore::prune_backups`] once the new state is
    /// known good.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            })?;
        }

        if self.path.exists() {
            let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let backup = self
                .path
                .with_file_name(format!("{}.bak.{}", self.file_name(), stamp));
            fs::copy(&self.path, &backup).map_err(|source| StoreError::WriteFailed {
                path: backup.display().to_string(),
                source,
            })?;
            trace!(backup = %backup.display(), "kept pre-write backup");
        }

        fsio::write_atomic(&self.path, &self.render()).map_err(|source| {
            StoreError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    /// Remove every backup left by previous saves.
    pub fn prune_backups(&self) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        if !parent.exists() {
            return Ok(());
        }

        let prefix = format!("{}.bak.", self.file_name());
        for entry in fs::read_dir(parent)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) {
                trace!(file = %name, "pruning backup");
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Pair { key, value } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                Line::Raw(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|line| match line {
            Line::Pair { key: k, .. } => k == key,
            _ => false,
        })
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "anki.env".to_string())
    }
}
