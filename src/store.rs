//! Persistence of a session's raw source text.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, bail};

/// Saves and restores the source of one session.
pub trait SourceStore: Send {
    /// The persisted source, or `None` if nothing was saved.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, source: &str) -> Result<()>;
    /// Drop the persisted entry. Clearing an absent entry is not an error.
    fn clear(&mut self) -> Result<()>;
}

/// One file per session under a store directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path, session: &str) -> Result<Self> {
        if session.is_empty()
            || !session
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
            || session.starts_with('.')
        {
            bail!("invalid session name '{session}': use letters, digits, '-', '_' or '.'");
        }
        Ok(Self {
            path: dir.join(format!("{session}.src")),
        })
    }

    /// Default store directory under the platform data dir.
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .context("could not determine a data directory; set session.store_dir")?;
        Ok(base.join("promptrun").join("sessions"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    fn save(&mut self, source: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, source)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}

/// In-memory store. Clones share the same slot, so a caller can keep a
/// handle to inspect what a session persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(source.to_string()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SourceStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&mut self, source: &str) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(source.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(&dir.path().join("nested"), "default").unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save("x = input('a')").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("x = input('a')"));
        assert!(store.path().ends_with("nested/default.src"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn sessions_are_isolated() {
        let dir = TempDir::new().unwrap();
        let mut a = FileStore::new(dir.path(), "a").unwrap();
        let b = FileStore::new(dir.path(), "b").unwrap();
        a.save("only a").unwrap();
        assert_eq!(b.load().unwrap(), None);
    }

    #[test]
    fn rejects_path_like_session_names() {
        let dir = TempDir::new().unwrap();
        assert!(FileStore::new(dir.path(), "../escape").is_err());
        assert!(FileStore::new(dir.path(), "a/b").is_err());
        assert!(FileStore::new(dir.path(), "").is_err());
        assert!(FileStore::new(dir.path(), "work-1.v2").is_ok());
    }

    #[test]
    fn memory_store_clones_share_state() {
        let handle = MemoryStore::new();
        let mut store = handle.clone();
        store.save("abc").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(handle.contents(), None);
    }
}
