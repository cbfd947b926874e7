//! Watches a source file so edits made in another editor reach the session.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::event::AppEvent;

/// Watch `path` and send [`AppEvent::SourceFileChanged`] when it is written
/// or replaced. Returns the watcher, which must be kept alive.
///
/// The parent directory is watched rather than the file itself, because
/// editors that save by renaming a temp file over the original would
/// otherwise silently end the watch.
pub fn watch_source_file(
    path: &Path,
    events: mpsc::UnboundedSender<AppEvent>,
) -> Result<notify::RecommendedWatcher> {
    let file_name: OsString = path
        .file_name()
        .with_context(|| format!("{} is not a file path", path.display()))?
        .to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let Ok(event) = res else { return };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        if event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
        {
            // The receiver is gone once the session ends.
            let _ = events.send(AppEvent::SourceFileChanged);
        }
    })
    .context("failed to create filesystem watcher")?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    Ok(watcher)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reports_writes_to_the_watched_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prog.py");
        std::fs::write(&path, "a = 1\n").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watcher = watch_source_file(&path, tx).unwrap();

        std::fs::write(dir.path().join("other.py"), "b = 2\n").unwrap();
        std::fs::write(&path, "x = input('X:')\n").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, AppEvent::SourceFileChanged));
    }
}
