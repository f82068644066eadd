use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::msg::Msg;

/// Watches one DUML document and reports when it needs reparsing.
///
/// The parent directory is watched rather than the file itself, because a
/// save that replaces the file would otherwise end the watch. Only events
/// naming the document reach the receiver. Dropping this stops watching.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    pub target: PathBuf,
    pub rx: mpsc::Receiver<Msg>,
}

impl DocumentWatcher {
    pub fn new(file: &Path) -> Result<Self> {
        let target = std::fs::canonicalize(file)
            .with_context(|| format!("cannot watch {}", file.display()))?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = mpsc::channel::<Msg>();
        let wanted = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let msg = match res {
                Ok(event) if touches_document(&event, &wanted) => Msg::FileChanged(wanted.clone()),
                Ok(_) => return,
                Err(err) => Msg::WatchError(err.to_string()),
            };
            // The receiver is gone once the watch loop exits.
            let _ = tx.send(msg);
        })
        .context("failed to start file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;
        tracing::debug!(file = %target.display(), dir = %dir.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            target,
            rx,
        })
    }
}

fn touches_document(event: &Event, target: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| same_file_path(path, target))
}

/// Whether two paths name the same file, resolving symlinks and relative
/// segments when both exist.
pub fn same_file_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
