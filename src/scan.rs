use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::model::config::ScanConfig;

/// Expand the given paths into the DUML files to process.
///
/// Directories are walked recursively, honouring ignore files, and
/// contribute every file with the configured extension, sorted. Any other
/// path is passed through untouched so a missing file surfaces as a read
/// error later.
pub fn collect_files(paths: &[PathBuf], scan: &ScanConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found = walk_dir(path, scan);
            found.sort();
            tracing::debug!(dir = %path.display(), count = found.len(), "scanned directory");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}

fn walk_dir(dir: &Path, scan: &ScanConfig) -> Vec<PathBuf> {
    WalkBuilder::new(dir)
        .hidden(!scan.hidden)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {err}", dir.display());
                None
            }
        })
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if metadata.is_file() && has_extension(entry.path(), &scan.extension) {
                Some(entry.path().to_path_buf())
            } else {
                None
            }
        })
        .collect()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
