//! Debounced change notifications for the source tree and config file

use anyhow::Result;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period before a burst of file events is reported
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches paths and yields batches of changed files
pub struct ChangeWatcher {
    // Dropping the debouncer stops the watch
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: mpsc::UnboundedReceiver<Vec<PathBuf>>,
}

impl ChangeWatcher {
    /// Watch every existing path; directories recursively
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let changed: Vec<PathBuf> = events
                        .into_iter()
                        .map(|e| e.path)
                        .filter(|p| is_relevant(p))
                        .collect();
                    if !changed.is_empty() {
                        let _ = tx.send(changed);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        })?;

        for path in paths {
            if !path.exists() {
                tracing::debug!("Not watching missing path: {:?}", path);
                continue;
            }
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            debouncer.watcher().watch(path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Wait for the next batch of relevant changes
    pub async fn next_change(&mut self) -> Option<Vec<PathBuf>> {
        self.rx.recv().await
    }
}

/// Filter out editor droppings and VCS internals
pub fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains("node_modules")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("public/content/articles.json")));
        assert!(is_relevant(Path::new("public/data/post-1/index.md")));
        assert!(!is_relevant(Path::new("public/.git/HEAD")));
        assert!(!is_relevant(Path::new("public/data/.DS_Store")));
        assert!(!is_relevant(Path::new("public/data/post-1/index.md~")));
        assert!(!is_relevant(Path::new("public/data/.index.md.swp")));
    }

    #[tokio::test]
    async fn test_watch_missing_paths_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let watcher = ChangeWatcher::new(&[dir.path().join("nope"), dir.path().to_path_buf()]);
        assert!(watcher.is_ok());
    }
}
