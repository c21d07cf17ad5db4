//! Computes which paths under a root are visible for a given filter.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::CoreError;
use super::ignore::is_excluded;
use super::search::SearchEngine;
use super::VisiblePathSet;

/// A utility struct for scanning a directory tree into a [`VisiblePathSet`].
///
/// This struct is stateless and provides methods as associated functions.
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Checks that `path` exists and is a directory before any core operation runs.
    pub fn validate_root(path: &Path) -> Result<PathBuf, CoreError> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(path.to_path_buf()),
            Ok(_) => Err(CoreError::NotADirectory(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::NotADirectory(path.to_path_buf()))
            }
            Err(e) => Err(CoreError::Io(e, path.to_path_buf())),
        }
    }

    /// Computes the full set of visible paths under `root` for `filter`.
    ///
    /// A path is visible if it matches the filter itself, or if it is an ancestor (up to
    /// and including `root`) of a match. Excluded locations never appear. The root is
    /// always part of a non-empty result; a missing or non-directory root yields an
    /// empty set. Unreadable subdirectories are logged and contribute nothing.
    pub fn compute_visible(root: &Path, filter: &str) -> VisiblePathSet {
        let mut visible = HashSet::new();
        if !root.is_dir() {
            tracing::warn!(
                "Cannot compute visible paths: {} is not a directory",
                root.display()
            );
            return visible;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry.path(), Some(root)));

        let mut scanned = 0usize;
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable path {} while filtering: {}",
                        e.path().unwrap_or(root).display(),
                        e
                    );
                    continue;
                }
            };
            scanned += 1;

            if SearchEngine::matches_filter(entry.path(), filter) {
                Self::insert_with_ancestors(&mut visible, entry.path(), root);
            }
        }

        visible.insert(root.to_path_buf());

        tracing::debug!(
            "Scanned {} entries under {}: {} visible for filter '{}'",
            scanned,
            root.display(),
            visible.len(),
            filter
        );
        visible
    }

    /// Inserts `item` and walks upward inserting every ancestor up to `root`.
    ///
    /// The walk stops early at an ancestor that is itself excluded, and as soon as an
    /// ancestor is already present (its own ancestors were added with it).
    fn insert_with_ancestors(visible: &mut VisiblePathSet, item: &Path, root: &Path) {
        if !visible.insert(item.to_path_buf()) {
            return;
        }

        let mut current = item.parent();
        while let Some(parent) = current {
            if !parent.starts_with(root) || is_excluded(parent, Some(root)) {
                break;
            }
            if !visible.insert(parent.to_path_buf()) || parent == root {
                break;
            }
            current = parent.parent();
        }
    }
}
