//! Expands a selection of files and directories into the ordered list of files to read.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::ignore::is_excluded;
use super::SelectionSet;
use crate::utils::file_detection::is_likely_text;

/// The kind of failure hit while enumerating a selected directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryErrorKind {
    /// Listing was refused by the operating system.
    AccessDenied,
    /// Any other enumeration failure (I/O error, link loop).
    Scan,
}

/// A directory that could not be enumerated during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryError {
    pub path: PathBuf,
    pub kind: DirectoryErrorKind,
    pub message: String,
}

/// The outcome of expanding a selection: files to read, plus directories that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFiles {
    /// Unique text files, ordered component by component.
    pub files: Vec<PathBuf>,
    /// Enumeration failures in the order they were discovered.
    pub directory_errors: Vec<DirectoryError>,
}

/// A utility struct for turning a selection snapshot into a [`ResolvedFiles`].
///
/// This struct is stateless and provides methods as associated functions.
pub struct SelectionExpander;

impl SelectionExpander {
    /// Resolves the selected paths into the text files they stand for.
    ///
    /// Files are admitted by the text classifier, directories are walked recursively
    /// with the same exclusion rules as the visible tree. A file reachable through several
    /// selected items is listed once. The result is independent of selection order.
    pub fn resolve_files(selection: &SelectionSet, root: Option<&Path>) -> ResolvedFiles {
        let mut ordered_selection: Vec<&PathBuf> = selection.iter().collect();
        ordered_selection.sort();

        let mut files = BTreeSet::new();
        let mut directory_errors = Vec::new();
        let mut failed_dirs = HashSet::new();

        for item in ordered_selection {
            if item.is_dir() {
                Self::expand_directory(
                    item,
                    root,
                    &mut files,
                    &mut directory_errors,
                    &mut failed_dirs,
                );
            } else if is_likely_text(item, root) {
                files.insert(item.clone());
            } else {
                tracing::debug!("Skipping selected non-text item {}", item.display());
            }
        }

        tracing::info!(
            "Resolved {} selected items into {} files ({} directory errors)",
            selection.len(),
            files.len(),
            directory_errors.len()
        );

        ResolvedFiles {
            files: files.into_iter().collect(),
            directory_errors,
        }
    }

    /// Walks one selected directory, collecting eligible files and enumeration failures.
    fn expand_directory(
        directory: &Path,
        root: Option<&Path>,
        files: &mut BTreeSet<PathBuf>,
        directory_errors: &mut Vec<DirectoryError>,
        failed_dirs: &mut HashSet<PathBuf>,
    ) {
        if is_excluded(directory, root) {
            tracing::debug!("Skipping excluded directory {}", directory.display());
            return;
        }

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry.path(), root));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_dir() && is_likely_text(entry.path(), root) {
                        files.insert(entry.into_path());
                    }
                }
                Err(e) => {
                    let failed = e.path().unwrap_or(directory).to_path_buf();
                    if !failed_dirs.insert(failed.clone()) {
                        continue;
                    }

                    let (kind, message) = match e.io_error() {
                        Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                            (DirectoryErrorKind::AccessDenied, io.to_string())
                        }
                        Some(io) => (DirectoryErrorKind::Scan, io.to_string()),
                        None => (DirectoryErrorKind::Scan, e.to_string()),
                    };
                    tracing::warn!(
                        "Error scanning directory {} ({:?}): {}",
                        failed.display(),
                        kind,
                        message
                    );
                    directory_errors.push(DirectoryError {
                        path: failed,
                        kind,
                        message,
                    });
                }
            }
        }
    }
}
