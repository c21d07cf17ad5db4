//! Projects one directory level of the visible tree, and renders expanded trees as ASCII.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::VisiblePathSet;

/// One row under a directory in the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeEntry {
    /// A visible child. Directories always get an expand affordance.
    Node {
        name: String,
        path: PathBuf,
        is_directory: bool,
    },
    /// Explains why (part of) a directory listing could not be produced.
    Placeholder { message: String },
}

/// A utility struct for projecting the visible tree one level at a time.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Lists the direct children of `directory` that are in `visible`.
    ///
    /// Directories come before files, then entries are ordered by case-insensitive name.
    /// A listing error becomes a trailing placeholder entry instead of an error, so the
    /// rest of the tree keeps rendering.
    pub fn children_of(directory: &Path, visible: &VisiblePathSet) -> Vec<TreeEntry> {
        let read_dir = match fs::read_dir(directory) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::warn!("Failed to list directory {}: {}", directory.display(), e);
                return vec![TreeEntry::Placeholder {
                    message: format!("Error reading directory: {e}"),
                }];
            }
        };

        let mut children = Vec::new();
        let mut placeholders = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read an entry of {}: {}",
                        directory.display(),
                        e
                    );
                    placeholders.push(TreeEntry::Placeholder {
                        message: format!("Error reading entry: {e}"),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if !visible.contains(&path) {
                continue;
            }
            let is_directory = path.is_dir();
            let name = entry.file_name().to_string_lossy().to_string();
            children.push((is_directory, name.to_lowercase(), name, path));
        }

        children.sort_by(|a, b| {
            // Directories first, then files
            b.0.cmp(&a.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        children
            .into_iter()
            .map(|(is_directory, _, name, path)| TreeEntry::Node {
                name,
                path,
                is_directory,
            })
            .chain(placeholders)
            .collect()
    }

    /// Renders the visible tree under `root`, descending only into `expanded` directories.
    pub fn render_ascii(
        root: &Path,
        visible: &VisiblePathSet,
        expanded: &HashSet<PathBuf>,
    ) -> String {
        let mut result = format!(
            "{}/\n",
            root.file_name()
                .unwrap_or(root.as_os_str())
                .to_string_lossy()
        );

        if visible.contains(root) {
            Self::render_level(root, visible, expanded, &mut result, "");
        }

        result
    }

    /// Renders the children of one directory, recursing into expanded subdirectories.
    fn render_level(
        directory: &Path,
        visible: &VisiblePathSet,
        expanded: &HashSet<PathBuf>,
        result: &mut String,
        prefix: &str,
    ) {
        let children = Self::children_of(directory, visible);

        for (i, child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let connector = if is_last { "└── " } else { "├── " };

            match child {
                TreeEntry::Node {
                    name,
                    path,
                    is_directory,
                } => {
                    let suffix = if *is_directory { "/" } else { "" };
                    result.push_str(&format!("{prefix}{connector}{name}{suffix}\n"));

                    if *is_directory && expanded.contains(path) {
                        let new_prefix = if is_last {
                            format!("{prefix}    ")
                        } else {
                            format!("{prefix}│   ")
                        };
                        Self::render_level(path, visible, expanded, result, &new_prefix);
                    }
                }
                TreeEntry::Placeholder { message } => {
                    result.push_str(&format!("{prefix}{connector}[{message}]\n"));
                }
            }
        }
    }
}
