use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::selection::{DirectoryError, DirectoryErrorKind, SelectionExpander};
use super::SelectionSet;

/// Returned when aggregation is requested with an empty selection.
pub const NOTHING_SELECTED_MESSAGE: &str = "Error: no files or folders selected for display.";

/// Returned when the selection resolves to no eligible files and no errors.
pub const NOTHING_FOUND_MESSAGE: &str =
    "No text files found in the selected items (or they were filtered out).";

/// Fence line opening and closing every block.
const FENCE: &str = "```";

/// The text produced by one aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    pub text: String,
    /// Files whose content made it into the text.
    pub files_read: usize,
    /// Files listed with an inline failure message instead of content.
    pub read_failures: usize,
    /// Directories listed with an inline access or scan error.
    pub directory_errors: usize,
}

impl AggregationResult {
    fn message(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Number of labeled blocks in [`AggregationResult::text`].
    pub fn block_count(&self) -> usize {
        self.files_read + self.read_failures + self.directory_errors
    }
}

pub struct FileHandler;

impl FileHandler {
    /// Resolves a selection snapshot and aggregates it.
    ///
    /// An empty selection returns [`NOTHING_SELECTED_MESSAGE`] without touching the
    /// filesystem.
    pub fn aggregate_selection(selection: &SelectionSet, root: Option<&Path>) -> AggregationResult {
        if selection.is_empty() {
            tracing::warn!("Aggregation requested with an empty selection.");
            return AggregationResult::message(NOTHING_SELECTED_MESSAGE);
        }

        tracing::info!("Aggregating content for {} selected items.", selection.len());
        let resolved = SelectionExpander::resolve_files(selection, root);
        Self::aggregate(&resolved.files, &resolved.directory_errors, root)
    }

    /// Concatenates directory errors and file contents into labeled, fenced blocks.
    ///
    /// Directory errors come first in discovery order, then files in the given order.
    /// A file that cannot be read is still listed, with an inline failure message.
    pub fn aggregate(
        files: &[PathBuf],
        directory_errors: &[DirectoryError],
        root: Option<&Path>,
    ) -> AggregationResult {
        if files.is_empty() && directory_errors.is_empty() {
            return AggregationResult::message(NOTHING_FOUND_MESSAGE);
        }

        let mut content = String::new();
        let mut result = AggregationResult::default();

        for error in directory_errors {
            let label = format!("{} (directory)", Self::display_label(&error.path, root));
            let body = match error.kind {
                DirectoryErrorKind::AccessDenied => format!("[ACCESS ERROR: {}]", error.message),
                DirectoryErrorKind::Scan => format!("[DIRECTORY SCAN ERROR: {}]", error.message),
            };
            Self::push_block(&mut content, &label, &body);
            result.directory_errors += 1;
        }

        let total_files = files.len();
        for (i, file_path) in files.iter().enumerate() {
            let label = Self::display_label(file_path, root);
            tracing::debug!("Reading file ({}/{}): {}", i + 1, total_files, label);

            match Self::read_file_content(file_path) {
                Ok(file_content) => {
                    Self::push_block(&mut content, &label, file_content.trim());
                    result.files_read += 1;
                }
                Err(e) => {
                    tracing::warn!("Could not read file {}: {}", file_path.display(), e);
                    Self::push_block(&mut content, &label, &format!("[FAILED TO READ FILE: {e}]"));
                    result.read_failures += 1;
                }
            }
        }

        result.text = content.trim().to_string();
        tracing::info!(
            "Aggregated {} files ({} unreadable, {} directory errors) into {} bytes.",
            result.files_read,
            result.read_failures,
            result.directory_errors,
            result.text.len()
        );
        result
    }

    /// Renders `path` relative to `root`, or as its bare name without a root.
    pub fn display_label(path: &Path, root: Option<&Path>) -> String {
        let bare_name = || {
            path.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        };

        match root {
            Some(root) => match path.strip_prefix(root) {
                Ok(relative) if relative.as_os_str().is_empty() => bare_name(),
                Ok(relative) => relative.display().to_string(),
                Err(_) => path.display().to_string(),
            },
            None => bare_name(),
        }
    }

    /// Joins the non-empty, trimmed parts with one blank line between them.
    pub fn compose_with_prompts(start_prompt: &str, content: &str, end_prompt: &str) -> String {
        [start_prompt, content, end_prompt]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn push_block(content: &mut String, label: &str, body: &str) {
        content.push_str(&format!("{label}\n{FENCE}\n{body}\n{FENCE}\n\n"));
    }

    /// Reads the whole file, replacing invalid UTF-8 sequences instead of failing.
    fn read_file_content(file_path: &Path) -> std::io::Result<String> {
        let bytes = fs::read(file_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn create_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn example_tree() -> TempDir {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "a.txt", b"\n\n  alpha  \n");
        create_file(dir.path(), "b.bin", &[0, 159, 146, 150]);
        create_file(dir.path(), "sub/c.py", b"print('c')\n");
        dir
    }

    #[test]
    fn test_aggregate_selection_of_root() {
        let dir = example_tree();
        let root = dir.path();
        let selection: SelectionSet = [root.to_path_buf()].into_iter().collect();

        let result = FileHandler::aggregate_selection(&selection, Some(root));

        assert_eq!(result.block_count(), 2);
        assert_eq!(result.read_failures, 0);
        insta::assert_snapshot!(result.text.replace('\\', "/"), @r###"
        a.txt
        ```
        alpha
        ```

        sub/c.py
        ```
        print('c')
        ```
        "###);
    }

    #[test]
    fn test_empty_selection_does_not_touch_filesystem() {
        let result = FileHandler::aggregate_selection(
            &SelectionSet::new(),
            Some(Path::new("/definitely/not/here")),
        );
        assert_eq!(result.text, NOTHING_SELECTED_MESSAGE);
        assert_eq!(result.block_count(), 0);
    }

    #[test]
    fn test_selection_without_eligible_files_reports_nothing_found() {
        let dir = example_tree();
        let root = dir.path();
        let selection: SelectionSet = [root.join("b.bin")].into_iter().collect();

        let result = FileHandler::aggregate_selection(&selection, Some(root));
        assert_eq!(result.text, NOTHING_FOUND_MESSAGE);
    }

    #[test]
    fn test_unreadable_file_is_listed_with_error() {
        let dir = example_tree();
        let root = dir.path();
        let files = vec![root.join("a.txt"), root.join("vanished.txt")];

        let result = FileHandler::aggregate(&files, &[], Some(root));

        assert_eq!(result.files_read, 1);
        assert_eq!(result.read_failures, 1);
        assert!(result.text.contains("vanished.txt\n```\n[FAILED TO READ FILE: "));
        assert!(result.text.ends_with("]\n```"));
    }

    #[test]
    fn test_directory_errors_come_first() {
        let dir = example_tree();
        let root = dir.path();
        let errors = vec![DirectoryError {
            path: root.join("locked"),
            kind: DirectoryErrorKind::AccessDenied,
            message: "Permission denied (os error 13)".to_string(),
        }];

        let result = FileHandler::aggregate(&[root.join("a.txt")], &errors, Some(root));

        assert_eq!(result.block_count(), 2);
        assert!(result.text.starts_with(
            "locked (directory)\n```\n[ACCESS ERROR: Permission denied (os error 13)]\n```\n\na.txt\n"
        ));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        let path = create_file(dir.path(), "notes.txt", &[b'o', b'k', 0xFF, b'!']);

        let result = FileHandler::aggregate(&[path], &[], Some(dir.path()));

        assert_eq!(result.files_read, 1);
        assert_eq!(result.text, "notes.txt\n```\nok\u{FFFD}!\n```");
    }

    #[test]
    fn test_display_label() {
        let root = Path::new("/project");
        assert_eq!(
            FileHandler::display_label(Path::new("/project/src/main.py"), None),
            "main.py"
        );
        assert_eq!(
            FileHandler::display_label(Path::new("/project"), Some(root)),
            "project"
        );
        assert_eq!(
            FileHandler::display_label(Path::new("/elsewhere/x.txt"), Some(root)),
            Path::new("/elsewhere/x.txt").display().to_string()
        );
    }

    #[test]
    fn test_compose_with_prompts_skips_empty_parts() {
        assert_eq!(
            FileHandler::compose_with_prompts("  Review this:\n", "a.txt\n```\nx\n```", ""),
            "Review this:\n\na.txt\n```\nx\n```"
        );
        assert_eq!(FileHandler::compose_with_prompts("", "  ", "\n"), "");
        assert_eq!(FileHandler::compose_with_prompts("s", "c", "e"), "s\n\nc\n\ne");
    }
}
