use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::ignore::is_excluded;

/// Known text extensions and whole file names, compared lower-cased.
///
/// Entries with a leading dot are matched against the extension (`.py`) and against
/// the full name of dot-files (`.gitignore`); `readme` matches a bare file name.
const TEXT_EXTENSIONS: &[&str] = &[
    ".py", ".txt", ".md", ".json", ".yaml", ".yml", ".html", ".htm", ".css", ".js", ".csv",
    ".log", ".ini", ".cfg", ".xml", ".sh", ".bat", ".gitignore", ".dockerfile", "readme", ".env",
];

/// Upper bound on the bytes read when sniffing a file without a known extension.
pub const SNIFF_BYTE_LIMIT: usize = 1024;

/// Decides whether `path` is a text file worth aggregating.
///
/// Exclusion rules are evaluated below `root` when one is given. Files with a known
/// extension are accepted without being opened; anything else goes through a bounded
/// content sniff. Any failure along the way classifies the file as not-text.
pub fn is_likely_text(path: &Path, root: Option<&Path>) -> bool {
    if !path.is_file() {
        return false;
    }
    if is_excluded(path, root) {
        return false;
    }
    if has_known_text_extension(path) {
        return true;
    }

    match sniff_is_text(path) {
        Ok(is_text) => is_text,
        Err(e) => {
            tracing::debug!("Content sniff failed for {}: {}", path.display(), e);
            false
        }
    }
}

/// Checks the lower-cased extension and the full lower-cased name against the allow-list.
fn has_known_text_extension(path: &Path) -> bool {
    let name_lower = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if TEXT_EXTENSIONS.contains(&name_lower.as_str()) {
        return true;
    }

    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// Reads at most [`SNIFF_BYTE_LIMIT`] bytes and looks for a NUL byte.
///
/// The sample is decoded lossily, so stray bytes that are not UTF-8 (a Windows-1252
/// `é` in a Makefile) never reject a file. Only a NUL byte marks it as binary.
fn sniff_is_text(path: &Path) -> std::io::Result<bool> {
    let mut sample = Vec::with_capacity(SNIFF_BYTE_LIMIT);
    File::open(path)?
        .take(SNIFF_BYTE_LIMIT as u64)
        .read_to_end(&mut sample)?;

    Ok(!sample.contains(&0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_known_extensions_are_text_without_sniffing() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        // Binary content, but the extension decides.
        fs::write(root.join("data.JSON"), [0u8, 159, 146, 150]).unwrap();
        fs::write(root.join(".gitignore"), "target/\n").unwrap();
        fs::write(root.join("README"), "hello").unwrap();
        fs::write(root.join(".env"), "KEY=value").unwrap();

        assert!(is_likely_text(&root.join("data.JSON"), Some(root)));
        assert!(is_likely_text(&root.join(".gitignore"), Some(root)));
        assert!(is_likely_text(&root.join("README"), Some(root)));
        assert!(is_likely_text(&root.join(".env"), Some(root)));
    }

    #[test]
    fn test_unknown_extension_is_sniffed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("Makefile"), "all:\n\techo hi\n").unwrap();
        fs::write(root.join("blob.bin"), [0u8, 159, 146, 150, 255, 0]).unwrap();
        fs::write(root.join("latin1.dat"), [b'c', b'a', b'f', 0xE9, b'!']).unwrap();
        fs::write(root.join("empty"), b"").unwrap();

        assert!(is_likely_text(&root.join("main.rs"), Some(root)));
        assert!(is_likely_text(&root.join("Makefile"), Some(root)));
        assert!(is_likely_text(&root.join("empty"), Some(root)));
        assert!(!is_likely_text(&root.join("blob.bin"), Some(root)));
        assert!(is_likely_text(&root.join("latin1.dat"), Some(root)));
    }

    #[test]
    fn test_stray_non_utf8_byte_does_not_drop_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("Makefile"), b"# caf\xe9\nall:\n\techo hi\n").unwrap();

        assert!(is_likely_text(&root.join("Makefile"), Some(root)));

        let selection: crate::core::SelectionSet = [root.to_path_buf()].into_iter().collect();
        let result = crate::core::FileHandler::aggregate_selection(&selection, Some(root));
        assert_eq!(result.files_read, 2);
        assert!(result.text.contains("Makefile\n```\n# caf\u{FFFD}\nall:"));
    }

    #[test]
    fn test_multibyte_sequence_cut_at_limit_is_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.unknown");
        let mut content = "a".repeat(SNIFF_BYTE_LIMIT - 1).into_bytes();
        content.extend_from_slice("é and more".as_bytes());
        fs::write(&path, content).unwrap();

        assert!(is_likely_text(&path, Some(dir.path())));
    }

    #[test]
    fn test_directories_and_missing_paths_are_not_text() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("docs.md")).unwrap();

        assert!(!is_likely_text(&root.join("docs.md"), Some(root)));
        assert!(!is_likely_text(&root.join("missing.txt"), Some(root)));
    }

    #[test]
    fn test_excluded_locations_are_not_text() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".github/workflows")).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join(".github/workflows/ci.yml"), "on: push").unwrap();

        assert!(!is_likely_text(
            &root.join("node_modules/pkg/index.js"),
            Some(root)
        ));
        assert!(!is_likely_text(
            &root.join(".github/workflows/ci.yml"),
            Some(root)
        ));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script");
        fs::write(&path, "#!/bin/sh\necho ok\n").unwrap();

        let first = is_likely_text(&path, Some(dir.path()));
        let second = is_likely_text(&path, Some(dir.path()));
        assert_eq!(first, second);
        assert!(first);
    }
}
