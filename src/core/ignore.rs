//! Fixed exclusion rules shared by visibility filtering, text classification
//! and selection expansion.
//!
//! Two rules exist:
//! * a fixed set of directory names that are excluded, together with their subtrees,
//!   wherever they appear in a path;
//! * a directory whose name starts with `.` hides everything beneath it, while the
//!   directory itself stays visible.
//!
//! Both rules only look at the components strictly below the root. The root's own
//! name and the components above it are never inspected.

use std::ffi::OsStr;
use std::path::{Component, Path};

/// Directory names excluded everywhere, compared against lower-cased components.
pub const IGNORED_DIR_NAMES: &[&str] = &[
    ".git",
    ".venv",
    "venv",
    ".vscode",
    ".idea",
    "node_modules",
    "__pycache__",
    "build",
    "dist",
    "target",
    ".pytest_cache",
    ".mypy_cache",
];

/// Returns `true` if the given path component is one of the ignored directory names.
pub fn is_ignored_name(name: &OsStr) -> bool {
    let lower = name.to_string_lossy().to_lowercase();
    IGNORED_DIR_NAMES.contains(&lower.as_str())
}

/// Returns `true` if the given component marks a hidden directory.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// The normal components of `path` that the rules are allowed to inspect.
///
/// With a root, these are the components below the root. A path that does not live
/// under the root, or a call without a root, yields every normal component of the path.
fn inspected_components<'a>(path: &'a Path, root: Option<&Path>) -> Vec<&'a OsStr> {
    let scoped = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);

    scoped
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// `true` if any inspected component of `path`, including its own name, is ignored.
pub fn contains_ignored_component(path: &Path, root: Option<&Path>) -> bool {
    inspected_components(path, root)
        .into_iter()
        .any(is_ignored_name)
}

/// `true` if a directory strictly above `path` (and below the root) starts with `.`.
///
/// The item's own leading dot never hides the item itself. Every inspected component
/// above the item is a directory by construction, so no filesystem access is needed.
pub fn has_hidden_ancestor(path: &Path, root: Option<&Path>) -> bool {
    let components = inspected_components(path, root);
    let ancestors = components.len().saturating_sub(1);
    components[..ancestors].iter().any(|name| is_hidden_name(name))
}

/// The single exclusion predicate used by every component of the engine.
pub fn is_excluded(path: &Path, root: Option<&Path>) -> bool {
    contains_ignored_component(path, root) || has_hidden_ancestor(path, root)
}
