//! Responsible for transforming the `AppState` into a `UiState` view model.
//!
//! This module acts as a presentation layer, preparing data specifically for consumption
//! by a front end. It builds the nested tree for expanded directories only, marks
//! selection and filter matches, and computes status text and button enablement.

use crate::core::{SearchEngine, SelectionSet, TreeEntry, TreeGenerator};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::state::AppState;

/// A serializable representation of the application state for the UI.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub current_path: Option<PathBuf>,
    pub filter_text: String,
    pub tree: Vec<TreeNode>,
    pub visible_count: usize,
    pub selected_count: usize,
    pub is_aggregating: bool,
    pub status_message: String,
    pub start_prompt: String,
    pub end_prompt: String,
    /// Aggregation can be triggered: a selection exists and nothing is in flight.
    pub can_generate: bool,
    pub can_select_all: bool,
    pub can_deselect_all: bool,
    pub can_refresh: bool,
}

/// How a node relates to the current selection.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    None,
    /// The node itself is selected.
    Selected,
    /// A selected ancestor directory covers this node.
    Inherited,
}

/// A serializable representation of a single row in the file tree for the UI.
#[derive(Serialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Item {
        name: String,
        path: PathBuf,
        is_directory: bool,
        is_expanded: bool,
        selection_state: SelectionState,
        /// The name itself contains the filter (as opposed to being an ancestor of a match).
        is_match: bool,
        children: Vec<TreeNode>,
    },
    Placeholder {
        message: String,
    },
}

/// Creates the complete `UiState` from the current `AppState`.
pub fn generate_ui_state(state: &AppState) -> UiState {
    let has_root = state.current_path.is_some();
    let tree = match &state.current_path {
        Some(root) if state.visible_paths.contains(root) => build_level(root, state),
        _ => Vec::new(),
    };

    UiState {
        current_path: state.current_path.clone(),
        filter_text: state.filter_text.clone(),
        tree,
        visible_count: state.visible_paths.len(),
        selected_count: state.selected_paths.len(),
        is_aggregating: state.is_aggregating,
        status_message: status_message(state),
        start_prompt: state.start_prompt.clone(),
        end_prompt: state.end_prompt.clone(),
        can_generate: has_root && !state.selected_paths.is_empty() && !state.is_aggregating,
        can_select_all: has_root && !state.visible_paths.is_empty(),
        can_deselect_all: !state.selected_paths.is_empty(),
        can_refresh: has_root,
    }
}

/// Builds the nodes of one directory level, recursing into expanded directories.
fn build_level(directory: &Path, state: &AppState) -> Vec<TreeNode> {
    TreeGenerator::children_of(directory, &state.visible_paths)
        .into_iter()
        .map(|entry| match entry {
            TreeEntry::Node {
                name,
                path,
                is_directory,
            } => {
                let is_expanded = is_directory && state.expanded_dirs.contains(&path);
                let children = if is_expanded {
                    build_level(&path, state)
                } else {
                    Vec::new()
                };
                TreeNode::Item {
                    selection_state: selection_state(&path, &state.selected_paths),
                    is_match: SearchEngine::is_highlighted(&path, &state.filter_text),
                    name,
                    path,
                    is_directory,
                    is_expanded,
                    children,
                }
            }
            TreeEntry::Placeholder { message } => TreeNode::Placeholder { message },
        })
        .collect()
}

/// Determines how `path` is covered by the selection.
pub fn selection_state(path: &Path, selected: &SelectionSet) -> SelectionState {
    if selected.contains(path) {
        SelectionState::Selected
    } else if path.ancestors().skip(1).any(|ancestor| selected.contains(ancestor)) {
        SelectionState::Inherited
    } else {
        SelectionState::None
    }
}

fn status_message(state: &AppState) -> String {
    let Some(root) = &state.current_path else {
        return "No directory selected.".to_string();
    };

    if state.is_aggregating {
        return format!(
            "Aggregating {} selected items...",
            state.selected_paths.len()
        );
    }

    // Only the root left means nothing below it survived the filter.
    if state.visible_paths.len() <= 1 {
        return if state.filter_text.is_empty() {
            "Folder is empty or everything is filtered out.".to_string()
        } else {
            format!("Nothing found for '{}'.", state.filter_text)
        };
    }

    let mut message = format!(
        "{}: {} visible items, {} selected.",
        root.display(),
        state.visible_paths.len() - 1,
        state.selected_paths.len()
    );
    if let Some(result) = &state.last_result {
        message.push_str(&format!(
            " Last run: {} files, {} unreadable, {} directory errors.",
            result.files_read, result.read_failures, result.directory_errors
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filtering::apply_filters;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn loaded_state() -> (TempDir, AppState) {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("sub/c.py"), "c").unwrap();

        let mut state = AppState::default();
        state.current_path = Some(root.to_path_buf());
        apply_filters(&mut state);
        (dir, state)
    }

    fn names(nodes: &[TreeNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                TreeNode::Item { name, .. } => name.clone(),
                TreeNode::Placeholder { message } => format!("[{message}]"),
            })
            .collect()
    }

    #[test]
    fn test_collapsed_directories_have_no_children() {
        let (_dir, state) = loaded_state();

        let ui = generate_ui_state(&state);

        assert_eq!(names(&ui.tree), vec!["sub", "a.txt"]);
        match &ui.tree[0] {
            TreeNode::Item {
                is_expanded,
                children,
                ..
            } => {
                assert!(!is_expanded);
                assert!(children.is_empty());
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_expanded_directory_lists_children() {
        let (dir, mut state) = loaded_state();
        state.expanded_dirs.insert(dir.path().join("sub"));

        let ui = generate_ui_state(&state);

        match &ui.tree[0] {
            TreeNode::Item { children, .. } => assert_eq!(names(children), vec!["c.py"]),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_filter_marks_matches_and_status() {
        let (dir, mut state) = loaded_state();
        state.filter_text = "C.PY".to_string();
        apply_filters(&mut state);
        state.expanded_dirs.insert(dir.path().join("sub"));

        let ui = generate_ui_state(&state);

        assert_eq!(names(&ui.tree), vec!["sub"]);
        match &ui.tree[0] {
            TreeNode::Item {
                is_match, children, ..
            } => {
                assert!(!is_match);
                assert!(matches!(children[0], TreeNode::Item { is_match: true, .. }));
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert!(ui.status_message.contains("2 visible items"));

        state.filter_text = "zzz".to_string();
        apply_filters(&mut state);
        let ui = generate_ui_state(&state);
        assert!(ui.tree.is_empty());
        assert_eq!(ui.status_message, "Nothing found for 'zzz'.");
    }

    #[test]
    fn test_button_states() {
        let (dir, mut state) = loaded_state();

        let ui = generate_ui_state(&state);
        assert!(!ui.can_generate);
        assert!(ui.can_select_all);
        assert!(!ui.can_deselect_all);

        state.selected_paths.insert(dir.path().join("a.txt"));
        assert!(generate_ui_state(&state).can_generate);

        state.is_aggregating = true;
        let ui = generate_ui_state(&state);
        assert!(!ui.can_generate);
        assert!(ui.status_message.starts_with("Aggregating"));
    }

    #[test]
    fn test_no_directory_selected() {
        let ui = generate_ui_state(&AppState::default());

        assert_eq!(ui.status_message, "No directory selected.");
        assert!(ui.tree.is_empty());
        assert!(!ui.can_select_all);
        assert!(!ui.can_refresh);
    }

    #[test]
    fn test_selection_state() {
        let selected: SelectionSet = [PathBuf::from("/p/sub")].into_iter().collect();

        assert_eq!(
            selection_state(Path::new("/p/sub"), &selected),
            SelectionState::Selected
        );
        assert_eq!(
            selection_state(Path::new("/p/sub/c.py"), &selected),
            SelectionState::Inherited
        );
        assert_eq!(
            selection_state(Path::new("/p/a.txt"), &selected),
            SelectionState::None
        );
    }

    #[test]
    fn test_ui_state_serializes_tagged_nodes() {
        let (_dir, state) = loaded_state();

        let json = serde_json::to_value(generate_ui_state(&state)).unwrap();

        assert_eq!(json["tree"][0]["kind"], "item");
        assert_eq!(json["tree"][0]["selection_state"], "none");
        assert_eq!(json["can_generate"], false);
    }
}
