//! This module is responsible for mutating the application state by applying the filter.
//!
//! It recomputes the cached visible set from the current root and filter text. The
//! selection is never touched here: items hidden by a filter stay selected.

use crate::app::state::AppState;
use crate::core::DirectoryScanner;
use std::path::PathBuf;

/// Recomputes `visible_paths` for the current root and filter.
pub fn apply_filters(state: &mut AppState) {
    state.visible_paths = match &state.current_path {
        Some(root) => DirectoryScanner::compute_visible(root, &state.filter_text),
        None => Default::default(),
    };
    tracing::debug!(
        "Filter '{}' leaves {} visible paths",
        state.filter_text,
        state.visible_paths.len()
    );
}

/// Every visible directory, including the root.
pub fn visible_directories(state: &AppState) -> Vec<PathBuf> {
    state
        .visible_paths
        .iter()
        .filter(|path| path.is_dir())
        .cloned()
        .collect()
}
