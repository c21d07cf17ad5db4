//! Contains all the command handlers a front end can invoke.
//!
//! Each handler mutates the shared `AppState`, calls into the `core` engine with
//! request-scoped values, and sends `UserEvent`s back to the UI.

use super::events::UserEvent;
use super::filtering;
use super::helpers::with_state_and_notify;
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks;
use super::view_model::generate_ui_state;
use crate::core::{CoreError, DirectoryScanner, SearchEngine};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Loads `path` as the new root directory.
///
/// This always performs a hard reset of selection, expansion and filter. The start and
/// end prompts are kept on purpose: they are saved defaults, not per-directory state.
/// The root is remembered in the configuration for the next start. An invalid path
/// clears the loaded directory and is reported as `ShowError`.
pub fn select_directory<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Result<(), CoreError> {
    let validated = DirectoryScanner::validate_root(&path);

    with_state_and_notify(&state, &proxy, |s| {
        s.reset_directory_state();
        match validated {
            Ok(root) => {
                tracing::info!("Directory selected: {}", root.display());
                s.config.last_directory = Some(root.clone());
                s.save_config();
                s.current_path = Some(root);
                filtering::apply_filters(s);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected directory selection: {}", e);
                proxy.send_event(UserEvent::ShowError(e.to_string()));
                Err(e)
            }
        }
    })
}

/// Reopens the remembered directory when auto-loading is enabled.
///
/// A remembered path that is no longer a directory is forgotten. Returns `true` if a
/// directory was loaded.
pub fn load_last_directory<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) -> bool {
    let last_directory = {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        if !state_guard.config.auto_load_last_directory {
            return false;
        }
        match state_guard.config.last_directory.clone() {
            Some(path) if path.is_dir() => path,
            Some(path) => {
                tracing::warn!(
                    "Last directory {} no longer exists, forgetting it.",
                    path.display()
                );
                state_guard.config.last_directory = None;
                state_guard.save_config();
                return false;
            }
            None => return false,
        }
    };

    select_directory(last_directory, proxy, state).is_ok()
}

/// Clears the currently loaded directory and forgets it.
pub fn clear_directory<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.reset_directory_state();
        s.config.last_directory = None;
        s.save_config();
    });
}

/// Re-reads the loaded directory from disk.
///
/// Selection, expansion and filter are reset; prompts are kept.
pub fn refresh<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let Some(root) = s.current_path.clone() else {
            tracing::warn!("Refresh requested but no directory is loaded.");
            return;
        };
        if !root.is_dir() {
            tracing::warn!("Loaded directory {} has disappeared.", root.display());
            proxy.send_event(UserEvent::ShowError(
                CoreError::NotADirectory(root).to_string(),
            ));
            s.reset_directory_state();
            return;
        }
        tracing::info!("Refreshing {}", root.display());
        s.reset_view_state();
        filtering::apply_filters(s);
    });
}

/// Handles the initial request for state from the front end when it starts.
pub fn initialize<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}

/// Replaces the filter text and recomputes the visible tree.
///
/// The selection is left untouched, even for items the new filter hides.
pub fn update_filter<P: EventProxy>(filter: String, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        tracing::info!("Filter changed: '{}'", filter);
        s.filter_text = filter;
        filtering::apply_filters(s);
    });
}

/// Expands a collapsed directory or collapses an expanded one.
pub fn toggle_expansion<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        if !s.expanded_dirs.remove(&path) {
            tracing::debug!("Node expanded: {}", path.display());
            s.expanded_dirs.insert(path);
        } else {
            tracing::debug!("Node collapsed: {}", path.display());
        }
    });
}

/// Expands every visible directory.
pub fn expand_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let dirs = filtering::visible_directories(s);
        s.expanded_dirs.extend(dirs);
    });
}

/// Collapses every directory.
pub fn collapse_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| s.expanded_dirs.clear());
}

/// Adds `path` to or removes it from the selection.
pub fn set_selected<P: EventProxy>(
    path: PathBuf,
    selected: bool,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    with_state_and_notify(&state, &proxy, |s| {
        if selected {
            tracing::debug!("Added to selection: {}", path.display());
            s.selected_paths.insert(path);
        } else {
            tracing::debug!("Removed from selection: {}", path.display());
            s.selected_paths.remove(&path);
        }
    });
}

/// Flips the selection state of `path`.
pub fn toggle_selection<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        if !s.selected_paths.remove(&path) {
            s.selected_paths.insert(path);
        }
    });
}

/// Selects every visible item below the root that matches the filter on its own.
///
/// The root and directories shown only because a descendant matched are left out on
/// purpose. Selecting them would pull in everything next to the matches, since a
/// selected directory stands for its whole subtree.
pub fn select_all_visible<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let Some(root) = s.current_path.clone() else {
            return;
        };
        let picked: Vec<PathBuf> = s
            .visible_paths
            .iter()
            .filter(|path| is_selectable(path, &root, &s.filter_text))
            .cloned()
            .collect();
        tracing::info!("Selecting {} visible items.", picked.len());
        s.selected_paths.extend(picked);
    });
}

fn is_selectable(path: &Path, root: &Path, filter: &str) -> bool {
    path != root && SearchEngine::matches_filter(path, filter)
}

/// Clears the selection.
pub fn deselect_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        tracing::info!("Deselecting all items.");
        s.selected_paths.clear();
    });
}

/// Updates the start and end prompts and keeps them as defaults for the next run.
pub fn set_prompts<P: EventProxy>(
    start_prompt: String,
    end_prompt: String,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    with_state_and_notify(&state, &proxy, |s| {
        s.config.start_prompt = start_prompt.clone();
        s.config.end_prompt = end_prompt.clone();
        s.start_prompt = start_prompt;
        s.end_prompt = end_prompt;
        s.save_config();
    });
}

/// Aggregates the current selection in the background.
pub fn generate_content<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Result<(), CoreError> {
    tasks::start_aggregation(proxy, state)
}
