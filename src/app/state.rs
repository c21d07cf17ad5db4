//! Defines the central, mutable state of the application.

use crate::config::AppConfig;
use crate::core::{AggregationResult, SelectionSet, VisiblePathSet};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` so the command handlers and the
/// background aggregation task can share it. The core engine never sees it directly:
/// handlers pass it request-scoped copies of the root, filter and selection.
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// Where the configuration is persisted. `None` uses the platform config directory.
    pub config_path: Option<PathBuf>,
    /// The currently loaded root directory.
    pub current_path: Option<PathBuf>,
    /// The filename filter typed by the user.
    pub filter_text: String,
    /// Cached result of the last visibility computation for (root, filter).
    pub visible_paths: VisiblePathSet,
    /// Files and directories picked by the user. Survives filter changes.
    pub selected_paths: SelectionSet,
    /// Directories expanded in the tree.
    pub expanded_dirs: HashSet<PathBuf>,
    /// Text placed before the aggregated content.
    pub start_prompt: String,
    /// Text placed after the aggregated content.
    pub end_prompt: String,
    /// `true` while an aggregation request is being processed.
    pub is_aggregating: bool,
    /// A handle to the running aggregation task, if any.
    pub aggregation_task: Option<JoinHandle<()>>,
    /// The outcome of the last finished aggregation.
    pub last_result: Option<AggregationResult>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), None)
    }
}

impl AppState {
    /// Creates a state with nothing loaded yet. Prompts start from the configured defaults.
    pub fn new(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            start_prompt: config.start_prompt.clone(),
            end_prompt: config.end_prompt.clone(),
            config,
            config_path,
            current_path: None,
            filter_text: String::new(),
            visible_paths: VisiblePathSet::new(),
            selected_paths: SelectionSet::new(),
            expanded_dirs: HashSet::new(),
            is_aggregating: false,
            aggregation_task: None,
            last_result: None,
        }
    }

    /// Clears everything tied to the loaded directory, keeping the root itself.
    ///
    /// A running aggregation is left alone: it works on its own snapshot and
    /// clears the in-flight flag when it finishes.
    pub fn reset_view_state(&mut self) {
        self.filter_text.clear();
        self.visible_paths.clear();
        self.selected_paths.clear();
        self.expanded_dirs.clear();
        self.last_result = None;
    }

    /// Resets all state related to a loaded directory, including the root.
    pub fn reset_directory_state(&mut self) {
        self.reset_view_state();
        self.current_path = None;
    }

    /// Persists the configuration, logging instead of failing.
    pub fn save_config(&self) {
        if let Err(e) = crate::config::settings::save_config(&self.config, self.config_path.as_deref())
        {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    /// The composed text for the last aggregation, wrapped in the current prompts.
    pub fn composed_output(&self) -> Option<String> {
        self.last_result.as_ref().map(|result| {
            crate::core::FileHandler::compose_with_prompts(
                &self.start_prompt,
                &result.text,
                &self.end_prompt,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_takes_prompts_from_config() {
        let config = AppConfig {
            start_prompt: "Explain this code.".to_string(),
            ..Default::default()
        };
        let state = AppState::new(config, None);

        assert_eq!(state.start_prompt, "Explain this code.");
        assert!(state.end_prompt.is_empty());
        assert!(state.current_path.is_none());
        assert!(!state.is_aggregating);
    }

    #[test]
    fn test_reset_directory_state_keeps_prompts() {
        let mut state = AppState::default();
        state.current_path = Some(PathBuf::from("/project"));
        state.filter_text = "main".to_string();
        state.selected_paths.insert(PathBuf::from("/project/main.rs"));
        state.expanded_dirs.insert(PathBuf::from("/project/src"));
        state.start_prompt = "Start".to_string();

        state.reset_directory_state();

        assert!(state.current_path.is_none());
        assert!(state.filter_text.is_empty());
        assert!(state.selected_paths.is_empty());
        assert!(state.expanded_dirs.is_empty());
        assert_eq!(state.start_prompt, "Start");
    }

    #[test]
    fn test_composed_output_uses_prompts() {
        let mut state = AppState::default();
        assert_eq!(state.composed_output(), None);

        state.start_prompt = "Review:".to_string();
        state.last_result = Some(AggregationResult {
            text: "a.txt\n```\nalpha\n```".to_string(),
            files_read: 1,
            ..Default::default()
        });

        assert_eq!(
            state.composed_output().as_deref(),
            Some("Review:\n\na.txt\n```\nalpha\n```")
        );
    }
}
