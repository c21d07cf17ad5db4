//! The background aggregation worker.
//!
//! Aggregation reads every selected file, so it runs off the caller's thread. At most one
//! request is in flight at a time; the worker only ever sees a snapshot of the selection
//! taken under the state lock.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::generate_ui_state;
use crate::core::{AggregationResult, CoreError, FileHandler, SelectionSet};

/// The inputs of one aggregation request, copied out of the shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub root: Option<PathBuf>,
    pub selection: SelectionSet,
}

impl AggregationRequest {
    /// Runs the request to completion on the current thread.
    pub fn run(self) -> AggregationResult {
        FileHandler::aggregate_selection(&self.selection, self.root.as_deref())
    }
}

/// Starts an aggregation of the current selection on a blocking worker thread.
///
/// Fails with [`CoreError::NoDirectorySelected`] when nothing is loaded and with
/// [`CoreError::AggregationInProgress`] while a previous request is still running.
/// Both are also reported to the UI as `ShowError`. On success the UI first receives
/// a `StateUpdate` with `is_aggregating` set, then `ShowGeneratedContent` once the
/// worker is done, followed by a final `StateUpdate`.
///
/// Must be called from within a Tokio runtime.
pub fn start_aggregation<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Result<(), CoreError> {
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    let rejection = if state_guard.is_aggregating {
        Some(CoreError::AggregationInProgress)
    } else if state_guard.current_path.is_none() {
        Some(CoreError::NoDirectorySelected)
    } else {
        None
    };
    if let Some(e) = rejection {
        tracing::warn!("Aggregation request rejected: {}", e);
        proxy.send_event(UserEvent::ShowError(e.to_string()));
        return Err(e);
    }

    let request = AggregationRequest {
        root: state_guard.current_path.clone(),
        selection: state_guard.selected_paths.clone(),
    };
    state_guard.is_aggregating = true;
    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));

    let proxy_clone = proxy.clone();
    let state_clone = state.clone();

    tracing::info!(
        "Spawning aggregation task for {} selected items.",
        request.selection.len()
    );
    // The task cannot observe the state before this guard is dropped, so the handle
    // is always stored before the task clears it.
    let handle = tokio::spawn(async move {
        aggregation_task(request, proxy_clone, state_clone).await;
    });
    state_guard.aggregation_task = Some(handle);
    Ok(())
}

/// Runs one request on the blocking pool and publishes its outcome.
async fn aggregation_task<P: EventProxy>(
    request: AggregationRequest,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let outcome = tokio::task::spawn_blocking(move || request.run())
        .await
        .map_err(CoreError::from);

    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    state_guard.is_aggregating = false;
    state_guard.aggregation_task = None;

    match outcome {
        Ok(result) => {
            tracing::info!(
                "Aggregation finished: {} blocks, {} bytes.",
                result.block_count(),
                result.text.len()
            );
            state_guard.last_result = Some(result.clone());
            proxy.send_event(UserEvent::ShowGeneratedContent(result));
        }
        Err(e) => {
            tracing::error!("Aggregation task failed: {}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    }

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}
