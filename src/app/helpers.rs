//! Contains helper functions to reduce boilerplate code in other `app` modules.

use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::generate_ui_state;

/// Locks the `AppState`, runs a mutation, then sends a `StateUpdate` event to the UI.
///
/// Returns whatever the mutation returns, so handlers can report an outcome.
pub fn with_state_and_notify<F, R, P: EventProxy>(
    state: &Arc<Mutex<AppState>>,
    proxy: &P,
    update_fn: F,
) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    let outcome = update_fn(&mut state_guard);

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
    outcome
}
