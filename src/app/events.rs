//! Defines the events sent from the application layer to its front end.

use super::view_model::UiState;
use crate::core::AggregationResult;

/// Events delivered to whatever renders the application (a window, a terminal, a test).
#[derive(Debug)]
pub enum UserEvent {
    /// A complete state update to re-render the UI.
    StateUpdate(Box<UiState>),
    /// The result of a finished aggregation request.
    ShowGeneratedContent(AggregationResult),
    /// An error message to be displayed to the user.
    ShowError(String),
}
