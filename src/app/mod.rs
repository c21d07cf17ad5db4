//! The application layer: shared state, command handlers and the background worker.
//!
//! Front ends talk to this layer through the functions in [`commands`] and receive
//! [`events::UserEvent`]s through an [`proxy::EventProxy`].

pub mod commands;
pub mod events;
pub mod filtering;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;

pub use events::UserEvent;
pub use proxy::EventProxy;
pub use state::AppState;
pub use view_model::{TreeNode, UiState};
