//! Web layer: the JSON surface over editing sessions.
//!
//! Each response is the re-render signal for the presentation layer: the
//! working sequence with edit and display datetime values, visibility flags,
//! bound field errors, and the editing-mode flag.

mod dto;
mod routes;
mod state;

pub use dto::{snapshot, StopsSnapshot, StopView, UpdateFieldRequest};
pub use routes::{AppError, create_router};
pub use state::AppState;
