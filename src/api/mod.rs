//! HTTP boundary. Handlers are thin; all lifecycle logic lives in
//! [`crate::session::RecorderService`].

pub mod routes;

pub use routes::{AppState, recorder_routes};
