//! HTTP gateway for the Tether URL shortener.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::{App, Timeouts};
pub use state::AppState;
