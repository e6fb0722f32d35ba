//! Sync state
//!
//! Date watermarks per stream, with optional file persistence.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{next_watermark, State, StreamState};
