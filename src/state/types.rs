//! State types for tracking sync progress
//!
//! Incremental streams track a single date watermark per stream: the most
//! recent day that has been fully synced. State is serialized to JSON and
//! persisted between runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete state for the connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the date watermark for a stream
    pub fn get_watermark(&self, stream: &str) -> Option<NaiveDate> {
        self.streams.get(stream)?.date
    }

    /// Set the date watermark for a stream
    pub fn set_watermark(&mut self, stream: &str, date: NaiveDate) {
        self.get_stream_mut(stream).date = Some(date);
    }

    /// Advance the watermark for a stream, never moving it backwards
    pub fn advance_watermark(&mut self, stream: &str, observed: NaiveDate) {
        let stream_state = self.get_stream_mut(stream);
        stream_state.date = Some(match stream_state.date {
            Some(current) => current.max(observed),
            None => observed,
        });
    }
}

/// State for a single stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// Most recent fully synced day
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute the next watermark after syncing a window.
///
/// A first sync initializes the watermark to the configured start date,
/// regardless of the observed day. After that the watermark only moves
/// forward: the result is the later of the stored watermark and the
/// observed day.
pub fn next_watermark(
    stored: Option<NaiveDate>,
    observed: NaiveDate,
    start_date: NaiveDate,
) -> NaiveDate {
    match stored {
        Some(current) => current.max(observed),
        None => start_date,
    }
}
