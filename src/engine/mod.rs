//! Execution engine module
//!
//! Main read loop: one stream at a time, one window at a time, one request
//! at a time. After each completed window the stream's watermark is folded
//! into state, state is persisted, and a state message is emitted, so an
//! interrupted sync resumes from the last completed day.

mod types;

pub use types::{Message, SyncStats};

use crate::error::Result;
use crate::http::HttpClient;
use crate::state::StateManager;
use crate::streams::HttpStream;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::info;

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// State manager
    state: StateManager,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, state: StateManager) -> Self {
        Self {
            client,
            state,
            stats: SyncStats::default(),
        }
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync every stream in listed order.
    ///
    /// `reference_now` is captured once by the caller so every stream sees
    /// the same window cutoff.
    pub async fn sync_all(
        &mut self,
        streams: &[Box<dyn HttpStream>],
        reference_now: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        let start = Instant::now();
        let mut messages = Vec::new();

        for stream in streams {
            match self.sync_stream(stream.as_ref(), reference_now).await {
                Ok(stream_messages) => messages.extend(stream_messages),
                Err(e) => {
                    self.stats.add_error();
                    return Err(e);
                }
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        Ok(messages)
    }

    /// Sync a single stream across its remaining windows
    pub async fn sync_stream(
        &mut self,
        stream: &dyn HttpStream,
        reference_now: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        let name = stream.name();
        let mut messages = Vec::new();

        let windows = {
            let state = self.state.state().await;
            stream.sync_windows(&state, reference_now)
        };

        info!(stream = name, windows = windows.len(), "starting sync");
        messages.push(Message::info(format!(
            "Starting sync for stream '{name}': {} window(s)",
            windows.len()
        )));

        for window in windows {
            let records = stream.read_window(&self.client, &window).await?;
            self.stats.add_request();
            self.stats.add_records(records.len());

            messages.push(Message::debug(format!(
                "Window {window}: fetched {} record(s) for '{name}'",
                records.len()
            )));

            for record in records {
                messages.push(Message::record(name, record));
            }

            let stream_state = {
                let mut state = self.state.state_mut().await;
                stream.advance_state(&mut state, &window);
                *state.get_stream_mut(name)
            };
            self.state.save().await?;

            messages.push(Message::state(name, serde_json::to_value(stream_state)?));
            self.stats.add_window();
        }

        self.stats.add_stream();
        Ok(messages)
    }
}
