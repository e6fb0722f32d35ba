//! Stream definitions
//!
//! A stream is one logical collection of records behind an HTTP endpoint.
//! The `HttpStream` trait is the contract the sync engine drives: per-request
//! hooks (path, params, headers, response parsing, pagination) plus the
//! incremental-sync hooks (window derivation, watermark advancement). Most
//! hooks have defaults; a concrete stream typically overrides only `path`,
//! `request_params` and `parse_response`.

mod balances;
mod profiles;

pub use balances::BalancesStream;
pub use profiles::ProfilesStream;

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::state::{next_watermark, State};
use crate::windows::{day_windows, SyncWindow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Contract between a stream and the sync engine
#[async_trait]
pub trait HttpStream: Send + Sync {
    /// Stream name, used as the state key and in emitted records
    fn name(&self) -> &'static str;

    /// Configured start date, the floor for windows and watermarks
    fn start_date(&self) -> NaiveDate;

    /// Request path relative to the API base URL
    fn path(&self, window: &SyncWindow) -> Result<String>;

    /// Extra request headers (authorization is applied by the client)
    fn request_headers(&self, _window: &SyncWindow) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Query parameters for one request of a window
    fn request_params(
        &self,
        _window: &SyncWindow,
        _page_token: Option<&str>,
    ) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    /// Extract records from a response body
    fn parse_response(&self, body: &Value) -> Result<Vec<Value>>;

    /// Token for the next page, or `None` when the response is the last page
    fn next_page_token(&self, _body: &Value) -> Option<String> {
        None
    }

    /// Windows still to sync, derived from persisted state.
    ///
    /// The effective start is the stored watermark when present, otherwise
    /// the configured start date.
    fn sync_windows(&self, state: &State, reference_now: DateTime<Utc>) -> Vec<SyncWindow> {
        let effective_start = state
            .get_watermark(self.name())
            .unwrap_or_else(|| self.start_date());
        day_windows(effective_start, reference_now)
    }

    /// Fold a completed window into the stream's watermark
    fn advance_state(&self, state: &mut State, window: &SyncWindow) {
        let next = next_watermark(
            state.get_watermark(self.name()),
            window.date,
            self.start_date(),
        );
        state.set_watermark(self.name(), next);
    }

    /// Fetch and parse every page of one window.
    ///
    /// Follows `next_page_token` until it returns `None`; with the default
    /// hooks this is a single request.
    async fn read_window(&self, client: &HttpClient, window: &SyncWindow) -> Result<Vec<Value>> {
        let path = self.path(window)?;
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = RequestConfig::new();
            for (key, value) in self.request_headers(window) {
                request = request.header(key, value);
            }
            for (key, value) in self.request_params(window, page_token.as_deref())? {
                request = request.query(key, value);
            }

            let body: Value = client.get_json(&path, request).await?;
            records.extend(self.parse_response(&body)?);

            match self.next_page_token(&body) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            stream = self.name(),
            window = %window,
            records = records.len(),
            "window fetched"
        );
        Ok(records)
    }
}

/// Extract the elements of a JSON array response, rejecting anything else
pub(crate) fn expect_array(stream: &str, body: &Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items.clone()),
        other => Err(Error::Other(format!(
            "Stream '{stream}' expected a JSON array response, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
