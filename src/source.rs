//! Connector facade
//!
//! The harness-facing surface: `spec` describes the configuration, `check`
//! validates credentials, `discover` lists the catalog, and `read` drives a
//! full sync through the engine.

use crate::config::ConnectorConfig;
use crate::engine::{Message, SyncEngine, SyncStats};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::profiles::{ProfileKind, ProfileStore};
use crate::state::StateManager;
use crate::streams::{BalancesStream, HttpStream, ProfilesStream};
use crate::types::SyncMode;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::pin::Pin;

// ============================================================================
// Connector Spec
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// JSON schema of the connector configuration
    pub connection_specification: Value,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog of available streams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogStream>,
}

/// One stream entry in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema of the stream's records
    pub json_schema: Value,

    /// Sync modes the stream supports
    pub supported_sync_modes: Vec<SyncMode>,

    /// Cursor field for incremental sync
    pub default_cursor_field: Option<Vec<String>>,
}

// ============================================================================
// Source
// ============================================================================

/// Type alias for the message stream returned by read()
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// The connector: profiles plus per-type balance streams
pub struct WiseSource {
    config: ConnectorConfig,
}

impl WiseSource {
    /// Create a source from a validated configuration
    pub fn new(config: ConnectorConfig) -> Self {
        Self { config }
    }

    /// Create a source from raw JSON configuration
    pub fn from_value(config: &Value) -> Result<Self> {
        Ok(Self::new(ConnectorConfig::from_value(config)?))
    }

    /// The connector specification
    pub fn spec() -> ConnectorSpec {
        ConnectorSpec {
            name: "source-wise".to_string(),
            title: "Wise".to_string(),
            description: Some(
                "Reads account profiles and balance snapshots from the Wise API".to_string(),
            ),
            connection_specification: json!({
                "type": "object",
                "required": ["api_token", "start_date"],
                "properties": {
                    "api_token": {
                        "type": "string",
                        "description": "API access token",
                        "airbyte_secret": true
                    },
                    "start_date": {
                        "type": "string",
                        "format": "date",
                        "description": "Sync data on or after this date (YYYY-MM-DD)"
                    },
                    "base_url": {
                        "type": "string",
                        "description": "Override the API base URL"
                    }
                }
            }),
        }
    }

    /// Test whether the configuration can be used.
    ///
    /// Only inspects the token; no network call is made.
    pub fn check(config: &Value) -> CheckResult {
        match config.get("api_token").and_then(Value::as_str) {
            Some(token) if !token.trim().is_empty() => CheckResult::success(),
            _ => CheckResult::failure("Config validation error: 'api_token' is missing or empty"),
        }
    }

    /// The catalog of available streams
    pub fn discover(&self) -> Catalog {
        let record_schema = json!({"type": "object", "additionalProperties": true});
        let streams = ["profiles", "personal_balances", "business_balances"]
            .into_iter()
            .map(|name| CatalogStream {
                name: name.to_string(),
                json_schema: record_schema.clone(),
                supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
                default_cursor_field: Some(vec!["date".to_string()]),
            })
            .collect();

        Catalog { streams }
    }

    /// Instantiate the streams, profiles first.
    ///
    /// All three share one profile store, so the profiles stream's resolution
    /// is visible to the balance streams within the same sync.
    pub fn streams(&self) -> Vec<Box<dyn HttpStream>> {
        let store = ProfileStore::new();
        let start = self.config.start_date;

        vec![
            Box::new(ProfilesStream::new(start, store.clone())),
            Box::new(BalancesStream::new(
                ProfileKind::Personal,
                start,
                store.clone(),
            )),
            Box::new(BalancesStream::new(ProfileKind::Business, start, store)),
        ]
    }

    /// Build the HTTP client for this source's configuration
    pub fn http_client(&self) -> HttpClient {
        let client_config = HttpClientConfig::builder()
            .base_url(&self.config.base_url)
            .build();
        HttpClient::with_auth(client_config, self.config.authenticator())
    }

    /// Run a full sync and collect the emitted messages plus statistics
    pub async fn sync(
        &self,
        state: StateManager,
        reference_now: DateTime<Utc>,
    ) -> Result<(Vec<Message>, SyncStats)> {
        let mut engine = SyncEngine::new(self.http_client(), state);
        let messages = engine.sync_all(&self.streams(), reference_now).await?;
        Ok((messages, engine.stats().clone()))
    }

    /// Run a full sync, exposed as a stream of messages
    pub async fn read(&self, state: StateManager) -> Result<MessageStream> {
        let (messages, _) = self.sync(state, Utc::now()).await?;
        Ok(Box::pin(futures::stream::iter(
            messages.into_iter().map(Ok::<Message, crate::error::Error>),
        )))
    }
}
