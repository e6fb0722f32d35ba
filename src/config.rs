//! Connector configuration
//!
//! The host harness supplies configuration as a JSON object:
//! `{ "api_token": "...", "start_date": "YYYY-MM-DD", "base_url": "..." }`.
//! `base_url` is optional and defaults to the Wise sandbox API.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default API base URL (sandbox environment)
pub const DEFAULT_BASE_URL: &str = "https://api.sandbox.transferwise.tech/v1";

/// Date format used for the start date and persisted watermarks
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Connector configuration supplied by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Personal API token, sent as a bearer Authorization header
    pub api_token: String,

    /// First date to sync, inclusive
    pub start_date: NaiveDate,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ConnectorConfig {
    /// Parse and validate a configuration from the host's JSON object
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.get("api_token").is_none() {
            return Err(Error::missing_field("api_token"));
        }
        if value.get("start_date").is_none() {
            return Err(Error::missing_field("start_date"));
        }

        let config: ConnectorConfig = serde_json::from_value(value.clone())
            .map_err(|e| Error::invalid_value("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("api_token"));
        }
        if self.base_url.is_empty() {
            return Err(Error::invalid_value("base_url", "must not be empty"));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Authenticator carrying this configuration's token
    pub fn authenticator(&self) -> crate::auth::TokenAuthenticator {
        crate::auth::TokenAuthenticator::new(&self.api_token)
    }
}
