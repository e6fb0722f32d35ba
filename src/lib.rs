//! # source-wise
//!
//! A data source connector for the Wise payments API. Reads account profiles
//! and per-profile balance snapshots as discrete JSON records, with
//! day-chunked incremental sync tracked by per-stream date watermarks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use source_wise::{ConnectorConfig, StateManager, WiseSource};
//!
//! #[tokio::main]
//! async fn main() -> source_wise::Result<()> {
//!     let config = ConnectorConfig::from_json(
//!         r#"{"api_token": "...", "start_date": "2023-01-01"}"#,
//!     )?;
//!     let source = WiseSource::new(config);
//!
//!     let (messages, stats) = source
//!         .sync(StateManager::in_memory(), chrono::Utc::now())
//!         .await?;
//!     println!("synced {} records", stats.records_synced);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WiseSource                            │
//! │  spec()    check() → Status    discover() → Catalog          │
//! │  read(state) → Stream<Message>                               │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────┬───────────┬───┴────────┬────────────┬───────────┐
//! │  Streams  │   HTTP    │  Windows   │  Profiles  │   State   │
//! ├───────────┼───────────┼────────────┼────────────┼───────────┤
//! │ profiles  │ GET       │ one/day    │ resolve id │ watermark │
//! │ balances  │ Retry     │ start..now │ per type   │ per stream│
//! │ (2 kinds) │ Rate Limit│            │ shared     │ persisted │
//! └───────────┴───────────┴────────────┴────────────┴───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Bearer token authentication
pub mod auth;

/// Connector configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Daily sync windows
pub mod windows;

/// State management and watermarks
pub mod state;

/// Profile resolution
pub mod profiles;

/// Stream definitions
pub mod streams;

/// Main execution engine
pub mod engine;

/// Connector facade
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ConnectorConfig;
pub use engine::{Message, SyncEngine, SyncStats};
pub use error::{Error, Result};
pub use profiles::{Profile, ProfileKind, ProfileStore, ResolvedProfiles};
pub use source::{Catalog, CheckResult, ConnectorSpec, MessageStream, WiseSource};
pub use state::{next_watermark, State, StateManager};
pub use streams::{BalancesStream, HttpStream, ProfilesStream};
pub use types::*;
pub use windows::{day_windows, SyncWindow};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
