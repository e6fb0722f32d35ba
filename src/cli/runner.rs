//! CLI runner - executes commands
//!
//! Prints harness-style JSON envelopes to stdout, one message per line in
//! `json` format.

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::engine::Message;
use crate::error::{Error, Result};
use crate::source::WiseSource;
use crate::state::StateManager;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check(),
            Commands::Discover => self.discover(),
            Commands::Read { streams } => self.read(streams.as_deref()).await,
        }
    }

    /// Load configuration, inline JSON taking precedence over the file
    fn load_config(&self) -> Result<Value> {
        if let Some(json_str) = &self.cli.config_json {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            return serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        Err(Error::config(
            "Config not specified (use --config or --config-json)",
        ))
    }

    /// Load state, inline JSON taking precedence over the file
    fn load_state(&self) -> Result<StateManager> {
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = WiseSource::spec();

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": "https://api-docs.wise.com",
                "connectionSpecification": spec.connection_specification
            }
        }));

        Ok(())
    }

    /// Check connection
    fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let result = WiseSource::check(&config);

        if result.success {
            self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "SUCCEEDED",
                    "message": "Connection successful"
                }
            }));
        } else {
            self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "FAILED",
                    "message": result.message.unwrap_or_else(|| "Check failed".to_string())
                }
            }));
        }

        Ok(())
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        let config = self.load_config()?;
        let source = WiseSource::from_value(&config)?;
        let catalog = source.discover();

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));

        Ok(())
    }

    /// Read data from streams
    async fn read(&self, stream_filter: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let source = WiseSource::from_value(&config)?;
        let state = self.load_state()?;

        let streams = source.streams();
        let selected: Option<HashSet<&str>> = stream_filter
            .map(|names| names.split(',').map(str::trim).collect::<HashSet<_>>());

        if let Some(ref names) = selected {
            let known: HashSet<&str> = streams.iter().map(|s| s.name()).collect();
            if let Some(unknown) = names.iter().find(|n| !known.contains(*n)) {
                return Err(Error::StreamNotFound {
                    stream: (*unknown).to_string(),
                });
            }
        }

        let mut engine = crate::engine::SyncEngine::new(source.http_client(), state.clone());
        let reference_now = Utc::now();
        let sync_start = std::time::Instant::now();

        let mut status = "SUCCEEDED";
        for stream in streams {
            if let Some(ref names) = selected {
                if !names.contains(stream.name()) {
                    continue;
                }
            }

            match engine.sync_stream(stream.as_ref(), reference_now).await {
                Ok(messages) => {
                    for message in &messages {
                        self.output_engine_message(message);
                    }
                }
                Err(e) => {
                    status = "FAILED";
                    self.output_message(&json!({
                        "type": "LOG",
                        "log": {
                            "level": "ERROR",
                            "message": format!("Stream '{}' failed: {e}", stream.name())
                        }
                    }));
                    break;
                }
            }
        }

        // Final state snapshot for the harness
        let final_state = state.to_json().await?;
        self.output_message(&json!({
            "type": "STATE",
            "state": serde_json::from_str::<Value>(&final_state).unwrap_or_default()
        }));

        let stats = engine.stats();
        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": status,
                "connector": "source-wise",
                "total_records": stats.records_synced,
                "total_requests": stats.requests_made,
                "total_windows": stats.windows_synced,
                "total_streams": stats.streams_synced,
                "duration_ms": sync_start.elapsed().as_millis() as u64
            }
        }));

        Ok(())
    }

    /// Output an engine message as a harness envelope
    fn output_engine_message(&self, msg: &Message) {
        match msg {
            Message::Record {
                stream,
                data,
                emitted_at,
            } => {
                self.output_message(&json!({
                    "type": "RECORD",
                    "record": {
                        "stream": stream,
                        "data": data,
                        "emitted_at": emitted_at.timestamp_millis()
                    }
                }));
            }
            Message::State { stream, data } => {
                self.output_message(&json!({
                    "type": "STATE",
                    "state": {
                        "stream": stream,
                        "data": data
                    }
                }));
            }
            Message::Log { level, message } => {
                self.output_message(&json!({
                    "type": "LOG",
                    "log": {
                        "level": level.as_str(),
                        "message": message
                    }
                }));
            }
        }
    }

    /// Print a message in the selected output format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
