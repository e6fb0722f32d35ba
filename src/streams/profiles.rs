//! Profiles stream
//!
//! Reads `GET /profiles` and, as a side effect of parsing, records the
//! resolved profile ids into the shared store so the balance streams can
//! address their endpoint.

use super::{expect_array, HttpStream};
use crate::error::Result;
use crate::profiles::{ProfileStore, ResolvedProfiles};
use crate::windows::SyncWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

pub struct ProfilesStream {
    start_date: NaiveDate,
    store: ProfileStore,
}

impl ProfilesStream {
    pub fn new(start_date: NaiveDate, store: ProfileStore) -> Self {
        Self { start_date, store }
    }
}

#[async_trait]
impl HttpStream for ProfilesStream {
    fn name(&self) -> &'static str {
        "profiles"
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn path(&self, _window: &SyncWindow) -> Result<String> {
        Ok("profiles".to_string())
    }

    fn parse_response(&self, body: &Value) -> Result<Vec<Value>> {
        let records = expect_array(self.name(), body)?;
        self.store.record(&ResolvedProfiles::from_records(&records));
        Ok(records)
    }
}
