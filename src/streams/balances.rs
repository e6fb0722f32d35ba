//! Balance streams
//!
//! One stream per profile type, reading `GET /borderless-accounts` with the
//! resolved profile id as the `profileId` query parameter. The stream holds a
//! handle to the shared profile store and fails fast when the profiles stream
//! has not resolved an id for its type yet.

use super::{expect_array, HttpStream};
use crate::error::Result;
use crate::profiles::{ProfileKind, ProfileStore};
use crate::windows::SyncWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

pub struct BalancesStream {
    kind: ProfileKind,
    start_date: NaiveDate,
    store: ProfileStore,
}

impl BalancesStream {
    pub fn new(kind: ProfileKind, start_date: NaiveDate, store: ProfileStore) -> Self {
        Self {
            kind,
            start_date,
            store,
        }
    }

    /// The profile type this stream reads balances for
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }
}

#[async_trait]
impl HttpStream for BalancesStream {
    fn name(&self) -> &'static str {
        match self.kind {
            ProfileKind::Personal => "personal_balances",
            ProfileKind::Business => "business_balances",
        }
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn path(&self, _window: &SyncWindow) -> Result<String> {
        Ok("borderless-accounts".to_string())
    }

    fn request_params(
        &self,
        _window: &SyncWindow,
        _page_token: Option<&str>,
    ) -> Result<HashMap<String, String>> {
        let profile_id = self.store.require(self.kind)?;
        Ok(HashMap::from([(
            "profileId".to_string(),
            profile_id.to_string(),
        )]))
    }

    fn parse_response(&self, body: &Value) -> Result<Vec<Value>> {
        expect_array(self.name(), body)
    }
}
