//! Profile resolution
//!
//! The balances endpoint is addressed by profile id, but the configured
//! credentials only carry an API token. Profile ids are discovered by reading
//! the profiles stream and remembering the id seen for each profile type.
//! The store is shared by cloning, so the profiles stream and the balance
//! streams observe the same resolution within a sync.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The two profile types the API distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Personal,
    Business,
}

impl ProfileKind {
    /// The wire value of the `type` field on a profile record
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Personal => "personal",
            ProfileKind::Business => "business",
        }
    }

    /// Parse a `type` field value; unknown types are not an error, they are
    /// simply skipped by the resolver
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(ProfileKind::Personal),
            "business" => Some(ProfileKind::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved profile: the id to use for balance requests, keyed by type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub kind: ProfileKind,
}

impl Profile {
    /// Parse the id and type out of a raw profile record
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = record.get("id").and_then(Value::as_i64)?;
        let kind = record
            .get("type")
            .and_then(Value::as_str)
            .and_then(ProfileKind::parse)?;
        Some(Self { id, kind })
    }
}

/// Profile ids extracted from a batch of profile records.
///
/// When the API returns more than one profile of the same type, the last one
/// wins, matching record order from the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProfiles {
    ids: HashMap<ProfileKind, i64>,
}

impl ResolvedProfiles {
    /// Extract profile ids from raw profile records.
    ///
    /// A record contributes an entry when it has a numeric `id` and a
    /// recognized `type`; malformed records are skipped.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut ids = HashMap::new();

        for profile in records.into_iter().filter_map(Profile::from_record) {
            ids.insert(profile.kind, profile.id);
        }

        Self { ids }
    }

    /// Look up the id resolved for a profile type
    pub fn get(&self, kind: ProfileKind) -> Option<i64> {
        self.ids.get(&kind).copied()
    }

    /// Whether no profile was resolved at all
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Shared profile store.
///
/// Cloning is cheap and every clone observes the same resolution. The
/// profiles stream writes into the store as a side effect of parsing its
/// responses; balance streams read from it when building request paths.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    inner: Arc<RwLock<ResolvedProfiles>>,
}

impl ProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge resolved profiles into the store, later entries overwriting
    /// earlier ones per type
    pub fn record(&self, resolved: &ResolvedProfiles) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        for (kind, id) in &resolved.ids {
            inner.ids.insert(*kind, *id);
        }
    }

    /// Look up the id resolved for a profile type
    pub fn get(&self, kind: ProfileKind) -> Option<i64> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.get(kind)
    }

    /// Look up the id for a profile type, failing when the profiles stream
    /// has not resolved one yet
    pub fn require(&self, kind: ProfileKind) -> Result<i64> {
        self.get(kind).ok_or(Error::ProfileNotResolved { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_kind_roundtrip() {
        assert_eq!(ProfileKind::parse("personal"), Some(ProfileKind::Personal));
        assert_eq!(ProfileKind::parse("business"), Some(ProfileKind::Business));
        assert_eq!(ProfileKind::parse("corporate"), None);
        assert_eq!(ProfileKind::Personal.to_string(), "personal");
    }

    #[test]
    fn test_profile_from_record() {
        let profile = Profile::from_record(&json!({"id": 3, "type": "business"})).unwrap();
        assert_eq!(profile.id, 3);
        assert_eq!(profile.kind, ProfileKind::Business);

        assert!(Profile::from_record(&json!({"id": 3})).is_none());
        assert!(Profile::from_record(&json!({"type": "personal"})).is_none());
    }

    #[test]
    fn test_from_records_extracts_both_kinds() {
        let records = vec![
            json!({"id": 10, "type": "personal"}),
            json!({"id": 20, "type": "business"}),
        ];
        let resolved = ResolvedProfiles::from_records(&records);

        assert_eq!(resolved.get(ProfileKind::Personal), Some(10));
        assert_eq!(resolved.get(ProfileKind::Business), Some(20));
    }

    #[test]
    fn test_from_records_last_write_wins() {
        let records = vec![
            json!({"id": 10, "type": "personal"}),
            json!({"id": 11, "type": "personal"}),
        ];
        let resolved = ResolvedProfiles::from_records(&records);

        assert_eq!(resolved.get(ProfileKind::Personal), Some(11));
    }

    #[test]
    fn test_from_records_skips_malformed() {
        let records = vec![
            json!({"type": "personal"}),
            json!({"id": "not-a-number", "type": "business"}),
            json!({"id": 30, "type": "corporate"}),
            json!({"id": 40, "type": "business"}),
        ];
        let resolved = ResolvedProfiles::from_records(&records);

        assert_eq!(resolved.get(ProfileKind::Personal), None);
        assert_eq!(resolved.get(ProfileKind::Business), Some(40));
    }

    #[test]
    fn test_store_clones_share_state() {
        let store = ProfileStore::new();
        let clone = store.clone();

        let records = vec![json!({"id": 7, "type": "personal"})];
        store.record(&ResolvedProfiles::from_records(&records));

        assert_eq!(clone.get(ProfileKind::Personal), Some(7));
    }

    #[test]
    fn test_store_merge_preserves_other_kind() {
        let store = ProfileStore::new();

        let first = vec![json!({"id": 1, "type": "personal"})];
        store.record(&ResolvedProfiles::from_records(&first));

        let second = vec![json!({"id": 2, "type": "business"})];
        store.record(&ResolvedProfiles::from_records(&second));

        assert_eq!(store.get(ProfileKind::Personal), Some(1));
        assert_eq!(store.get(ProfileKind::Business), Some(2));
    }

    #[test]
    fn test_require_fails_before_resolution() {
        let store = ProfileStore::new();
        let err = store.require(ProfileKind::Business).unwrap_err();

        assert!(matches!(
            err,
            Error::ProfileNotResolved {
                kind: ProfileKind::Business
            }
        ));
        assert!(err.to_string().contains("business"));
    }
}
