//! Persisted client-local state.
//!
//! One versioned [`SessionRecord`] holds everything the reconciler needs to
//! survive a reload: last-known wallet address, the cached identity, and the
//! explicit-logout flag. It is serialized as a single JSON value and written
//! with a single `setItem` call so the persisted flags can never disagree
//! with each other after a crash mid-transition. The cached match list lives
//! under its own key.

use serde::{Deserialize, Serialize};
use shared::dto::users::Identity;
use web_sys::Storage;

pub const SESSION_STORAGE_KEY: &str = "vibematch.session.v1";
pub const MATCHES_STORAGE_KEY: &str = "vibematch.matches.v1";

/// Bumped whenever the record shape changes; records with a different
/// version are discarded at load.
pub const SESSION_RECORD_VERSION: u32 = 1;

/// The single persisted session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    /// Set by a user-initiated logout; suppresses automatic reconnect until
    /// the next successful explicit login.
    #[serde(default)]
    pub explicit_logout: bool,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            version: SESSION_RECORD_VERSION,
            wallet_address: None,
            identity: None,
            explicit_logout: false,
        }
    }
}

impl SessionRecord {
    /// Whether this record permits an automatic reconnect at startup.
    pub fn resume_eligible(&self) -> bool {
        self.wallet_address.is_some() && !self.explicit_logout
    }

    pub fn encode(&self) -> String {
        // Serialization of this shape cannot fail; fall back to an empty
        // object so a bug here never takes the session down.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decode a stored record, discarding unparsable or wrong-version blobs.
    pub fn decode(raw: &str) -> Option<Self> {
        let record: SessionRecord = serde_json::from_str(raw).ok()?;
        if record.version != SESSION_RECORD_VERSION {
            log::warn!(
                "discarding session record with unknown version {}",
                record.version
            );
            return None;
        }
        Some(record)
    }
}

/// A locally cached match, mirroring what the matches view needs without a
/// round-trip per entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedMatch {
    pub wallet_address: String,
    pub nickname: String,
    pub match_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_at: Option<String>,
}

impl CachedMatch {
    pub fn has_chat(&self) -> bool {
        self.chat_id.is_some()
    }
}

fn local_storage() -> Option<Storage> {
    gloo_utils::window().local_storage().ok().flatten()
}

/// Load the persisted session record, if any.
pub fn load_session() -> Option<SessionRecord> {
    let storage = local_storage()?;
    let raw = storage.get_item(SESSION_STORAGE_KEY).ok().flatten()?;
    SessionRecord::decode(&raw)
}

/// Persist the session record in a single write.
pub fn store_session(record: &SessionRecord) {
    let Some(storage) = local_storage() else {
        return;
    };
    if storage
        .set_item(SESSION_STORAGE_KEY, &record.encode())
        .is_err()
    {
        log::warn!("failed to persist session record");
    }
}

pub fn clear_session() {
    if let Some(storage) = local_storage() {
        storage.remove_item(SESSION_STORAGE_KEY).ok();
    }
}

/// Load the cached match list; an absent or corrupt cache reads as empty.
pub fn load_matches() -> Vec<CachedMatch> {
    let Some(storage) = local_storage() else {
        return Vec::new();
    };
    storage
        .get_item(MATCHES_STORAGE_KEY)
        .ok()
        .flatten()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn store_matches(matches: &[CachedMatch]) {
    let Some(storage) = local_storage() else {
        return;
    };
    let raw = serde_json::to_string(matches).unwrap_or_else(|_| "[]".to_string());
    if storage.set_item(MATCHES_STORAGE_KEY, &raw).is_err() {
        log::warn!("failed to persist match cache");
    }
}

pub fn clear_matches() {
    if let Some(storage) = local_storage() {
        storage.remove_item(MATCHES_STORAGE_KEY).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips() {
        let record = SessionRecord {
            version: SESSION_RECORD_VERSION,
            wallet_address: Some("0xAAA".to_string()),
            identity: Some(Identity {
                wallet_address: "0xAAA".to_string(),
                nickname: "Bob".to_string(),
                user_id: Some("665f1c2e".to_string()),
                created_at: None,
            }),
            explicit_logout: false,
        };
        let decoded = SessionRecord::decode(&record.encode()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn unknown_version_is_discarded() {
        let raw = r#"{"version": 99, "wallet_address": "0xAAA", "explicit_logout": false}"#;
        assert!(SessionRecord::decode(raw).is_none());
    }

    #[test]
    fn garbage_is_discarded() {
        assert!(SessionRecord::decode("not json").is_none());
        assert!(SessionRecord::decode("").is_none());
    }

    #[test]
    fn resume_requires_address_and_no_logout_intent() {
        let mut record = SessionRecord {
            wallet_address: Some("0xAAA".to_string()),
            ..SessionRecord::default()
        };
        assert!(record.resume_eligible());

        record.explicit_logout = true;
        assert!(!record.resume_eligible());

        record.explicit_logout = false;
        record.wallet_address = None;
        assert!(!record.resume_eligible());
    }

    #[test]
    fn cached_match_defaults_are_lenient() {
        let cached: CachedMatch = serde_json::from_str(
            r#"{"wallet_address": "0xBBB", "nickname": "Alice", "match_percentage": 85}"#,
        )
        .unwrap();
        assert!(!cached.has_chat());
        assert_eq!(cached.unread_count, 0);
    }
}
