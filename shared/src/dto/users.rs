use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directory user record, keyed by wallet address.
///
/// `GET /api/users/{wallet}` returns this shape directly; `POST /api/users`
/// wraps it in [`CreateUserResponse`]. The wallet address is unique and
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Mongo-style record id, `_id` on the wire.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub wallet_address: String,
    /// Display name chosen at registration. Defaults to empty when the
    /// backend returns a bare record; see [`UserRecord::display_name`].
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<f64>,
    /// Externally computed on-chain asset distribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_data: Option<ChainData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<FriendRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wanted_tokens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_tokens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Display name with the backend's fallback for nameless records.
    pub fn display_name(&self) -> &str {
        if self.nickname.trim().is_empty() {
            "Anonymous User"
        } else {
            &self.nickname
        }
    }

    /// Wallet addresses of this user's friends, skipping malformed refs.
    pub fn friend_addresses(&self) -> Vec<&str> {
        self.friends.iter().filter_map(FriendRef::address).collect()
    }
}

/// Chain-asset distribution attached to a user record.
///
/// `distribution` maps token symbols to externally computed portfolio values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChainData {
    #[serde(default)]
    pub distribution: BTreeMap<String, f64>,
}

/// A friend edge as stored by the directory service.
///
/// The backend has historically returned either bare wallet addresses or
/// embedded record objects in the `friends` array; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FriendRef {
    Address(String),
    Record {
        #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wallet_address: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nickname: Option<String>,
    },
}

impl FriendRef {
    /// The friend's wallet address, if one is present in this ref.
    pub fn address(&self) -> Option<&str> {
        match self {
            FriendRef::Address(addr) => Some(addr),
            FriendRef::Record { wallet_address, .. } => wallet_address.as_deref(),
        }
    }
}

/// The client-side cached identity: the subset of a [`UserRecord`] the
/// session keeps once authenticated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub wallet_address: String,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for Identity {
    fn from(record: UserRecord) -> Self {
        let nickname = record.display_name().to_string();
        Self {
            wallet_address: record.wallet_address,
            nickname,
            user_id: record.id,
            created_at: record.created_at,
        }
    }
}

/// `POST /api/users` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub wallet_address: String,
    pub nickname: String,
}

/// `POST /api/users` success body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserResponse {
    pub user: UserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/users/match?wallet1=&wallet2=` success body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchScoreResponse {
    pub match_percentage: u8,
}

/// `POST /api/users/add_friend` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddFriendRequest {
    pub wallet_address: String,
    pub friend_address: String,
}

/// `PATCH /api/users/{wallet}/update_tokens` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateTokensRequest {
    pub tokens: f64,
}

/// Error body. The directory service is inconsistent about whether the
/// detail lives under `error` or `message`, so both are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Best-effort human-readable detail.
    pub fn detail(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("Unknown error")
    }

    /// Whether this error denotes the duplicate-registration conflict that
    /// callers treat as success.
    pub fn is_already_exists(&self) -> bool {
        self.detail().to_ascii_lowercase().contains("already exists")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_tolerates_minimal_shape() {
        let record: UserRecord =
            serde_json::from_str(r#"{"wallet_address":"0xAAA"}"#).unwrap();
        assert_eq!(record.wallet_address, "0xAAA");
        assert_eq!(record.display_name(), "Anonymous User");
        assert!(record.friends.is_empty());
    }

    #[test]
    fn friends_accept_both_wire_shapes() {
        let record: UserRecord = serde_json::from_str(
            r#"{
                "wallet_address": "0xAAA",
                "nickname": "Bob",
                "friends": [
                    "0xBBB",
                    {"_id": "abc", "wallet_address": "0xCCC", "nickname": "Carol"},
                    {"_id": "def"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(record.friend_addresses(), vec!["0xBBB", "0xCCC"]);
    }

    #[test]
    fn identity_from_record_keeps_id_and_falls_back_on_name() {
        let record: UserRecord = serde_json::from_str(
            r#"{"_id":"665f1c2e","wallet_address":"0xAAA","nickname":"  "}"#,
        )
        .unwrap();
        let identity = Identity::from(record);
        assert_eq!(identity.user_id.as_deref(), Some("665f1c2e"));
        assert_eq!(identity.nickname, "Anonymous User");
    }

    #[test]
    fn already_exists_conflict_is_detected_in_either_field() {
        let by_message: ErrorResponse =
            serde_json::from_str(r#"{"message":"User already exists"}"#).unwrap();
        assert!(by_message.is_already_exists());

        let by_error: ErrorResponse =
            serde_json::from_str(r#"{"error":"user already exists"}"#).unwrap();
        assert!(by_error.is_already_exists());

        let other: ErrorResponse =
            serde_json::from_str(r#"{"error":"nickname taken"}"#).unwrap();
        assert!(!other.is_already_exists());
    }

    #[test]
    fn chain_data_distribution_round_trips() {
        let record: UserRecord = serde_json::from_str(
            r#"{
                "wallet_address": "0xAAA",
                "chain_data": {"distribution": {"ETH": 62.5, "USDC": 37.5}}
            }"#,
        )
        .unwrap();
        let chain_data = record.chain_data.unwrap();
        assert_eq!(chain_data.distribution["ETH"], 62.5);
        assert_eq!(chain_data.distribution.len(), 2);
    }
}
