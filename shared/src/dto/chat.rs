use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chat thread between two wallets, as listed by
/// `GET /api/chats/{wallet}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user1: String,
    pub user2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<ChatMessage>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatSummary {
    /// The wallet on the other side of this thread, given our own.
    pub fn counterparty(&self, own_wallet: &str) -> &str {
        if self.user1.eq_ignore_ascii_case(own_wallet) {
            &self.user2
        } else {
            &self.user1
        }
    }
}

/// `GET /api/chats/{wallet}` success body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatListResponse {
    #[serde(default)]
    pub chats: Vec<ChatSummary>,
}

/// A single message inside a chat thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn is_from(&self, wallet: &str) -> bool {
        self.sender.eq_ignore_ascii_case(wallet)
    }
}

/// `POST /api/chats/create` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateChatRequest {
    pub user1: String,
    pub user2: String,
}

/// `POST /api/chats/create` success body. The id is optional because older
/// backend builds return an empty body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `POST /api/chats/{chatId}/send` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub sender: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_summary_uses_camel_case_wire_names() {
        let chat: ChatSummary = serde_json::from_str(
            r#"{
                "id": "c1",
                "user1": "0xAAA",
                "user2": "0xBBB",
                "lastMessage": {"sender": "0xBBB", "content": "hi"},
                "unreadCount": 2
            }"#,
        )
        .unwrap();
        assert_eq!(chat.unread_count, 2);
        assert_eq!(chat.last_message.unwrap().content, "hi");
    }

    #[test]
    fn counterparty_is_case_insensitive() {
        let chat: ChatSummary = serde_json::from_str(
            r#"{"user1": "0xAaA", "user2": "0xBBB"}"#,
        )
        .unwrap();
        assert_eq!(chat.counterparty("0xaaa"), "0xBBB");
        assert_eq!(chat.counterparty("0xBBB"), "0xAaA");
    }

    #[test]
    fn message_timestamp_parses_rfc3339() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"sender": "0xAAA", "content": "gm", "timestamp": "2025-06-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(msg.timestamp.is_some());
        assert!(msg.is_from("0xaaa"));
    }
}
