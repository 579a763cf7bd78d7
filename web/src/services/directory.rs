//! Directory Service Client
//!
//! HTTP client for the external user/match/chat REST service. The service
//! speaks plain JSON over HTTP with no authentication headers; a handful of
//! its quirks are part of the contract and are absorbed here so callers see
//! clean semantics:
//!
//! - lookup 404 is a branching signal (`Ok(None)`), not an error
//! - the duplicate-registration 400 is success-equivalent
//! - match-score failures default to a fixed percentage
//!
//! Every request carries an abort-signal timeout so a hung backend degrades
//! to the network-error branch instead of wedging the UI in a loading state.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::dto::chat::{
    ChatListResponse, ChatMessage, ChatSummary, CreateChatRequest, CreateChatResponse,
    SendMessageRequest,
};
use shared::dto::users::{
    AddFriendRequest, CreateUserRequest, CreateUserResponse, ErrorResponse, MatchScoreResponse,
    UpdateTokensRequest, UserRecord,
};
use web_sys::AbortController;

use crate::utils::constants::{API_BASE, DEFAULT_MATCH_PERCENTAGE, REQUEST_TIMEOUT_MS};

/// Directory service failures.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Request never produced a response (offline, CORS, abort timeout).
    #[error("network error: {0}")]
    Network(String),
    /// Response with a non-success status outside the contract's expected
    /// branches.
    #[error("directory error ({status}): {detail}")]
    Status { status: u16, detail: String },
    /// Response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Client for the directory REST API.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    base: String,
}

impl Default for DirectoryClient {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl DirectoryClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Look up the user record for a wallet address. `Ok(None)` on 404.
    pub async fn lookup_user(&self, wallet: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let url = self.url(&format!("/api/users/{}", urlencoding::encode(wallet)));
        let response = send(Request::get(&url)).await?;
        if response.status() == 404 {
            return Ok(None);
        }
        Ok(Some(json_body(expect_success(response).await?).await?))
    }

    /// Register a new user record.
    ///
    /// The service answers the duplicate-registration race with
    /// 400 "User already exists"; per the contract that outcome is success,
    /// so this refetches the existing record (falling back to a synthesized
    /// one) instead of surfacing an error.
    pub async fn create_user(
        &self,
        wallet: &str,
        nickname: &str,
    ) -> Result<UserRecord, DirectoryError> {
        let url = self.url("/api/users");
        let body = CreateUserRequest {
            wallet_address: wallet.to_string(),
            nickname: nickname.to_string(),
        };
        let request = Request::post(&url)
            .abort_signal(timeout_signal().as_ref())
            .json(&body)
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        if response.ok() {
            let created: CreateUserResponse = json_body(response).await?;
            return Ok(created.user);
        }

        let status = response.status();
        let error: ErrorResponse = response.json().await.unwrap_or_default();
        if status == 400 && error.is_already_exists() {
            log::info!("{} already registered, treating as success", wallet);
            match self.lookup_user(wallet).await {
                Ok(Some(record)) => return Ok(record),
                // The record exists but could not be fetched right now;
                // synthesize enough of it for the session to proceed.
                _ => {
                    return Ok(UserRecord {
                        id: None,
                        wallet_address: wallet.to_string(),
                        nickname: nickname.to_string(),
                        reputation: None,
                        chain_data: None,
                        friends: Vec::new(),
                        wanted_tokens: None,
                        offered_tokens: None,
                        created_at: None,
                    })
                }
            }
        }
        Err(DirectoryError::Status {
            status,
            detail: error.detail().to_string(),
        })
    }

    /// All user records known to the directory.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let url = self.url("/api/users");
        let response = expect_success(send(Request::get(&url)).await?).await?;
        json_body(response).await
    }

    /// Externally computed compatibility score between two wallets.
    /// Never fails: any error degrades to [`DEFAULT_MATCH_PERCENTAGE`].
    pub async fn match_percentage(&self, wallet1: &str, wallet2: &str) -> u8 {
        let url = self.url(&format!(
            "/api/users/match?wallet1={}&wallet2={}",
            urlencoding::encode(wallet1),
            urlencoding::encode(wallet2)
        ));
        let score = async {
            let response = expect_success(send(Request::get(&url)).await?).await?;
            let body: MatchScoreResponse = json_body(response).await?;
            Ok::<u8, DirectoryError>(body.match_percentage)
        }
        .await;
        match score {
            Ok(percentage) => percentage.min(100),
            Err(err) => {
                log::warn!(
                    "match score for {} / {} unavailable ({}), defaulting to {}",
                    wallet1,
                    wallet2,
                    err,
                    DEFAULT_MATCH_PERCENTAGE
                );
                DEFAULT_MATCH_PERCENTAGE
            }
        }
    }

    /// Record a friend edge between two wallets.
    pub async fn add_friend(&self, wallet: &str, friend: &str) -> Result<(), DirectoryError> {
        let url = self.url("/api/users/add_friend");
        let body = AddFriendRequest {
            wallet_address: wallet.to_string(),
            friend_address: friend.to_string(),
        };
        let request = Request::post(&url)
            .abort_signal(timeout_signal().as_ref())
            .json(&body)
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        expect_success(response).await?;
        Ok(())
    }

    /// Sync a wallet's directory-side token balance after a confirmed
    /// transfer.
    pub async fn update_tokens(&self, wallet: &str, tokens: f64) -> Result<(), DirectoryError> {
        let url = self.url(&format!(
            "/api/users/{}/update_tokens",
            urlencoding::encode(wallet)
        ));
        let request = Request::patch(&url)
            .abort_signal(timeout_signal().as_ref())
            .json(&UpdateTokensRequest { tokens })
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        expect_success(response).await?;
        Ok(())
    }

    /// Chat threads involving a wallet.
    pub async fn list_chats(&self, wallet: &str) -> Result<Vec<ChatSummary>, DirectoryError> {
        let url = self.url(&format!("/api/chats/{}", urlencoding::encode(wallet)));
        let response = expect_success(send(Request::get(&url)).await?).await?;
        let body: ChatListResponse = json_body(response).await?;
        Ok(body.chats)
    }

    /// Messages in a chat thread, oldest first.
    pub async fn chat_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, DirectoryError> {
        let url = self.url(&format!("/api/chats/{}", urlencoding::encode(chat_id)));
        let response = expect_success(send(Request::get(&url)).await?).await?;
        json_body(response).await
    }

    /// Open a chat thread between two wallets.
    pub async fn create_chat(
        &self,
        user1: &str,
        user2: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let url = self.url("/api/chats/create");
        let body = CreateChatRequest {
            user1: user1.to_string(),
            user2: user2.to_string(),
        };
        let request = Request::post(&url)
            .abort_signal(timeout_signal().as_ref())
            .json(&body)
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        let response = expect_success(response).await?;
        // Older backend builds return an empty body here.
        let created: CreateChatResponse = response.json().await.unwrap_or_default();
        Ok(created.id)
    }

    /// Append a message to a chat thread.
    pub async fn send_message(
        &self,
        chat_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!("/api/chats/{}/send", urlencoding::encode(chat_id)));
        let body = SendMessageRequest {
            sender: sender.to_string(),
            content: content.to_string(),
        };
        let request = Request::post(&url)
            .abort_signal(timeout_signal().as_ref())
            .json(&body)
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        expect_success(response).await?;
        Ok(())
    }
}

/// Abort signal that fires after [`REQUEST_TIMEOUT_MS`].
fn timeout_signal() -> Option<web_sys::AbortSignal> {
    let controller = AbortController::new().ok()?;
    let signal = controller.signal();
    gloo_timers::callback::Timeout::new(REQUEST_TIMEOUT_MS, move || controller.abort()).forget();
    Some(signal)
}

async fn send(builder: RequestBuilder) -> Result<Response, DirectoryError> {
    builder
        .abort_signal(timeout_signal().as_ref())
        .send()
        .await
        .map_err(|e| DirectoryError::Network(e.to_string()))
}

async fn expect_success(response: Response) -> Result<Response, DirectoryError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let error: ErrorResponse = response.json().await.unwrap_or_default();
    Err(DirectoryError::Status {
        status,
        detail: error.detail().to_string(),
    })
}

async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, DirectoryError> {
    response
        .json::<T>()
        .await
        .map_err(|e| DirectoryError::Decode(e.to_string()))
}
