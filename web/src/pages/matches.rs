//! Matches page: the matched-conversation list.
//!
//! Cache-first: locally stored matches render immediately; when the cache is
//! empty the list is rebuilt from the directory's chat threads, hydrated
//! with the counterparty's record.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;

use crate::components::toast::use_toast_context;
use crate::services::directory::DirectoryClient;
use crate::state::storage::{self, CachedMatch};
use crate::state::use_session_context;
use crate::utils::constants::DEFAULT_MATCH_PERCENTAGE;
use crate::utils::format::{avatar_initials, format_match_percentage};

#[component]
pub fn MatchesPage() -> impl IntoView {
    let session = use_session_context();
    let toasts = use_toast_context();

    let (matches, set_matches) = signal(Vec::<CachedMatch>::new());
    let (loading, set_loading) = signal(true);

    let loaded_for = StoredValue::new(None::<String>);
    Effect::new(move || {
        let Some(me) = session.wallet_address() else {
            return;
        };
        if loaded_for.get_value().as_deref() == Some(me.as_str()) {
            return;
        }
        loaded_for.set_value(Some(me.clone()));

        let cached = storage::load_matches();
        // Only matches with a chat thread are conversations.
        let conversations: Vec<CachedMatch> =
            cached.into_iter().filter(CachedMatch::has_chat).collect();
        if !conversations.is_empty() {
            set_matches.set(conversations);
            set_loading.set(false);
            return;
        }

        spawn_local(async move {
            match fetch_conversations(&DirectoryClient::default(), &me).await {
                Ok(fetched) => {
                    if !fetched.is_empty() {
                        storage::store_matches(&fetched);
                    }
                    set_matches.set(fetched);
                }
                Err(err) => {
                    log::error!("chat list unavailable: {}", err);
                    toasts.error("Matches unavailable", "Could not load your conversations");
                }
            }
            set_loading.set(false);
        });
    });

    view! {
        <div class="page matches-page">
            <h1>"Matches"</h1>
            {move || {
                if loading.get() {
                    return view! { <p class="subtitle">"Loading your matches..."</p> }.into_any();
                }
                let list = matches.get();
                if list.is_empty() {
                    return view! {
                        <div class="card empty-feed">
                            <p>"No matches yet."</p>
                            <p class="subtitle">"Head to Discover and start liking."</p>
                        </div>
                    }
                    .into_any();
                }
                view! {
                    <div class="match-list">
                        {list.into_iter().map(|entry| {
                            let href = entry
                                .chat_id
                                .as_deref()
                                .map(|id| format!("/chat/{}", id))
                                .unwrap_or_else(|| "/matches".to_string());
                            view! {
                                <A href=href attr:class="card match-row">
                                    <span class="avatar">{avatar_initials(&entry.nickname)}</span>
                                    <div class="match-row-main">
                                        <p class="match-name">{entry.nickname.clone()}</p>
                                        <p class="subtitle">
                                            {entry.last_message.clone()
                                                .unwrap_or_else(|| "Say hi!".to_string())}
                                        </p>
                                    </div>
                                    <div class="match-row-side">
                                        <span class="match-badge">
                                            {format_match_percentage(entry.match_percentage)}
                                        </span>
                                        {(entry.unread_count > 0).then(|| view! {
                                            <span class="unread-badge">{entry.unread_count}</span>
                                        })}
                                    </div>
                                </A>
                            }
                        }).collect::<Vec<_>>()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}

/// Rebuild the conversation list from the directory's chat threads.
async fn fetch_conversations(
    directory: &DirectoryClient,
    me: &str,
) -> Result<Vec<CachedMatch>, crate::services::directory::DirectoryError> {
    let chats = directory.list_chats(me).await?;
    let mut conversations = Vec::with_capacity(chats.len());
    for chat in chats {
        let Some(chat_id) = chat.id.clone() else {
            continue;
        };
        let them = chat.counterparty(me).to_string();
        // A missing counterparty record downgrades the row, not the page.
        let nickname = match directory.lookup_user(&them).await {
            Ok(Some(record)) => record.display_name().to_string(),
            Ok(None) => "Anonymous User".to_string(),
            Err(err) => {
                log::warn!("counterparty {} unavailable: {}", them, err);
                "Anonymous User".to_string()
            }
        };
        conversations.push(CachedMatch {
            wallet_address: them,
            nickname,
            match_percentage: DEFAULT_MATCH_PERCENTAGE,
            chat_id: Some(chat_id),
            last_message: chat.last_message.as_ref().map(|m| m.content.clone()),
            unread_count: chat.unread_count,
            matched_at: chat.created_at.map(|t| t.to_rfc3339()),
        });
    }
    Ok(conversations)
}
