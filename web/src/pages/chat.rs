//! Chat page: one conversation thread.
//!
//! Messages come from the directory and refresh on a timer while the page
//! is mounted. Sends are optimistic: the message renders immediately and a
//! failed POST surfaces a toast and stays retryable.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use shared::dto::chat::ChatMessage;

use crate::components::toast::use_toast_context;
use crate::services::directory::DirectoryClient;
use crate::state::{storage, use_session_context};
use crate::utils::constants::CHAT_REFRESH_INTERVAL_MS;
use crate::utils::format::avatar_initials;

#[component]
pub fn ChatPage() -> impl IntoView {
    let session = use_session_context();
    let toasts = use_toast_context();
    let params = use_params_map();

    let chat_id = move || params.with(|p| p.get("id").unwrap_or_default());
    let counterparty = move || {
        let id = chat_id();
        storage::load_matches()
            .into_iter()
            .find(|m| m.chat_id.as_deref() == Some(id.as_str()))
            .map(|m| m.nickname)
            .unwrap_or_else(|| "Chat".to_string())
    };

    let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
    let (draft, set_draft) = signal(String::new());
    let (sending, set_sending) = signal(false);

    // Poll the thread while mounted; the alive flag ends the loop on
    // navigation away.
    let alive = StoredValue::new(true);
    on_cleanup(move || alive.set_value(false));

    let polled_chat = StoredValue::new(None::<String>);
    Effect::new(move || {
        let id = chat_id();
        if id.is_empty() || polled_chat.get_value().as_deref() == Some(id.as_str()) {
            return;
        }
        polled_chat.set_value(Some(id.clone()));
        spawn_local(async move {
            let directory = DirectoryClient::default();
            loop {
                if !alive.get_value() || polled_chat.get_value().as_deref() != Some(id.as_str()) {
                    break;
                }
                match directory.chat_messages(&id).await {
                    Ok(thread) => set_messages.set(thread),
                    Err(err) => log::warn!("chat refresh failed: {}", err),
                }
                gloo_timers::future::TimeoutFuture::new(CHAT_REFRESH_INTERVAL_MS).await;
            }
        });
    });

    let send = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get_untracked().trim().to_string();
        if content.is_empty() || sending.get_untracked() {
            return;
        }
        let Some(me) = session.wallet_address() else {
            return;
        };
        let id = chat_id();
        if id.is_empty() {
            return;
        }

        set_sending.set(true);
        // Optimistic echo; the next poll replaces it with the server copy.
        set_messages.update(|thread| {
            thread.push(ChatMessage {
                sender: me.clone(),
                content: content.clone(),
                timestamp: None,
            })
        });
        set_draft.set(String::new());

        spawn_local(async move {
            let directory = DirectoryClient::default();
            if let Err(err) = directory.send_message(&id, &me, &content).await {
                log::error!("message send failed: {}", err);
                toasts.error("Not sent", "Your message didn't go through. Try again.");
                // Roll the optimistic echo back so retry doesn't duplicate.
                set_messages.update(|thread| {
                    if let Some(last) = thread.last() {
                        if last.timestamp.is_none() && last.content == content {
                            thread.pop();
                        }
                    }
                });
                set_draft.set(content);
            }
            set_sending.set(false);
        });
    };

    view! {
        <div class="page chat-page">
            <div class="chat-header">
                <span class="avatar">{move || avatar_initials(&counterparty())}</span>
                <h1>{counterparty}</h1>
            </div>

            <div class="chat-thread">
                {move || {
                    let me = session.wallet_address().unwrap_or_default();
                    messages.get().into_iter().map(|message| {
                        let mine = message.is_from(&me);
                        let bubble = if mine { "bubble bubble-mine" } else { "bubble" };
                        let stamp = message
                            .timestamp
                            .map(|t| t.format("%H:%M").to_string())
                            .unwrap_or_default();
                        view! {
                            <div class=bubble>
                                <p>{message.content.clone()}</p>
                                <span class="bubble-stamp">{stamp}</span>
                            </div>
                        }
                    }).collect::<Vec<_>>()
                }}
            </div>

            <form class="chat-composer" on:submit=send>
                <input
                    placeholder="Type a message"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                />
                <button type="submit" class="btn" disabled=move || sending.get()>
                    "Send"
                </button>
            </form>
        </div>
    }
}
