//! Profile page: own identity, RIZZ balance, friends, logout.

use leptos::prelude::*;
use leptos::task::spawn_local;
use shared::dto::users::FriendRef;
use shared::utils::truncate_address;

use crate::components::tip::TipDialog;
use crate::components::toast::use_toast_context;
use crate::services::directory::DirectoryClient;
use crate::services::token::{self, TokenAmount};
use crate::state::use_session_context;
use crate::utils::constants::RIZZ_SYMBOL;
use crate::utils::format::avatar_initials;

/// One friend row, flattened from whichever shape the directory returned.
#[derive(Debug, Clone, PartialEq)]
struct FriendEntry {
    address: String,
    name: String,
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session_context();
    let toasts = use_toast_context();

    let (friends, set_friends) = signal(Vec::<FriendEntry>::new());
    let (balance, set_balance) = signal(None::<TokenAmount>);
    let (tip_target, set_tip_target) = signal(None::<(String, String)>);

    let loaded_for = StoredValue::new(None::<String>);
    Effect::new(move || {
        let Some(me) = session.wallet_address() else {
            return;
        };
        if loaded_for.get_value().as_deref() == Some(me.as_str()) {
            return;
        }
        loaded_for.set_value(Some(me.clone()));

        spawn_local(async move {
            match DirectoryClient::default().lookup_user(&me).await {
                Ok(Some(record)) => {
                    let entries = record
                        .friends
                        .iter()
                        .filter_map(friend_entry)
                        .collect::<Vec<_>>();
                    set_friends.set(entries);
                }
                Ok(None) => log::warn!("own record missing from directory"),
                Err(err) => {
                    log::error!("profile load failed: {}", err);
                    toasts.error("Profile unavailable", "Could not load your friends list");
                }
            }
            match token::balance_of(&me).await {
                Ok(value) => set_balance.set(Some(value)),
                Err(err) => log::error!("balance query failed: {}", err),
            }
        });
    });

    let identity = move || session.identity();

    view! {
        <div class="page profile-page">
            <h1>"Profile"</h1>

            {move || identity().map(|identity| view! {
                <div class="card profile-card">
                    <span class="avatar avatar-large">
                        {avatar_initials(&identity.nickname)}
                    </span>
                    <h2>{identity.nickname.clone()}</h2>
                    <p class="wallet-address">{identity.wallet_address.clone()}</p>
                    <p class="balance-line">
                        {move || match balance.get() {
                            Some(value) => format!("{} {}", value, RIZZ_SYMBOL),
                            None => format!("-- {}", RIZZ_SYMBOL),
                        }}
                    </p>
                </div>
            })}

            <div class="card friends-card">
                <h2>"Friends"</h2>
                {move || {
                    let list = friends.get();
                    if list.is_empty() {
                        return view! {
                            <p class="subtitle">"No friends yet. Matches become friends."</p>
                        }
                        .into_any();
                    }
                    view! {
                        <div class="friend-list">
                            {list.into_iter().map(|friend| {
                                let tip = friend.clone();
                                view! {
                                    <div class="friend-row">
                                        <span class="avatar">{avatar_initials(&friend.name)}</span>
                                        <div class="friend-main">
                                            <p>{friend.name.clone()}</p>
                                            <p class="wallet-address">
                                                {truncate_address(&friend.address)}
                                            </p>
                                        </div>
                                        <button
                                            class="btn btn-secondary"
                                            on:click=move |_| set_tip_target.set(
                                                Some((tip.address.clone(), tip.name.clone()))
                                            )
                                        >
                                            "Tip"
                                        </button>
                                    </div>
                                }
                            }).collect::<Vec<_>>()}
                        </div>
                    }
                    .into_any()
                }}
            </div>

            <button class="btn btn-danger" on:click=move |_| session.logout()>
                "Log out"
            </button>

            {move || tip_target.get().map(|(address, name)| view! {
                <TipDialog
                    recipient_address=address
                    recipient_name=name
                    on_close=move |_: ()| set_tip_target.set(None)
                />
            })}
        </div>
    }
}

fn friend_entry(friend: &FriendRef) -> Option<FriendEntry> {
    let address = friend.address()?.to_string();
    let name = match friend {
        FriendRef::Record {
            nickname: Some(nickname),
            ..
        } if !nickname.trim().is_empty() => nickname.clone(),
        _ => truncate_address(&address),
    };
    Some(FriendEntry { address, name })
}
