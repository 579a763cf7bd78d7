//! Discover page: the potential-match feed.
//!
//! Candidates come from the directory (everyone minus self, friends, and
//! already-matched wallets), each annotated with the externally computed
//! match percentage. A like is decided locally (the directory has no
//! like/pass endpoint); a mutual match creates the chat thread and friend
//! edge and drops the pair into the local match cache.

use leptos::prelude::*;
use leptos::task::spawn_local;
use shared::dto::users::UserRecord;

use crate::components::tip::TipDialog;
use crate::components::toast::{use_toast_context, ToastContext};
use crate::services::directory::{DirectoryClient, DirectoryError};
use crate::services::ethereum::{self, WalletError};
use crate::services::token::{self, TokenAmount, TokenError};
use crate::state::storage::{self, CachedMatch};
use crate::state::use_session_context;
use crate::utils::constants::{
    DISCOVER_FEED_LIMIT, MUTUAL_MATCH_PROBABILITY, RIZZ_SYMBOL, WELCOME_BONUS_RIZZ,
};
use crate::utils::format::{avatar_initials, format_asset_share, format_match_percentage};

/// One feed entry: the candidate's record plus their score against us.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub record: UserRecord,
    pub percentage: u8,
}

#[component]
pub fn DiscoverPage() -> impl IntoView {
    let session = use_session_context();
    let toasts = use_toast_context();

    let (candidates, set_candidates) = signal(Vec::<MatchCandidate>::new());
    let (loading, set_loading) = signal(true);
    let (rizz_balance, set_rizz_balance) = signal(None::<TokenAmount>);
    // (address, nickname) of the tip recipient while the dialog is open.
    let (tip_target, set_tip_target) = signal(None::<(String, String)>);

    // Load the feed once per wallet, not once per re-render.
    let feed_loaded_for = StoredValue::new(None::<String>);
    Effect::new(move || {
        let Some(me) = session.wallet_address() else {
            return;
        };
        if feed_loaded_for.get_value().as_deref() == Some(me.as_str()) {
            return;
        }
        feed_loaded_for.set_value(Some(me.clone()));
        set_loading.set(true);
        spawn_local(async move {
            match load_feed(&DirectoryClient::default(), &me).await {
                Ok(feed) => set_candidates.set(feed),
                Err(err) => {
                    log::error!("feed load failed: {}", err);
                    toasts.error("Discover unavailable", "Could not load potential matches");
                }
            }
            set_loading.set(false);
        });
    });

    // One-time token registration (welcome bonus) + balance load.
    let bonus_checked_for = StoredValue::new(None::<String>);
    Effect::new(move || {
        let Some(me) = session.wallet_address() else {
            return;
        };
        if bonus_checked_for.get_value().as_deref() == Some(me.as_str()) {
            return;
        }
        bonus_checked_for.set_value(Some(me.clone()));
        spawn_local(async move {
            ensure_welcome_bonus(me, set_rizz_balance, toasts).await;
        });
    });

    let advance = move |wallet: String| {
        set_candidates.update(|feed| {
            feed.retain(|c| !c.record.wallet_address.eq_ignore_ascii_case(&wallet))
        });
    };

    let pass = move |candidate: MatchCandidate| {
        advance(candidate.record.wallet_address);
    };

    let like = move |candidate: MatchCandidate| {
        advance(candidate.record.wallet_address.clone());
        // Mutual interest is decided locally; see MUTUAL_MATCH_PROBABILITY.
        if js_sys::Math::random() >= MUTUAL_MATCH_PROBABILITY {
            return;
        }
        let Some(me) = session.wallet_address() else {
            return;
        };
        spawn_local(async move {
            create_match(&DirectoryClient::default(), &me, &candidate, toasts).await;
        });
    };

    view! {
        <div class="page discover-page">
            <div class="page-header">
                <h1>"Discover"</h1>
                <span class="balance-chip">
                    {move || match rizz_balance.get() {
                        Some(balance) => format!("{} {}", balance, RIZZ_SYMBOL),
                        None => format!("-- {}", RIZZ_SYMBOL),
                    }}
                </span>
            </div>

            {move || {
                if loading.get() {
                    return view! { <p class="subtitle">"Finding wallets on your wavelength..."</p> }
                        .into_any();
                }
                match candidates.get().first().cloned() {
                    Some(candidate) => {
                        let remaining = candidates.get().len();
                        view! {
                            <CandidateCard
                                candidate=candidate.clone()
                                remaining=remaining
                                on_like=Callback::new(move |c| like(c))
                                on_pass=Callback::new(move |c| pass(c))
                                on_tip=Callback::new(move |target| set_tip_target.set(Some(target)))
                            />
                        }
                        .into_any()
                    }
                    None => view! {
                        <div class="card empty-feed">
                            <p>"No more potential matches right now."</p>
                            <p class="subtitle">"Check back later for new wallets."</p>
                        </div>
                    }
                    .into_any(),
                }
            }}

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

#[component]
fn CandidateCard(
    candidate: MatchCandidate,
    remaining: usize,
    on_like: Callback<MatchCandidate>,
    on_pass: Callback<MatchCandidate>,
    on_tip: Callback<(String, String)>,
) -> impl IntoView {
    let record = candidate.record.clone();
    let name = record.display_name().to_string();
    let initials = avatar_initials(&name);
    let address = record.wallet_address.clone();
    let distribution: Vec<(String, f64)> = record
        .chain_data
        .as_ref()
        .map(|cd| cd.distribution.iter().map(|(k, v)| (k.clone(), *v)).collect())
        .unwrap_or_default();
    let wanted = record.wanted_tokens.clone().unwrap_or_default();
    let offered = record.offered_tokens.clone().unwrap_or_default();

    let like_candidate = candidate.clone();
    let pass_candidate = candidate.clone();
    let tip_name = name.clone();
    let tip_address = address.clone();

    view! {
        <div class="card candidate-card">
            <div class="candidate-header">
                <span class="avatar">{initials}</span>
                <div>
                    <h2>{name.clone()}</h2>
                    <p class="wallet-address">{shared::utils::truncate_address(&address)}</p>
                </div>
                <span class="match-badge">{format_match_percentage(candidate.percentage)}</span>
            </div>

            {(!distribution.is_empty()).then(|| view! {
                <div class="asset-chart">
                    <h3>"Chain assets"</h3>
                    {distribution.into_iter().map(|(symbol, share)| view! {
                        <div class="asset-row">
                            <span class="asset-symbol">{symbol}</span>
                            <span class="asset-share">{format_asset_share(share)}</span>
                        </div>
                    }).collect::<Vec<_>>()}
                </div>
            })}

            {(!wanted.is_empty() || !offered.is_empty()).then(|| view! {
                <div class="preferences">
                    <p>"Wants: " {wanted.join(", ")}</p>
                    <p>"Offers: " {offered.join(", ")}</p>
                </div>
            })}

            <div class="candidate-actions">
                <button class="btn btn-secondary" on:click=move |_| on_pass.run(pass_candidate.clone())>
                    "Pass"
                </button>
                <button class="btn" on:click=move |_| on_like.run(like_candidate.clone())>
                    "Like"
                </button>
                <button
                    class="btn btn-secondary"
                    on:click=move |_| on_tip.run((tip_address.clone(), tip_name.clone()))
                >
                    "Tip"
                </button>
            </div>
            <p class="subtitle">{format!("{} wallets in your feed", remaining)}</p>
        </div>
    }
}

/// Build the candidate feed for `me`.
async fn load_feed(
    directory: &DirectoryClient,
    me: &str,
) -> Result<Vec<MatchCandidate>, DirectoryError> {
    let all = directory.list_users().await?;

    // Friends come from our own record; a failed lookup just means an
    // unfiltered feed, not a failed page.
    let friends: Vec<String> = match directory.lookup_user(me).await {
        Ok(Some(own)) => own
            .friend_addresses()
            .into_iter()
            .map(|a| a.to_lowercase())
            .collect(),
        Ok(None) => Vec::new(),
        Err(err) => {
            log::warn!("own record unavailable while building feed: {}", err);
            Vec::new()
        }
    };
    let matched: Vec<String> = storage::load_matches()
        .into_iter()
        .map(|m| m.wallet_address.to_lowercase())
        .collect();

    let mut feed = Vec::new();
    for user in all
        .into_iter()
        .filter(|u| !u.wallet_address.is_empty())
        .filter(|u| !u.wallet_address.eq_ignore_ascii_case(me))
        .filter(|u| !friends.contains(&u.wallet_address.to_lowercase()))
        .filter(|u| !matched.contains(&u.wallet_address.to_lowercase()))
        .take(DISCOVER_FEED_LIMIT)
    {
        let percentage = directory.match_percentage(me, &user.wallet_address).await;
        feed.push(MatchCandidate {
            record: user,
            percentage,
        });
    }
    Ok(feed)
}

/// Mutual like: open the chat, record the friend edge, cache the match.
async fn create_match(
    directory: &DirectoryClient,
    me: &str,
    candidate: &MatchCandidate,
    toasts: ToastContext,
) {
    let them = &candidate.record.wallet_address;

    let chat_id = match directory.create_chat(me, them).await {
        Ok(id) => id,
        Err(err) => {
            log::warn!("chat creation with {} failed: {}", them, err);
            None
        }
    };
    if let Err(err) = directory.add_friend(me, them).await {
        log::warn!("friend edge for {} failed: {}", them, err);
    }

    let mut cached = storage::load_matches();
    if !cached
        .iter()
        .any(|m| m.wallet_address.eq_ignore_ascii_case(them))
    {
        cached.push(CachedMatch {
            wallet_address: them.clone(),
            nickname: candidate.record.display_name().to_string(),
            match_percentage: candidate.percentage,
            chat_id: chat_id.clone(),
            last_message: chat_id
                .is_some()
                .then(|| "You've matched! Start chatting now.".to_string()),
            unread_count: u32::from(chat_id.is_some()),
            matched_at: Some(String::from(js_sys::Date::new_0().to_iso_string())),
        });
        storage::store_matches(&cached);
    }

    toasts.success(
        "It's a match!",
        format!("You and {} liked each other", candidate.record.display_name()),
    );
}

/// Make sure the signed-in wallet holds its one-time welcome bonus, then
/// load the balance. Registration here is the only implicit one; tipping
/// never registers on the sender's behalf.
async fn ensure_welcome_bonus(
    me: String,
    set_balance: WriteSignal<Option<TokenAmount>>,
    toasts: ToastContext,
) {
    if let Err(err) = ethereum::ensure_chain().await {
        log::warn!("not on the application chain: {}", err);
        return;
    }
    match token::is_registered(&me).await {
        Ok(true) => {}
        Ok(false) => {
            toasts.info(
                "Registering",
                format!(
                    "Setting up your account to receive {} {} tokens...",
                    WELCOME_BONUS_RIZZ, RIZZ_SYMBOL
                ),
            );
            match token::register(&me).await {
                Ok(()) => toasts.success(
                    "Registration successful",
                    format!(
                        "You've received {} {} tokens as a welcome bonus!",
                        WELCOME_BONUS_RIZZ, RIZZ_SYMBOL
                    ),
                ),
                Err(TokenError::Wallet(WalletError::Rejected)) => {
                    log::info!("welcome-bonus registration declined in wallet");
                    return;
                }
                Err(err) => {
                    log::error!("welcome-bonus registration failed: {}", err);
                    toasts.error(
                        "Registration failed",
                        "Could not register your account. Please try again.",
                    );
                    return;
                }
            }
        }
        Err(err) => {
            log::error!("registration check failed: {}", err);
            toasts.error("Error", "Could not connect to the blockchain");
            return;
        }
    }
    match token::balance_of(&me).await {
        Ok(balance) => set_balance.set(Some(balance)),
        Err(err) => log::error!("balance query failed: {}", err),
    }
}
