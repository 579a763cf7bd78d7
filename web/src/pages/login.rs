//! Gatekeeper page.
//!
//! Renders whatever the session reconciler says the visitor should see:
//! a loading screen while the provider initializes, the connect prompt, the
//! registration form for wallets without a directory record, and a redirect
//! into the app once authenticated.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::services::ethereum;
use crate::state::{use_session_context, SessionState};
use crate::utils::constants::{NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS};

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session_context();
    let navigate = use_navigate();

    // Entering Authenticated moves the visitor into the app.
    Effect::new(move || {
        if session.is_authenticated() {
            navigate("/discover", Default::default());
        }
    });

    view! {
        <div class="gate-wrapper">
            {move || match session.state() {
                SessionState::Initializing => view! { <GateSpinner/> }.into_any(),
                SessionState::Disconnected => view! { <ConnectPrompt/> }.into_any(),
                SessionState::Connecting | SessionState::CheckingIdentity { .. } => {
                    view! { <GateProgress/> }.into_any()
                }
                SessionState::RegistrationPending { address, error, submitting } => view! {
                    <RegistrationForm address=address error=error submitting=submitting/>
                }
                .into_any(),
                SessionState::Authenticated { .. } => view! { <GateSpinner/> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn GateSpinner() -> impl IntoView {
    view! {
        <div class="gate-card">
            <div class="spinner"></div>
        </div>
    }
}

#[component]
fn GateProgress() -> impl IntoView {
    view! {
        <div class="gate-card card">
            <div class="spinner"></div>
            <p class="subtitle">"Checking your wallet..."</p>
        </div>
    }
}

#[component]
fn ConnectPrompt() -> impl IntoView {
    let session = use_session_context();
    let has_provider = ethereum::provider_available();

    view! {
        <div class="gate-card card">
            <h1 class="main-header">
                <span class="vibe-pink">"Vibe"</span>
                <span class="match-white">"Match"</span>
            </h1>
            <p class="subtitle">"Find your crypto match. Chat, friend, and tip with RIZZ."</p>
            {if has_provider {
                view! {
                    <button class="btn" on:click=move |_| session.connect()>
                        "Connect Wallet"
                    </button>
                }
                .into_any()
            } else {
                view! {
                    <p class="error">
                        "No Ethereum wallet found. Please install the MetaMask extension to continue."
                    </p>
                }
                .into_any()
            }}
        </div>
    }
}

#[component]
fn RegistrationForm(
    address: String,
    error: Option<String>,
    submitting: bool,
) -> impl IntoView {
    let session = use_session_context();
    let (nickname, set_nickname) = signal(String::new());

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        session.submit_registration(nickname.get_untracked());
    };

    view! {
        <div class="gate-card card">
            <h2>"Complete Your Profile"</h2>
            <p class="subtitle wallet-address">{address}</p>
            <form on:submit=submit>
                <input
                    placeholder="Enter your nickname"
                    prop:value=move || nickname.get()
                    on:input=move |ev| set_nickname.set(event_target_value(&ev))
                    minlength=NICKNAME_MIN_CHARS.to_string()
                    maxlength=NICKNAME_MAX_CHARS.to_string()
                    autofocus
                />
                {error.map(|err| view! { <p class="error">{err}</p> })}
                <button type="submit" class="btn" disabled=submitting>
                    {if submitting { "Registering..." } else { "Register and Continue" }}
                </button>
            </form>
        </div>
    }
}
