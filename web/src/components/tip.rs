//! Tip Dialog
//!
//! Sends RIZZ from the active wallet to a friend. Every precondition is
//! checked client-side before the contract is touched; see
//! [`crate::services::token::validate_tip`]. A signature the user rejects in
//! the wallet closes the flow silently.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toast_context;
use crate::services::directory::DirectoryClient;
use crate::services::ethereum::{self, WalletError};
use crate::services::token::{self, TokenAmount, TokenError};
use crate::state::use_session_context;
use crate::utils::constants::RIZZ_SYMBOL;

#[component]
pub fn TipDialog(
    recipient_address: String,
    recipient_name: String,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let session = use_session_context();
    let toasts = use_toast_context();

    let (amount, set_amount) = signal(String::new());
    let (balance, set_balance) = signal(None::<TokenAmount>);
    let (registered, set_registered) = signal(None::<bool>);
    let (error, set_error) = signal(None::<String>);
    let (sending, set_sending) = signal(false);

    // Load sender balance and registration status once on open.
    if let Some(sender) = session.wallet_address() {
        spawn_local(async move {
            match token::balance_of(&sender).await {
                Ok(value) => set_balance.set(Some(value)),
                Err(err) => log::error!("balance query failed: {}", err),
            }
            match token::is_registered(&sender).await {
                Ok(value) => set_registered.set(Some(value)),
                Err(err) => log::error!("registration query failed: {}", err),
            }
        });
    }

    let recipient = StoredValue::new(recipient_address);
    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if sending.get_untracked() {
            return;
        }
        set_error.set(None);
        set_sending.set(true);

        let directory = DirectoryClient::default();
        let recipient = recipient.get_value();
        let amount_input = amount.get_untracked();
        let sender = session.wallet_address();

        spawn_local(async move {
            let on_chain = ethereum::on_expected_chain().await.unwrap_or(false);
            let checked = token::validate_tip(
                sender.as_deref(),
                registered.get_untracked().unwrap_or(false),
                on_chain,
                balance.get_untracked().unwrap_or(TokenAmount::ZERO),
                &amount_input,
                &recipient,
            );
            let (sender, parsed) = match (sender, checked) {
                (Some(sender), Ok(parsed)) => (sender, parsed),
                (_, Err(reason)) => {
                    set_error.set(Some(reason.to_string()));
                    set_sending.set(false);
                    return;
                }
                (None, Ok(_)) => {
                    set_sending.set(false);
                    return;
                }
            };

            match token::transfer(&sender, &recipient, parsed).await {
                Ok(()) => {
                    toasts.success(
                        "Tip sent",
                        format!("You sent {} {} tokens", parsed, RIZZ_SYMBOL),
                    );
                    // Refresh the balance and mirror it into the directory.
                    if let Ok(new_balance) = token::balance_of(&sender).await {
                        set_balance.set(Some(new_balance));
                        if let Err(err) = directory
                            .update_tokens(&sender, new_balance.as_tokens_f64())
                            .await
                        {
                            log::warn!("directory balance sync failed: {}", err);
                        }
                    }
                    set_sending.set(false);
                    on_close.run(());
                }
                // Rejected in the wallet: silent cancellation, dialog stays.
                Err(TokenError::Wallet(WalletError::Rejected)) => {
                    log::info!("tip cancelled in wallet");
                    set_sending.set(false);
                }
                Err(err) => {
                    log::error!("tip transfer failed: {}", err);
                    set_error.set(Some(err.to_string()));
                    toasts.error("Tip failed", "Transaction couldn't complete, please try again");
                    set_sending.set(false);
                }
            }
        });
    };

    view! {
        <div class="dialog-backdrop">
            <div class="dialog card">
                <h2>"Send a Tip"</h2>
                <p class="subtitle">"To " {recipient_name.clone()}</p>
                <p class="balance-line">
                    {move || match balance.get() {
                        Some(value) => format!("Your {} balance: {}", RIZZ_SYMBOL, value),
                        None => format!("Your {} balance: loading...", RIZZ_SYMBOL),
                    }}
                </p>
                <form on:submit=submit>
                    <input
                        class="amount-input"
                        placeholder="Amount"
                        prop:value=move || amount.get()
                        on:input=move |ev| set_amount.set(event_target_value(&ev))
                    />
                    {move || error.get().map(|err| view! {
                        <p class="error">{err}</p>
                    })}
                    <div class="dialog-actions">
                        <button type="submit" class="btn" disabled=move || sending.get()>
                            {move || if sending.get() { "Sending..." } else { "Send Tip" }}
                        </button>
                        <button
                            type="button"
                            class="btn btn-secondary"
                            on:click=move |_| on_close.run(())
                        >
                            "Cancel"
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
