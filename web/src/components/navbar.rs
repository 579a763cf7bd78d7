//! Navigation Bar Component

use leptos::prelude::*;
use leptos_router::components::A;
use shared::utils::truncate_address;

use crate::state::use_session_context;

#[component]
pub fn Navbar() -> impl IntoView {
    let session = use_session_context();

    view! {
        <nav>
            <div class="nav-inner">
                <A href="/" attr:class="nav-link-clean">
                    <span class="nav-title">
                        <span class="vibe-pink">"Vibe"</span><span class="match-white">"Match"</span>
                    </span>
                </A>
                {move || session.is_authenticated().then(|| view! {
                    <div class="nav-links">
                        <A href="/discover" attr:class="nav-link">"Discover"</A>
                        <A href="/matches" attr:class="nav-link">"Matches"</A>
                        <A href="/profile" attr:class="nav-link">"Profile"</A>
                        <span class="wallet-chip">
                            {session.wallet_address().map(|addr| truncate_address(&addr))}
                        </span>
                    </div>
                })}
            </div>
        </nav>
    }
}
