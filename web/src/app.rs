//! VibeMatch Web App - Leptos Frontend
//!
//! Router plus the two global contexts (toasts, session). Every route except
//! the gatekeeper requires an authenticated session.

use leptos::prelude::*;
use leptos_router::{
    components::{Redirect, Route, Router, Routes, A},
    path,
};

use crate::components::{provide_toast_context, Navbar, ToastStack};
use crate::pages::{ChatPage, DiscoverPage, LoginPage, MatchesPage, ProfilePage};
use crate::state::{provide_session_context, use_session_context};

#[component]
pub fn App() -> impl IntoView {
    let toasts = provide_toast_context();
    let session = provide_session_context(toasts);

    // Subscribe to provider events and fire the initial provider-ready
    // event once the app is mounted.
    Effect::new(move || {
        session.init();
    });

    view! {
        <Router>
            <div class="app-container">
                <Navbar/>
                <ToastStack/>
                <main>
                    <Routes fallback=|| view! { <NotFound/> }>
                        <Route path=path!("/") view=LoginPage/>
                        <Route
                            path=path!("/discover")
                            view=|| view! { <RequireAuth><DiscoverPage/></RequireAuth> }
                        />
                        <Route
                            path=path!("/matches")
                            view=|| view! { <RequireAuth><MatchesPage/></RequireAuth> }
                        />
                        <Route
                            path=path!("/chat/:id")
                            view=|| view! { <RequireAuth><ChatPage/></RequireAuth> }
                        />
                        <Route
                            path=path!("/profile")
                            view=|| view! { <RequireAuth><ProfilePage/></RequireAuth> }
                        />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}

/// Gate for authenticated routes: anyone without a session lands back on
/// the gatekeeper, which handles reconnect/registration and returns them.
#[component]
fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let session = use_session_context();
    view! {
        {move || {
            if session.is_authenticated() {
                children().into_any()
            } else {
                view! { <Redirect path="/"/> }.into_any()
            }
        }}
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="page">
            <div class="card empty-feed">
                <h1>"404 - Page Not Found"</h1>
                <p class="subtitle">"The page you're looking for doesn't exist."</p>
                <A href="/">
                    <span class="btn">"Go Home"</span>
                </A>
            </div>
        </div>
    }
}
