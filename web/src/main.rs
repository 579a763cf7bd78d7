//! VibeMatch wallet-gated matching client - WASM entry point.

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

pub mod app;
pub mod components;
pub mod pages;
pub mod services;
pub mod state;
pub mod utils;

use app::App;

#[wasm_bindgen(start)]
pub fn main() {
    // Panic messages and logs go to the browser console.
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("VibeMatch starting");

    hide_loading_screen();
    leptos::mount::mount_to_body(|| view! { <App/> });
}

/// Hide the static loading screen from index.html once the WASM is live.
fn hide_loading_screen() {
    let Some(document) = gloo_utils::window().document() else {
        return;
    };
    if let Some(loading_element) = document.get_element_by_id("leptos-loading") {
        if loading_element
            .set_attribute("style", "display: none;")
            .is_err()
        {
            log::warn!("could not hide loading screen");
        }
    }
}
