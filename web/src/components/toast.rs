//! Toast notifications.
//!
//! Transient, non-blocking notices for degraded operations: network errors,
//! failed sends, confirmation results. Nothing shown here ever blocks the
//! session; toasts auto-dismiss after a few seconds.

use leptos::prelude::*;
use uuid::Uuid;

use crate::utils::constants::TOAST_DISMISS_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

impl ToastLevel {
    fn css_class(&self) -> &'static str {
        match self {
            ToastLevel::Info => "toast toast-info",
            ToastLevel::Success => "toast toast-success",
            ToastLevel::Error => "toast toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub title: String,
    pub body: String,
}

/// Global toast queue.
#[derive(Clone, Copy)]
pub struct ToastContext {
    toasts: RwSignal<Vec<Toast>>,
}

impl ToastContext {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
        }
    }

    pub fn info(&self, title: impl Into<String>, body: impl Into<String>) {
        self.push(ToastLevel::Info, title.into(), body.into());
    }

    pub fn success(&self, title: impl Into<String>, body: impl Into<String>) {
        self.push(ToastLevel::Success, title.into(), body.into());
    }

    pub fn error(&self, title: impl Into<String>, body: impl Into<String>) {
        self.push(ToastLevel::Error, title.into(), body.into());
    }

    fn push(&self, level: ToastLevel, title: String, body: String) {
        let toast = Toast {
            id: Uuid::new_v4(),
            level,
            title,
            body,
        };
        let id = toast.id;
        self.toasts.update(|toasts| toasts.push(toast));

        let toasts = self.toasts;
        gloo_timers::callback::Timeout::new(TOAST_DISMISS_MS, move || {
            toasts.update(|list| list.retain(|t| t.id != id));
        })
        .forget();
    }

    pub fn dismiss(&self, id: Uuid) {
        self.toasts.update(|list| list.retain(|t| t.id != id));
    }
}

impl Default for ToastContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_toast_context() -> ToastContext {
    let context = ToastContext::new();
    provide_context(context);
    context
}

pub fn use_toast_context() -> ToastContext {
    expect_context::<ToastContext>()
}

/// Fixed overlay rendering the toast queue.
#[component]
pub fn ToastStack() -> impl IntoView {
    let ctx = use_toast_context();
    view! {
        <div class="toast-stack">
            <For
                each=move || ctx.toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast.level.css_class() on:click=move |_| ctx.dismiss(id)>
                            <p class="toast-title">{toast.title.clone()}</p>
                            <p class="toast-body">{toast.body.clone()}</p>
                        </div>
                    }
                }
            />
        </div>
    }
}
