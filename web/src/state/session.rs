//! Session context: the reconciler wired into Leptos.
//!
//! [`SessionContext`] owns the [`SessionMachine`] behind a signal, persists
//! the session record on every transition, and executes machine commands as
//! spawned tasks. Each identity lookup gets a request identity (uuid); a
//! result only reaches the machine if its task is still the current one, so
//! address changes and logout implicitly cancel stale work.

use leptos::prelude::*;
use leptos::task::spawn_local;
use shared::dto::users::Identity;
use uuid::Uuid;

use crate::components::toast::ToastContext;
use crate::services::directory::DirectoryClient;
use crate::services::ethereum::{self, WalletError};
use crate::state::machine::{Command, SessionEvent, SessionMachine, SessionState};
use crate::state::storage::{self, SessionRecord, SESSION_RECORD_VERSION};
use crate::utils::constants::{CHAIN_ID_HEX, CHAIN_NAME};

/// Global session context. Cheap to copy; provided once at app mount.
#[derive(Clone, Copy)]
pub struct SessionContext {
    machine: RwSignal<SessionMachine>,
    /// Request identity of the lookup task allowed to report back.
    lookup_task: RwSignal<Option<Uuid>>,
    directory: StoredValue<DirectoryClient>,
    toasts: ToastContext,
}

impl SessionContext {
    /// Current session state (reactive).
    pub fn state(&self) -> SessionState {
        self.machine.with(|m| m.state().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.machine.with(|m| m.state().is_authenticated())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.machine.with(|m| m.state().identity().cloned())
    }

    pub fn wallet_address(&self) -> Option<String> {
        self.machine.with(|m| m.state().address().map(str::to_string))
    }

    /// Hook up provider events and fire the initial provider-ready event.
    /// Called exactly once, from the app root effect.
    pub fn init(&self) {
        let ctx = *self;
        ethereum::on_accounts_changed(move |accounts| {
            let account = accounts.into_iter().next().unwrap_or_default();
            ctx.dispatch(SessionEvent::AccountSwitched(account));
        });

        let ctx = *self;
        ethereum::on_chain_changed(move |chain| {
            if !chain.eq_ignore_ascii_case(CHAIN_ID_HEX) {
                log::warn!("wallet moved to foreign chain {}", chain);
                ctx.toasts
                    .info("Network changed", format!("Tips require {}", CHAIN_NAME));
            }
        });

        let ctx = *self;
        ethereum::on_disconnect(move || ctx.dispatch(SessionEvent::ProviderDisconnected));

        if !ethereum::provider_available() {
            log::warn!("no Ethereum provider injected");
            self.dispatch(SessionEvent::ProviderReady { resume: false });
            return;
        }
        let resume = storage::load_session()
            .map(|record| record.resume_eligible())
            .unwrap_or(false);
        self.dispatch(SessionEvent::ProviderReady { resume });
    }

    /// User-initiated connect.
    pub fn connect(&self) {
        if !ethereum::provider_available() {
            self.toasts
                .error("Wallet missing", WalletError::NoProvider.to_string());
            return;
        }
        self.dispatch(SessionEvent::ConnectRequested);
    }

    /// User-initiated registration submit.
    pub fn submit_registration(&self, nickname: String) {
        self.dispatch(SessionEvent::RegistrationSubmitted { nickname });
    }

    /// User-initiated logout. Always resets the local session; the provider
    /// disconnect is best-effort.
    pub fn logout(&self) {
        self.dispatch(SessionEvent::LogoutRequested);
    }

    /// Apply an event, persist the resulting session record, then start
    /// whatever external work the machine asked for.
    pub fn dispatch(&self, event: SessionEvent) {
        let commands = self
            .machine
            .try_update(|machine| machine.apply(event))
            .unwrap_or_default();
        self.persist();
        for command in commands {
            self.execute(command);
        }
    }

    /// One structured write per transition; see [`storage::SessionRecord`].
    fn persist(&self) {
        let record = self.machine.with_untracked(|machine| SessionRecord {
            version: SESSION_RECORD_VERSION,
            wallet_address: machine.state().address().map(str::to_string),
            identity: machine.state().identity().cloned(),
            explicit_logout: machine.logout_intent(),
        });
        storage::store_session(&record);
    }

    fn execute(&self, command: Command) {
        match command {
            Command::RequestAccounts => self.spawn_request_accounts(),
            Command::LookupIdentity { address } => self.spawn_lookup(address),
            Command::CreateIdentity { address, nickname } => {
                self.spawn_registration(address, nickname)
            }
            Command::DisconnectProvider => self.spawn_disconnect(),
        }
    }

    fn spawn_request_accounts(&self) {
        let ctx = *self;
        spawn_local(async move {
            match ethereum::request_accounts().await {
                Ok(accounts) => {
                    if let Err(err) = ethereum::ensure_chain().await {
                        // Sign-in works on any chain; only tipping needs the
                        // application chain, and it re-checks.
                        log::warn!("chain switch declined or failed: {}", err);
                        if err != WalletError::Rejected {
                            ctx.toasts.info(
                                "Network",
                                format!("Tips require {}; you can switch later", CHAIN_NAME),
                            );
                        }
                    }
                    match accounts.into_iter().next() {
                        Some(address) => ctx.dispatch(SessionEvent::AddressAvailable(address)),
                        None => ctx.dispatch(SessionEvent::ProviderDisconnected),
                    }
                }
                // User dismissed the wallet prompt: silent cancellation.
                Err(WalletError::Rejected) => {
                    log::info!("wallet connect dismissed by user");
                    ctx.dispatch(SessionEvent::ProviderDisconnected);
                }
                Err(err) => {
                    log::error!("wallet connect failed: {}", err);
                    ctx.toasts.error("Wallet connection failed", err.to_string());
                    ctx.dispatch(SessionEvent::ProviderDisconnected);
                }
            }
        });
    }

    fn spawn_lookup(&self, address: String) {
        let task = Uuid::new_v4();
        self.lookup_task.set(Some(task));
        let ctx = *self;
        let directory = self.directory.get_value();
        spawn_local(async move {
            let outcome = directory.lookup_user(&address).await;
            if ctx.lookup_task.get_untracked() != Some(task) {
                log::debug!("lookup task {} superseded, dropping result", task);
                return;
            }
            ctx.lookup_task.set(None);
            match outcome {
                Ok(Some(record)) => ctx.dispatch(SessionEvent::IdentityFound {
                    address,
                    identity: Identity::from(record),
                }),
                Ok(None) => ctx.dispatch(SessionEvent::IdentityMissing { address }),
                Err(err) => {
                    ctx.toasts.error(
                        "Sign-in failed",
                        "Could not reach the directory service. Please try again.",
                    );
                    ctx.dispatch(SessionEvent::LookupFailed {
                        address,
                        error: err.to_string(),
                    });
                }
            }
        });
    }

    fn spawn_registration(&self, address: String, nickname: String) {
        let ctx = *self;
        let directory = self.directory.get_value();
        spawn_local(async move {
            match directory.create_user(&address, &nickname).await {
                Ok(record) => ctx.dispatch(SessionEvent::RegistrationSucceeded {
                    identity: Identity::from(record),
                }),
                Err(err) => {
                    log::warn!("registration for {} failed: {}", address, err);
                    ctx.dispatch(SessionEvent::RegistrationFailed {
                        error: "Registration failed. Please try again.".to_string(),
                    });
                }
            }
        });
    }

    fn spawn_disconnect(&self) {
        // Cancel any in-flight lookup and drop cached view data with the
        // same transition that reset the session.
        self.lookup_task.set(None);
        storage::clear_matches();
        spawn_local(async move {
            if let Err(err) = ethereum::revoke_permissions().await {
                // Providers without wallet_revokePermissions land here; the
                // local session is already reset either way.
                log::warn!("provider disconnect failed: {}", err);
            }
        });
    }
}

pub fn provide_session_context(toasts: ToastContext) -> SessionContext {
    let logout_intent = storage::load_session()
        .map(|record| record.explicit_logout)
        .unwrap_or(false);
    let context = SessionContext {
        machine: RwSignal::new(SessionMachine::restored(logout_intent)),
        lookup_task: RwSignal::new(None),
        directory: StoredValue::new(DirectoryClient::default()),
        toasts,
    };
    provide_context(context);
    context
}

pub fn use_session_context() -> SessionContext {
    expect_context::<SessionContext>()
}
