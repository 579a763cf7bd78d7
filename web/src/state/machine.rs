//! Session reconciler state machine.
//!
//! Every wallet/directory event in the app funnels through [`SessionMachine`],
//! which owns the session state and decides what external work (if any) is
//! allowed to start. The machine is synchronous and I/O-free; the context
//! layer in [`crate::state::session`] executes the returned [`Command`]s and
//! feeds the outcomes back in as further [`SessionEvent`]s.

use shared::dto::users::Identity;

use crate::utils::constants::{NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS};

/// Session state as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Provider/SDK not yet ready; nothing is known.
    Initializing,
    /// No wallet connected, nobody authenticated.
    Disconnected,
    /// Wallet account request in flight.
    Connecting,
    /// Directory lookup for `address` in flight.
    CheckingIdentity { address: String },
    /// `address` has no directory record; waiting for a nickname.
    RegistrationPending {
        address: String,
        error: Option<String>,
        submitting: bool,
    },
    /// Directory record found or created; identity cached.
    Authenticated { identity: Identity },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    /// The wallet address this state is about, when there is one.
    pub fn address(&self) -> Option<&str> {
        match self {
            SessionState::CheckingIdentity { address }
            | SessionState::RegistrationPending { address, .. } => Some(address),
            SessionState::Authenticated { identity } => Some(&identity.wallet_address),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity } => Some(identity),
            _ => None,
        }
    }
}

/// Inputs to the machine: wallet-provider events, directory outcomes, and
/// user actions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The wallet SDK finished initializing. `resume` carries whether a
    /// previous session record allows an automatic reconnect.
    ProviderReady { resume: bool },
    /// User clicked connect.
    ConnectRequested,
    /// The provider produced an account address.
    AddressAvailable(String),
    /// Directory lookup found a record for `address`.
    IdentityFound { address: String, identity: Identity },
    /// Directory lookup returned 404 for `address`.
    IdentityMissing { address: String },
    /// Directory lookup failed for any other reason.
    LookupFailed { address: String, error: String },
    /// User submitted the registration form.
    RegistrationSubmitted { nickname: String },
    /// Directory creation succeeded (or hit the already-exists conflict,
    /// which callers map to this same event).
    RegistrationSucceeded { identity: Identity },
    /// Directory creation failed for a reason other than already-exists.
    RegistrationFailed { error: String },
    /// The provider switched to a different account.
    AccountSwitched(String),
    /// The provider disconnected.
    ProviderDisconnected,
    /// User clicked logout.
    LogoutRequested,
}

/// External work the machine wants started. Exactly the suspension points of
/// the reconciler; nothing else in the app may issue these calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestAccounts,
    LookupIdentity { address: String },
    CreateIdentity { address: String, nickname: String },
    DisconnectProvider,
}

/// The reconciler. Owns [`SessionState`] plus the persisted logout-intent
/// flag, which must change atomically with the transitions that touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMachine {
    state: SessionState,
    logout_intent: bool,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Initializing,
            logout_intent: false,
        }
    }

    /// Machine restored from a persisted session record.
    pub fn restored(logout_intent: bool) -> Self {
        Self {
            state: SessionState::Initializing,
            logout_intent,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The persisted explicit-logout flag. Set by [`SessionEvent::LogoutRequested`],
    /// cleared by the next successful login.
    pub fn logout_intent(&self) -> bool {
        self.logout_intent
    }

    /// Advance the machine. Returns the commands the caller must execute;
    /// an empty vec means the event was absorbed (no-op or pure transition).
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Command> {
        match event {
            SessionEvent::ProviderReady { resume } => self.on_provider_ready(resume),
            SessionEvent::ConnectRequested => self.on_connect_requested(),
            SessionEvent::AddressAvailable(address) => self.on_address_available(address),
            SessionEvent::IdentityFound { address, identity } => {
                self.on_identity_found(address, identity)
            }
            SessionEvent::IdentityMissing { address } => self.on_identity_missing(address),
            SessionEvent::LookupFailed { address, error } => {
                self.on_lookup_failed(address, error)
            }
            SessionEvent::RegistrationSubmitted { nickname } => {
                self.on_registration_submitted(nickname)
            }
            SessionEvent::RegistrationSucceeded { identity } => {
                self.on_registration_succeeded(identity)
            }
            SessionEvent::RegistrationFailed { error } => self.on_registration_failed(error),
            SessionEvent::AccountSwitched(address) => self.on_account_switched(address),
            SessionEvent::ProviderDisconnected => self.on_provider_disconnected(),
            SessionEvent::LogoutRequested => self.on_logout(),
        }
    }

    fn on_provider_ready(&mut self, resume: bool) -> Vec<Command> {
        if self.state != SessionState::Initializing {
            return Vec::new();
        }
        if resume && !self.logout_intent {
            log::info!("provider ready, resuming previous session");
            self.state = SessionState::Connecting;
            vec![Command::RequestAccounts]
        } else {
            self.state = SessionState::Disconnected;
            Vec::new()
        }
    }

    fn on_connect_requested(&mut self) -> Vec<Command> {
        match self.state {
            SessionState::Disconnected => {
                self.state = SessionState::Connecting;
                vec![Command::RequestAccounts]
            }
            // Already connecting/checking/authenticated; nothing to do.
            _ => Vec::new(),
        }
    }

    fn on_address_available(&mut self, address: String) -> Vec<Command> {
        let address = address.trim().to_string();
        if address.is_empty() {
            return Vec::new();
        }
        match &self.state {
            // At-most-one-concurrent-lookup-per-address: a lookup for this
            // address is already in flight, coalesce into a no-op.
            SessionState::CheckingIdentity { address: current } if *current == address => {
                log::debug!("lookup for {} already in flight, coalescing", address);
                Vec::new()
            }
            // Same address mid-registration or already authenticated: the
            // re-announcement carries no new information.
            SessionState::RegistrationPending { address: current, .. }
                if *current == address =>
            {
                Vec::new()
            }
            SessionState::Authenticated { identity }
                if identity.wallet_address == address =>
            {
                Vec::new()
            }
            _ => {
                self.state = SessionState::CheckingIdentity {
                    address: address.clone(),
                };
                vec![Command::LookupIdentity { address }]
            }
        }
    }

    fn on_identity_found(&mut self, address: String, identity: Identity) -> Vec<Command> {
        match &self.state {
            SessionState::CheckingIdentity { address: current } if *current == address => {
                log::info!("directory record found for {}", address);
                self.logout_intent = false;
                self.state = SessionState::Authenticated { identity };
            }
            // Stale result: the session moved on (logout, account switch)
            // while the lookup was in flight.
            _ => log::debug!("dropping stale lookup result for {}", address),
        }
        Vec::new()
    }

    fn on_identity_missing(&mut self, address: String) -> Vec<Command> {
        match &self.state {
            SessionState::CheckingIdentity { address: current } if *current == address => {
                log::info!("no directory record for {}, registration required", address);
                self.state = SessionState::RegistrationPending {
                    address,
                    error: None,
                    submitting: false,
                };
            }
            _ => log::debug!("dropping stale not-found result for {}", address),
        }
        Vec::new()
    }

    fn on_lookup_failed(&mut self, address: String, error: String) -> Vec<Command> {
        match &self.state {
            SessionState::CheckingIdentity { address: current } if *current == address => {
                log::error!("identity lookup failed for {}: {}", address, error);
                self.state = SessionState::Disconnected;
            }
            _ => log::debug!("dropping stale lookup failure for {}", address),
        }
        Vec::new()
    }

    fn on_registration_submitted(&mut self, nickname: String) -> Vec<Command> {
        let SessionState::RegistrationPending {
            address,
            error,
            submitting,
        } = &mut self.state
        else {
            return Vec::new();
        };
        if *submitting {
            // A creation request is already in flight.
            return Vec::new();
        }
        let nickname = nickname.trim().to_string();
        if let Err(reason) = validate_nickname(&nickname) {
            *error = Some(reason.to_string());
            return Vec::new();
        }
        *error = None;
        *submitting = true;
        vec![Command::CreateIdentity {
            address: address.clone(),
            nickname,
        }]
    }

    fn on_registration_succeeded(&mut self, identity: Identity) -> Vec<Command> {
        match self.state {
            SessionState::RegistrationPending { .. } => {
                log::info!("registered {}", identity.wallet_address);
                self.logout_intent = false;
                self.state = SessionState::Authenticated { identity };
            }
            _ => log::debug!("dropping stale registration result"),
        }
        Vec::new()
    }

    fn on_registration_failed(&mut self, error: String) -> Vec<Command> {
        if let SessionState::RegistrationPending {
            error: slot,
            submitting,
            ..
        } = &mut self.state
        {
            log::warn!("registration failed: {}", error);
            *slot = Some(error);
            *submitting = false;
        }
        Vec::new()
    }

    fn on_account_switched(&mut self, address: String) -> Vec<Command> {
        if address.trim().is_empty() {
            // An empty accounts list is a disconnect in EIP-1193 terms.
            return self.on_provider_disconnected();
        }
        self.on_address_available(address)
    }

    fn on_provider_disconnected(&mut self) -> Vec<Command> {
        if self.state != SessionState::Disconnected {
            log::info!("wallet provider disconnected");
            self.state = SessionState::Disconnected;
        }
        Vec::new()
    }

    fn on_logout(&mut self) -> Vec<Command> {
        log::info!("logout requested");
        self.state = SessionState::Disconnected;
        self.logout_intent = true;
        vec![Command::DisconnectProvider]
    }
}

/// Local nickname validation, applied before any network call.
pub fn validate_nickname(nickname: &str) -> Result<(), &'static str> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err("Please enter a nickname");
    }
    let chars = trimmed.chars().count();
    if chars < NICKNAME_MIN_CHARS {
        return Err("Nickname must be at least 2 characters");
    }
    if chars > NICKNAME_MAX_CHARS {
        return Err("Nickname must be at most 20 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(address: &str, nickname: &str) -> Identity {
        Identity {
            wallet_address: address.to_string(),
            nickname: nickname.to_string(),
            user_id: None,
            created_at: None,
        }
    }

    fn machine_at_checking(address: &str) -> SessionMachine {
        let mut machine = SessionMachine::new();
        machine.apply(SessionEvent::ProviderReady { resume: false });
        machine.apply(SessionEvent::ConnectRequested);
        let commands = machine.apply(SessionEvent::AddressAvailable(address.to_string()));
        assert_eq!(
            commands,
            vec![Command::LookupIdentity {
                address: address.to_string()
            }]
        );
        machine
    }

    #[test]
    fn provider_ready_without_resume_lands_disconnected() {
        let mut machine = SessionMachine::new();
        let commands = machine.apply(SessionEvent::ProviderReady { resume: false });
        assert!(commands.is_empty());
        assert_eq!(*machine.state(), SessionState::Disconnected);
    }

    #[test]
    fn provider_ready_with_resume_reconnects() {
        let mut machine = SessionMachine::new();
        let commands = machine.apply(SessionEvent::ProviderReady { resume: true });
        assert_eq!(commands, vec![Command::RequestAccounts]);
        assert_eq!(*machine.state(), SessionState::Connecting);
    }

    #[test]
    fn explicit_logout_suppresses_resume() {
        let mut machine = SessionMachine::restored(true);
        let commands = machine.apply(SessionEvent::ProviderReady { resume: true });
        assert!(commands.is_empty());
        assert_eq!(*machine.state(), SessionState::Disconnected);
    }

    #[test]
    fn concurrent_lookups_for_same_address_coalesce() {
        let mut machine = machine_at_checking("0xAAA");
        // Second trigger for the same address must not issue a second lookup.
        let commands = machine.apply(SessionEvent::AddressAvailable("0xAAA".to_string()));
        assert!(commands.is_empty());
        assert_eq!(
            *machine.state(),
            SessionState::CheckingIdentity {
                address: "0xAAA".to_string()
            }
        );
    }

    #[test]
    fn lookup_for_different_address_supersedes() {
        let mut machine = machine_at_checking("0xAAA");
        let commands = machine.apply(SessionEvent::AddressAvailable("0xBBB".to_string()));
        assert_eq!(
            commands,
            vec![Command::LookupIdentity {
                address: "0xBBB".to_string()
            }]
        );
    }

    #[test]
    fn empty_address_is_ignored() {
        let mut machine = SessionMachine::new();
        machine.apply(SessionEvent::ProviderReady { resume: false });
        let commands = machine.apply(SessionEvent::AddressAvailable("  ".to_string()));
        assert!(commands.is_empty());
        assert_eq!(*machine.state(), SessionState::Disconnected);
    }

    #[test]
    fn unknown_address_enters_registration_then_authenticates() {
        // 0xAAA has no record; registering "Bob" signs in.
        let mut machine = machine_at_checking("0xAAA");
        machine.apply(SessionEvent::IdentityMissing {
            address: "0xAAA".to_string(),
        });
        assert!(matches!(
            machine.state(),
            SessionState::RegistrationPending { address, .. } if address == "0xAAA"
        ));

        let commands = machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "Bob".to_string(),
        });
        assert_eq!(
            commands,
            vec![Command::CreateIdentity {
                address: "0xAAA".to_string(),
                nickname: "Bob".to_string()
            }]
        );

        machine.apply(SessionEvent::RegistrationSucceeded {
            identity: identity("0xAAA", "Bob"),
        });
        let cached = machine.state().identity().unwrap();
        assert_eq!(cached.wallet_address, "0xAAA");
        assert_eq!(cached.nickname, "Bob");
    }

    #[test]
    fn known_address_authenticates_directly() {
        // 0xBBB already has a record ("Alice").
        let mut machine = machine_at_checking("0xBBB");
        machine.apply(SessionEvent::IdentityFound {
            address: "0xBBB".to_string(),
            identity: identity("0xBBB", "Alice"),
        });
        assert!(machine.state().is_authenticated());
        assert_eq!(machine.state().identity().unwrap().nickname, "Alice");
    }

    #[test]
    fn lookup_error_degrades_to_disconnected_and_is_retryable() {
        // HTTP 500 for 0xCCC.
        let mut machine = machine_at_checking("0xCCC");
        machine.apply(SessionEvent::LookupFailed {
            address: "0xCCC".to_string(),
            error: "status 500".to_string(),
        });
        assert_eq!(*machine.state(), SessionState::Disconnected);

        // Retrying the same address later issues a fresh lookup.
        machine.apply(SessionEvent::ConnectRequested);
        let commands = machine.apply(SessionEvent::AddressAvailable("0xCCC".to_string()));
        assert_eq!(
            commands,
            vec![Command::LookupIdentity {
                address: "0xCCC".to_string()
            }]
        );
    }

    #[test]
    fn blank_nickname_is_rejected_without_a_command() {
        let mut machine = machine_at_checking("0xAAA");
        machine.apply(SessionEvent::IdentityMissing {
            address: "0xAAA".to_string(),
        });
        let commands = machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "   ".to_string(),
        });
        assert!(commands.is_empty());
        assert!(matches!(
            machine.state(),
            SessionState::RegistrationPending { error: Some(_), submitting: false, .. }
        ));
    }

    #[test]
    fn out_of_bounds_nicknames_are_rejected_locally() {
        assert!(validate_nickname("B").is_err());
        assert!(validate_nickname(&"x".repeat(21)).is_err());
        assert!(validate_nickname("  Bob  ").is_ok());
        assert!(validate_nickname(&"x".repeat(20)).is_ok());
    }

    #[test]
    fn double_submit_issues_one_creation() {
        let mut machine = machine_at_checking("0xAAA");
        machine.apply(SessionEvent::IdentityMissing {
            address: "0xAAA".to_string(),
        });
        let first = machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "Bob".to_string(),
        });
        assert_eq!(first.len(), 1);
        let second = machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "Bob".to_string(),
        });
        assert!(second.is_empty());
    }

    #[test]
    fn registration_failure_keeps_the_form_retryable() {
        let mut machine = machine_at_checking("0xAAA");
        machine.apply(SessionEvent::IdentityMissing {
            address: "0xAAA".to_string(),
        });
        machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "Bob".to_string(),
        });
        machine.apply(SessionEvent::RegistrationFailed {
            error: "service unavailable".to_string(),
        });
        assert!(matches!(
            machine.state(),
            SessionState::RegistrationPending { submitting: false, error: Some(_), .. }
        ));
        // Retry goes through again.
        let commands = machine.apply(SessionEvent::RegistrationSubmitted {
            nickname: "Bob".to_string(),
        });
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn logout_resets_from_any_state() {
        let states = [
            SessionEvent::ProviderReady { resume: false },
            SessionEvent::ConnectRequested,
            SessionEvent::AddressAvailable("0xAAA".to_string()),
        ];
        let mut machine = SessionMachine::new();
        for event in states {
            machine.apply(event);
        }
        let commands = machine.apply(SessionEvent::LogoutRequested);
        assert_eq!(commands, vec![Command::DisconnectProvider]);
        assert_eq!(*machine.state(), SessionState::Disconnected);
        assert!(machine.logout_intent());
        assert!(machine.state().identity().is_none());
    }

    #[test]
    fn in_flight_lookup_result_after_logout_is_dropped() {
        let mut machine = machine_at_checking("0xAAA");
        machine.apply(SessionEvent::LogoutRequested);
        machine.apply(SessionEvent::IdentityFound {
            address: "0xAAA".to_string(),
            identity: identity("0xAAA", "Bob"),
        });
        assert_eq!(*machine.state(), SessionState::Disconnected);
        assert!(machine.state().identity().is_none());
    }

    #[test]
    fn successful_login_clears_logout_intent() {
        let mut machine = SessionMachine::restored(true);
        machine.apply(SessionEvent::ProviderReady { resume: true });
        assert_eq!(*machine.state(), SessionState::Disconnected);

        machine.apply(SessionEvent::ConnectRequested);
        machine.apply(SessionEvent::AddressAvailable("0xBBB".to_string()));
        machine.apply(SessionEvent::IdentityFound {
            address: "0xBBB".to_string(),
            identity: identity("0xBBB", "Alice"),
        });
        assert!(!machine.logout_intent());
    }

    #[test]
    fn account_switch_while_authenticated_rechecks_identity() {
        let mut machine = machine_at_checking("0xBBB");
        machine.apply(SessionEvent::IdentityFound {
            address: "0xBBB".to_string(),
            identity: identity("0xBBB", "Alice"),
        });
        let commands = machine.apply(SessionEvent::AccountSwitched("0xAAA".to_string()));
        assert_eq!(
            commands,
            vec![Command::LookupIdentity {
                address: "0xAAA".to_string()
            }]
        );
        assert!(matches!(
            machine.state(),
            SessionState::CheckingIdentity { address } if address == "0xAAA"
        ));
    }

    #[test]
    fn account_switch_to_empty_list_disconnects() {
        let mut machine = machine_at_checking("0xBBB");
        machine.apply(SessionEvent::IdentityFound {
            address: "0xBBB".to_string(),
            identity: identity("0xBBB", "Alice"),
        });
        machine.apply(SessionEvent::AccountSwitched(String::new()));
        assert_eq!(*machine.state(), SessionState::Disconnected);
    }
}
