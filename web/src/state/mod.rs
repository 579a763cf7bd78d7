//! Session state: the reconciler machine, its persistence, and the Leptos
//! context that drives it.

pub mod machine;
pub mod session;
pub mod storage;

pub use machine::{Command, SessionEvent, SessionMachine, SessionState};
pub use session::{provide_session_context, use_session_context, SessionContext};
